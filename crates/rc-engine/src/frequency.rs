//! Playback-rate conversion for sample playback.
//!
//! Converts a rate multiplier plus the sample's recorded rate and the
//! output rate into a 16.16 fixed-point increment for stepping through
//! sample data.

/// Compute the 16.16 fixed-point sample increment.
///
/// - `rate`: playback-rate multiplier (1.0 = original pitch)
/// - `source_rate`: rate the sample was recorded at
/// - `output_rate`: output sample rate (e.g. 44100 Hz)
pub fn rate_to_increment(rate: f32, source_rate: u32, output_rate: u32) -> u64 {
    if output_rate == 0 || source_rate == 0 || !(rate > 0.0) {
        return 0;
    }
    let ratio = rate as f64 * source_rate as f64 / output_rate as f64;
    (ratio * 65536.0) as u64
}

/// Rate multiplier for a pitch offset in semitones.
pub fn semitones_to_rate(semitones: f32) -> f32 {
    libm::exp2f(semitones / 12.0)
}
