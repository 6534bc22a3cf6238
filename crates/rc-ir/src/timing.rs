//! Step timing: tempo to step duration, swing and flam offsets.
//!
//! All times are in seconds on the audio clock.

use crate::pattern::Scale;

/// Added to a pattern's flam factor so that a factor of zero still lands
/// the grace note audibly ahead of the main hit.
pub const FLAM_CORRECTION: f64 = 0.21;

/// Nominal duration of one step.
pub fn step_duration(bpm: f32, scale: Scale) -> f64 {
    60.0 / bpm as f64 / scale.steps_per_beat() as f64
}

/// Interval until the next step, for the `played`-th step since the
/// transport started (counting from zero).
///
/// Even positions are lengthened by `shuffle * nominal` and odd positions
/// shortened by the same amount, so every pair of consecutive steps spans
/// two nominal intervals no matter where the window wraps.
pub fn swung_interval(nominal: f64, shuffle: f32, played: u32) -> f64 {
    let s = shuffle as f64;
    if played % 2 == 0 {
        nominal * (1.0 + s)
    } else {
        nominal * (1.0 - s)
    }
}

/// Onset of the softer grace hit that precedes a flammed step at `target`.
pub fn flam_onset(target: f64, flam: f32, nominal: f64) -> f64 {
    target - (flam as f64 + FLAM_CORRECTION) * nominal
}

/// [`flam_onset`] bounded by `prior`, the onset of the step before
/// `target`. When the nominal offset would reach back to `prior` (after a
/// tempo drop, say) the offset is taken from the gap actually elapsed.
pub fn flam_onset_after(target: f64, flam: f32, nominal: f64, prior: Option<f64>) -> f64 {
    let onset = flam_onset(target, flam, nominal);
    match prior {
        Some(prior) if onset <= prior && prior < target => flam_onset(target, flam, target - prior),
        _ => onset,
    }
}

/// Convert seconds to a frame position at `sample_rate`.
pub fn seconds_to_frames(seconds: f64, sample_rate: u32) -> u64 {
    if seconds <= 0.0 {
        0
    } else {
        libm::round(seconds * sample_rate as f64) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{FLAM_MAX, FLAM_MIN, SHUFFLE_LIMIT};

    #[test]
    fn sixteenths_at_120() {
        assert!((step_duration(120.0, Scale::Sixteenth) - 0.125).abs() < 1e-12);
        assert!((step_duration(120.0, Scale::Triplet) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn swing_pairs_sum_to_two_steps() {
        let n = 0.1;
        for shuffle in [-SHUFFLE_LIMIT, -0.1, 0.0, 0.2, SHUFFLE_LIMIT] {
            for i in 0..40u32 {
                let pair = swung_interval(n, shuffle, i) + swung_interval(n, shuffle, i + 1);
                assert!((pair - 2.0 * n).abs() < 1e-12);
            }
            assert!((swung_interval(n, shuffle, 0) - n * (1.0 + shuffle as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn flam_precedes_target_and_follows_prior_step() {
        let n = step_duration(120.0, Scale::Sixteenth);
        let target = 10.0;
        let mut f = FLAM_MIN;
        while f <= FLAM_MAX {
            let onset = flam_onset(target, f, n);
            assert!(onset < target, "flam {} lands late", f);
            assert!(onset > target - n, "flam {} lands before prior step", f);
            f += 0.01;
        }
    }

    #[test]
    fn flam_after_a_tempo_drop_stays_behind_the_prior_step() {
        let fast = step_duration(290.0, Scale::Sixteenth);
        let slow = step_duration(37.0, Scale::Sixteenth);
        let (prior, target) = (fast, 2.0 * fast);
        assert!(flam_onset(target, FLAM_MAX, slow) < prior);
        for flam in [FLAM_MIN, 0.0, FLAM_MAX] {
            let onset = flam_onset_after(target, flam, slow, Some(prior));
            assert!(onset > prior && onset < target, "flam {} at {}", flam, onset);
        }
        // Without a tempo change the bound never kicks in.
        let n = step_duration(120.0, Scale::Sixteenth);
        assert_eq!(flam_onset_after(1.0, 0.2, n, Some(1.0 - n)), flam_onset(1.0, 0.2, n));
        assert_eq!(flam_onset_after(1.0, 0.2, n, None), flam_onset(1.0, 0.2, n));
    }

    #[test]
    fn frames_round_to_nearest() {
        assert_eq!(seconds_to_frames(1.0, 44_100), 44_100);
        assert_eq!(seconds_to_frames(-0.5, 44_100), 0);
    }
}
