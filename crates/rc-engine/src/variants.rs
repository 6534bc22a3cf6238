//! Parameter-to-sound tables.
//!
//! Continuous controls are quantized into buckets that select one of the
//! pre-rendered variants of a voice, or mapped through a curve onto a
//! playback rate, envelope time or filter cutoff. The boundaries and curve
//! endpoints are tuning data; they are loaded from configuration and never
//! derived at runtime.

use serde::{Deserialize, Serialize};

use rc_ir::Instrument;

/// Bucket index for a raw position: the number of thresholds at or below it.
pub fn bucket(raw: f32, thresholds: &[f32]) -> usize {
    thresholds.iter().filter(|&&t| raw >= t).count()
}

/// Exponential sweep from `lo` to `hi` as `raw` goes 0..=1.
pub fn exp_curve(raw: f32, lo: f32, hi: f32) -> f32 {
    lo * libm::powf(hi / lo, raw.clamp(0.0, 1.0))
}

/// Bucket boundaries and curve endpoints for every voice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariantTable {
    /// Bass drum tune: four buckets
    pub bd_tune: [f32; 3],
    /// Bass drum decay: three buckets
    pub bd_decay: [f32; 2],
    pub sd_tune: [f32; 2],
    pub sd_snappy: [f32; 2],
    /// Shared by the three toms
    pub tom_tune: [f32; 2],
    pub tom_decay: [f32; 2],
    /// Snare tone → low-pass cutoff (Hz)
    pub sd_tone_hz: (f32, f32),
    /// Closed hat decay → envelope time constant (s)
    pub ch_decay_s: (f32, f32),
    pub oh_decay_s: (f32, f32),
    /// Crash/ride tune → pitch offset span (semitones either side)
    pub cymbal_tune_semitones: f32,
}

impl Default for VariantTable {
    fn default() -> Self {
        Self {
            bd_tune: [0.25, 0.5, 0.75],
            bd_decay: [0.34, 0.67],
            sd_tune: [0.34, 0.67],
            sd_snappy: [0.34, 0.67],
            tom_tune: [0.34, 0.67],
            tom_decay: [0.34, 0.67],
            sd_tone_hz: (2_000.0, 12_000.0),
            ch_decay_s: (0.02, 0.12),
            oh_decay_s: (0.15, 0.9),
            cymbal_tune_semitones: 5.0,
        }
    }
}

impl VariantTable {
    /// Number of pre-rendered variants a voice has.
    pub fn variant_count(&self, instrument: Instrument) -> usize {
        match instrument {
            Instrument::BassDrum => (self.bd_tune.len() + 1) * (self.bd_decay.len() + 1),
            Instrument::SnareDrum => (self.sd_tune.len() + 1) * (self.sd_snappy.len() + 1),
            Instrument::LowTom | Instrument::MidTom | Instrument::HighTom => {
                (self.tom_tune.len() + 1) * (self.tom_decay.len() + 1)
            }
            Instrument::TotalAccent => 0,
            _ => 1,
        }
    }

    /// Number of buckets along the second axis of a two-axis voice.
    pub fn minor_buckets(&self, instrument: Instrument) -> usize {
        match instrument {
            Instrument::BassDrum => self.bd_decay.len() + 1,
            Instrument::SnareDrum => self.sd_snappy.len() + 1,
            Instrument::LowTom | Instrument::MidTom | Instrument::HighTom => self.tom_decay.len() + 1,
            _ => 1,
        }
    }

    /// Variant index from a (major, minor) bucket pair.
    pub fn variant_index(&self, instrument: Instrument, major: usize, minor: usize) -> usize {
        major * self.minor_buckets(instrument) + minor
    }

    /// Major/minor bucket pair of a variant index.
    pub fn split_variant(&self, instrument: Instrument, variant: usize) -> (usize, usize) {
        let minor = self.minor_buckets(instrument);
        (variant / minor, variant % minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_edges() {
        let t = [0.25, 0.5, 0.75];
        assert_eq!(bucket(0.0, &t), 0);
        assert_eq!(bucket(0.249, &t), 0);
        assert_eq!(bucket(0.25, &t), 1);
        assert_eq!(bucket(0.74, &t), 2);
        assert_eq!(bucket(1.0, &t), 3);
    }

    #[test]
    fn variant_counts() {
        let table = VariantTable::default();
        assert_eq!(table.variant_count(Instrument::BassDrum), 12);
        assert_eq!(table.variant_count(Instrument::SnareDrum), 9);
        assert_eq!(table.variant_count(Instrument::MidTom), 9);
        assert_eq!(table.variant_count(Instrument::OpenHat), 1);
        assert_eq!(table.variant_count(Instrument::TotalAccent), 0);
    }

    #[test]
    fn variant_index_round_trips() {
        let table = VariantTable::default();
        for v in 0..table.variant_count(Instrument::BassDrum) {
            let (major, minor) = table.split_variant(Instrument::BassDrum, v);
            assert_eq!(table.variant_index(Instrument::BassDrum, major, minor), v);
        }
    }

    #[test]
    fn exp_curve_endpoints() {
        assert!((exp_curve(0.0, 2000.0, 12000.0) - 2000.0).abs() < 1e-2);
        assert!((exp_curve(1.0, 2000.0, 12000.0) - 12000.0).abs() < 1e-1);
        let mid = exp_curve(0.5, 100.0, 400.0);
        assert!((mid - 200.0).abs() < 1e-2);
    }
}
