//! Voice synthesis dispatch.
//!
//! Turns one step of a pattern into note specifications: which variant to
//! play, at what rate, through which envelope and filter, and how loud.
//! Each call reads the parameter table and nothing else, so notes never
//! carry state from one step to the next.

use rc_ir::{Accent, Instrument, Lane, MuteSolo, ParamId, ParamTable, PatternRecord, Step};

use crate::filter::{FilterKind, FilterSpec};
use crate::frequency::semitones_to_rate;
use crate::variants::{bucket, exp_curve, VariantTable};

/// Accent weight of a normal hit.
pub const NORMAL_WEIGHT: f32 = 0.6;
/// Accent weight of an accented hit.
pub const STRONG_WEIGHT: f32 = 0.8;
/// Extra weight a Total Accent step adds at full accent depth, as a fraction.
pub const TOTAL_ACCENT_BOOST: f32 = 0.5;
/// Gain of a flam grace hit relative to its main hit.
pub const FLAM_GAIN: f32 = 0.5;

/// Everything the mix bus needs to start one note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteSpec {
    pub instrument: Instrument,
    pub variant: u8,
    /// Playback-rate multiplier
    pub rate: f32,
    /// Exponential decay time constant, if the voice is enveloped
    pub decay_s: Option<f32>,
    pub filter: Option<FilterSpec>,
    pub gain: f32,
}

/// One voice firing on a step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub note: NoteSpec,
    /// The voice is flagged for a flam on this pattern
    pub flam: bool,
}

/// Accent of `instrument` if the lane step makes it sound.
///
/// On the hi-hat lane the closed voice fires on `Hit` and the open voice on
/// `Open`, so only one of the two ever sounds per step.
pub fn fires(instrument: Instrument, step: Step) -> Option<Accent> {
    match (instrument, step) {
        (_, Step::Off) | (Instrument::TotalAccent, _) => None,
        (Instrument::ClosedHat, Step::Open(_)) | (Instrument::OpenHat, Step::Hit(_)) => None,
        (_, Step::Hit(a)) | (_, Step::Open(a)) => Some(a),
    }
}

/// Weight of a hit before level and master gain.
pub fn accent_weight(accent: Accent, total_accent: bool, accent_level: f32) -> f32 {
    let base = match accent {
        Accent::Normal => NORMAL_WEIGHT,
        Accent::Strong => STRONG_WEIGHT,
    };
    if total_accent {
        base * (1.0 + TOTAL_ACCENT_BOOST * accent_level)
    } else {
        base
    }
}

/// Build the note for one voice.
pub fn note_for(
    instrument: Instrument,
    accent: Accent,
    total_accent: bool,
    params: &ParamTable,
    table: &VariantTable,
) -> NoteSpec {
    let raw = |id| params.raw(id);
    let weight = accent_weight(accent, total_accent, params.value(ParamId::AccentLevel));
    let level = ParamId::level_for(instrument).map_or(0.0, |id| params.value(id));

    let mut note = NoteSpec {
        instrument,
        variant: 0,
        rate: 1.0,
        decay_s: None,
        filter: None,
        gain: weight * level * params.master(),
    };

    let two_axis = |tune: ParamId, tune_t: &[f32], other: ParamId, other_t: &[f32]| {
        let v = table.variant_index(instrument, bucket(raw(tune), tune_t), bucket(raw(other), other_t));
        v as u8
    };

    match instrument {
        Instrument::BassDrum => {
            note.variant = two_axis(ParamId::BdTune, &table.bd_tune, ParamId::BdDecay, &table.bd_decay);
        }
        Instrument::SnareDrum => {
            note.variant = two_axis(ParamId::SdTune, &table.sd_tune, ParamId::SdSnappy, &table.sd_snappy);
            let (lo, hi) = table.sd_tone_hz;
            note.filter = Some(FilterSpec {
                kind: FilterKind::LowPass,
                cutoff_hz: exp_curve(raw(ParamId::SdTone), lo, hi),
            });
        }
        Instrument::LowTom => {
            note.variant = two_axis(ParamId::LtTune, &table.tom_tune, ParamId::LtDecay, &table.tom_decay);
        }
        Instrument::MidTom => {
            note.variant = two_axis(ParamId::MtTune, &table.tom_tune, ParamId::MtDecay, &table.tom_decay);
        }
        Instrument::HighTom => {
            note.variant = two_axis(ParamId::HtTune, &table.tom_tune, ParamId::HtDecay, &table.tom_decay);
        }
        Instrument::ClosedHat => {
            let (lo, hi) = table.ch_decay_s;
            note.decay_s = Some(exp_curve(raw(ParamId::ChDecay), lo, hi));
        }
        Instrument::OpenHat => {
            let (lo, hi) = table.oh_decay_s;
            note.decay_s = Some(exp_curve(raw(ParamId::OhDecay), lo, hi));
        }
        Instrument::Crash => {
            note.rate = cymbal_rate(raw(ParamId::CrashTune), table);
        }
        Instrument::Ride => {
            note.rate = cymbal_rate(raw(ParamId::RideTune), table);
        }
        Instrument::RimShot | Instrument::HandClap | Instrument::TotalAccent => {}
    }
    note
}

fn cymbal_rate(tune: f32, table: &VariantTable) -> f32 {
    semitones_to_rate((tune - 0.5) * 2.0 * table.cymbal_tune_semitones)
}

/// Every audible voice that fires on step `index` of `record`.
pub fn step_hits<'a>(
    record: &'a PatternRecord,
    index: usize,
    params: &'a ParamTable,
    mute: MuteSolo,
    table: &'a VariantTable,
) -> impl Iterator<Item = Hit> + 'a {
    let total_accent = !record.step(Lane::TotalAccent, index).is_off();
    Instrument::VOICES.into_iter().filter_map(move |instrument| {
        let accent = fires(instrument, record.step(instrument.lane(), index))?;
        if !mute.instrument_audible(instrument) {
            return None;
        }
        Some(Hit {
            note: note_for(instrument, accent, total_accent, params, table),
            flam: record.flam_enabled(instrument),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> VariantTable {
        VariantTable::default()
    }

    #[test]
    fn hat_voices_are_exclusive() {
        assert_eq!(fires(Instrument::ClosedHat, Step::Hit(Accent::Strong)), Some(Accent::Strong));
        assert_eq!(fires(Instrument::OpenHat, Step::Hit(Accent::Strong)), None);
        assert_eq!(fires(Instrument::OpenHat, Step::Open(Accent::Normal)), Some(Accent::Normal));
        assert_eq!(fires(Instrument::ClosedHat, Step::Open(Accent::Normal)), None);
        assert_eq!(fires(Instrument::TotalAccent, Step::Hit(Accent::Normal)), None);
    }

    #[test]
    fn accent_weights() {
        assert_eq!(accent_weight(Accent::Normal, false, 1.0), NORMAL_WEIGHT);
        assert_eq!(accent_weight(Accent::Strong, false, 1.0), STRONG_WEIGHT);
        assert!(accent_weight(Accent::Strong, true, 1.0) > STRONG_WEIGHT);
        assert_eq!(accent_weight(Accent::Normal, true, 0.0), NORMAL_WEIGHT);
    }

    #[test]
    fn gain_is_weight_times_level_times_master() {
        let mut params = ParamTable::factory();
        params.set_raw(ParamId::BdLevel, 0.5);
        params.set_raw(ParamId::MasterVolume, 0.5);
        let note = note_for(Instrument::BassDrum, Accent::Normal, false, &params, &table());
        assert!((note.gain - NORMAL_WEIGHT * 0.25).abs() < 1e-6);
    }

    #[test]
    fn bass_drum_variant_follows_buckets() {
        let mut params = ParamTable::factory();
        params.set_raw(ParamId::BdTune, 0.0);
        params.set_raw(ParamId::BdDecay, 0.0);
        assert_eq!(note_for(Instrument::BassDrum, Accent::Normal, false, &params, &table()).variant, 0);
        params.set_raw(ParamId::BdTune, 1.0);
        params.set_raw(ParamId::BdDecay, 1.0);
        assert_eq!(note_for(Instrument::BassDrum, Accent::Normal, false, &params, &table()).variant, 11);
        params.set_raw(ParamId::BdTune, 0.3);
        params.set_raw(ParamId::BdDecay, 0.5);
        assert_eq!(note_for(Instrument::BassDrum, Accent::Normal, false, &params, &table()).variant, 4);
    }

    #[test]
    fn snare_tone_sets_cutoff() {
        let mut params = ParamTable::factory();
        params.set_raw(ParamId::SdTone, 0.0);
        let dark = note_for(Instrument::SnareDrum, Accent::Normal, false, &params, &table());
        params.set_raw(ParamId::SdTone, 1.0);
        let bright = note_for(Instrument::SnareDrum, Accent::Normal, false, &params, &table());
        assert!(dark.filter.unwrap().cutoff_hz < bright.filter.unwrap().cutoff_hz);
    }

    #[test]
    fn cymbal_tune_centres_on_unity() {
        let mut params = ParamTable::factory();
        params.set_raw(ParamId::RideTune, 0.5);
        let note = note_for(Instrument::Ride, Accent::Normal, false, &params, &table());
        assert!((note.rate - 1.0).abs() < 1e-6);
        params.set_raw(ParamId::RideTune, 1.0);
        assert!(note_for(Instrument::Ride, Accent::Normal, false, &params, &table()).rate > 1.0);
    }

    #[test]
    fn step_hits_honours_mute_and_flam() {
        let mut record = PatternRecord::new();
        record.set_step(Instrument::BassDrum, 0, Some(Accent::Normal));
        record.set_step(Instrument::SnareDrum, 0, Some(Accent::Strong));
        record.set_step(Instrument::OpenHat, 0, Some(Accent::Normal));
        record.set_flam_enabled(Instrument::SnareDrum, true);

        let params = ParamTable::factory();
        let mut mute = MuteSolo::default();
        mute.set_muted(Lane::BassDrum, true);

        let t = table();
        let hits: Vec<Hit> = step_hits(&record, 0, &params, mute, &t).collect();
        let voices: Vec<Instrument> = hits.iter().map(|h| h.note.instrument).collect();
        assert_eq!(voices, vec![Instrument::SnareDrum, Instrument::OpenHat]);
        assert!(hits[0].flam);
        assert!(!hits[1].flam);
    }

    #[test]
    fn total_accent_raises_every_hit() {
        let mut record = PatternRecord::new();
        record.set_step(Instrument::LowTom, 3, Some(Accent::Normal));
        let params = ParamTable::factory();
        let t = table();
        let plain = step_hits(&record, 3, &params, MuteSolo::default(), &t).next().unwrap();
        record.set_step(Instrument::TotalAccent, 3, Some(Accent::Normal));
        let accented = step_hits(&record, 3, &params, MuteSolo::default(), &t).next().unwrap();
        assert!(accented.note.gain > plain.note.gain);
    }
}
