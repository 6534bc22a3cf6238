//! Voice: one sounding note.
//!
//! A voice is the per-note signal chain: sample source, rate, optional
//! decay envelope, optional filter and the level gain. It is built when its
//! note starts and dropped when it runs out, so there is nothing to tear
//! down by hand.

use rc_ir::{Instrument, Sample, SampleKey};

use crate::dispatch::NoteSpec;
use crate::filter::OnePole;
use crate::frequency::rate_to_increment;

/// Envelope level below which a voice is considered finished.
const SILENCE: f32 = 1.0e-4;

/// A single voice producing audio from a sample.
#[derive(Clone, Debug)]
pub struct Voice {
    /// Which sample variant this voice plays.
    pub sample_key: SampleKey,
    pub instrument: Instrument,
    /// Current position in sample (16.16 fixed-point).
    pub position: u64,
    /// Playback increment (16.16 fixed-point).
    pub increment: u64,
    /// Is the voice currently producing audio?
    pub playing: bool,
    /// Current envelope level.
    pub envelope: f32,
    /// Per-frame envelope multiplier (1.0 = no envelope).
    pub decay_coeff: f32,
    pub filter: Option<OnePole>,
    pub gain: f32,
}

impl Voice {
    /// Build the chain for a note.
    pub fn new(sample_key: SampleKey, sample: &Sample, note: &NoteSpec, output_rate: u32) -> Self {
        let decay_coeff = match note.decay_s {
            Some(tau) if tau > 0.0 => libm::expf(-1.0 / (tau * output_rate as f32)),
            _ => 1.0,
        };
        Self {
            sample_key,
            instrument: note.instrument,
            position: 0,
            increment: rate_to_increment(note.rate, sample.sample_rate, output_rate),
            playing: note.gain > 0.0,
            envelope: 1.0,
            decay_coeff,
            filter: note.filter.map(|spec| OnePole::new(spec, output_rate)),
            gain: note.gain,
        }
    }

    /// Current loudness estimate, used to pick a voice to steal.
    pub fn level(&self) -> f32 {
        if self.playing {
            self.envelope * self.gain
        } else {
            0.0
        }
    }

    /// Render one sample, reading from the given sample data.
    pub fn render(&mut self, sample: &Sample) -> f32 {
        if !self.playing {
            return 0.0;
        }

        let raw = sample.data.get_mono_interpolated(self.position) as f32 / 32768.0;
        let mut value = raw * self.envelope;
        if let Some(filter) = self.filter.as_mut() {
            value = filter.process(value);
        }

        self.position += self.increment;
        self.envelope *= self.decay_coeff;
        if (self.position >> 16) as usize >= sample.len() || self.envelope < SILENCE || self.increment == 0 {
            self.playing = false;
        }

        value * self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_ir::SampleData;
    use slotmap::SlotMap;

    fn test_sample(len: usize) -> Sample {
        Sample::new("test", SampleData::Mono16(vec![16384; len]), 44100)
    }

    fn note(gain: f32, decay_s: Option<f32>) -> NoteSpec {
        NoteSpec {
            instrument: Instrument::RimShot,
            variant: 0,
            rate: 1.0,
            decay_s,
            filter: None,
            gain,
        }
    }

    fn voice_for(sample: &Sample, note: &NoteSpec) -> Voice {
        let mut bank: SlotMap<SampleKey, Sample> = SlotMap::with_key();
        let key = bank.insert(sample.clone());
        Voice::new(key, sample, note, 44100)
    }

    #[test]
    fn renders_scaled_by_gain() {
        let sample = test_sample(10);
        let mut voice = voice_for(&sample, &note(0.5, None));
        let out = voice.render(&sample);
        assert!((out - 0.25).abs() < 1e-3);
    }

    #[test]
    fn stops_at_end_of_sample() {
        let sample = test_sample(4);
        let mut voice = voice_for(&sample, &note(1.0, None));
        for _ in 0..4 {
            voice.render(&sample);
        }
        assert!(!voice.playing);
        assert_eq!(voice.render(&sample), 0.0);
    }

    #[test]
    fn envelope_decays_and_ends_note() {
        let sample = test_sample(44100);
        let mut voice = voice_for(&sample, &note(1.0, Some(0.01)));
        let first = voice.render(&sample);
        for _ in 0..441 {
            voice.render(&sample);
        }
        let later = voice.render(&sample);
        assert!(later < first * 0.5);
        for _ in 0..44100 {
            voice.render(&sample);
        }
        assert!(!voice.playing);
    }

    #[test]
    fn zero_gain_never_plays() {
        let sample = test_sample(10);
        let voice = voice_for(&sample, &note(0.0, None));
        assert!(!voice.playing);
        assert_eq!(voice.level(), 0.0);
    }
}
