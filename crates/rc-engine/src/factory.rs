//! Factory sample variants.
//!
//! Procedurally rendered stand-ins for every variant in the
//! [`VariantTable`], so the machine is audible without any asset files.
//! Rendering is seeded per variant and therefore deterministic.

use alloc::format;
use alloc::vec::Vec;
use core::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rc_ir::{Instrument, Sample, SampleData};

use crate::filter::OnePole;
use crate::variants::VariantTable;
use crate::voice_pool::VoicePool;

/// Longest factory variant, in seconds.
const MAX_SECONDS: f32 = 2.0;

struct Shape {
    /// Start and end pitch (Hz) of the tonal body; zero disables it
    pitch: (f32, f32),
    /// Pitch sweep time constant (s)
    sweep_s: f32,
    /// Tonal body decay (s)
    body_s: f32,
    /// Noise amplitude and decay (s)
    noise: (f32, f32),
    /// High-pass applied to the noise (Hz)
    noise_hp_hz: f32,
    /// Partials added for metallic voices
    partials: &'static [f32],
}

impl Shape {
    const fn tone(from: f32, to: f32, sweep_s: f32, body_s: f32) -> Self {
        Self { pitch: (from, to), sweep_s, body_s, noise: (0.0, 0.0), noise_hp_hz: 20.0, partials: &[] }
    }

    const fn noise(amp: f32, decay_s: f32, hp_hz: f32) -> Self {
        Self { pitch: (0.0, 0.0), sweep_s: 1.0, body_s: 0.0, noise: (amp, decay_s), noise_hp_hz: hp_hz, partials: &[] }
    }
}

const CYMBAL_PARTIALS: &[f32] = &[3_100.0, 4_700.0, 6_300.0, 8_200.0];

fn shape_for(instrument: Instrument, major: usize, minor: usize) -> Shape {
    let major = major as f32;
    let minor = minor as f32;
    match instrument {
        Instrument::BassDrum => {
            let end = 45.0 + 6.0 * major;
            Shape::tone(end * 3.5, end, 0.025, 0.18 + 0.16 * minor)
        }
        Instrument::SnareDrum => {
            let pitch = 180.0 + 25.0 * major;
            Shape { noise: (0.35 + 0.3 * minor, 0.12), noise_hp_hz: 1_500.0, ..Shape::tone(pitch * 1.4, pitch, 0.01, 0.09) }
        }
        Instrument::LowTom | Instrument::MidTom | Instrument::HighTom => {
            let base = match instrument {
                Instrument::LowTom => 95.0,
                Instrument::MidTom => 140.0,
                _ => 205.0,
            };
            let pitch = base * (1.0 + 0.12 * major);
            Shape::tone(pitch * 1.5, pitch, 0.03, 0.16 + 0.14 * minor)
        }
        Instrument::RimShot => Shape { noise: (0.2, 0.008), noise_hp_hz: 3_000.0, ..Shape::tone(1_700.0, 500.0, 0.004, 0.02) },
        Instrument::HandClap => Shape::noise(0.9, 0.16, 900.0),
        Instrument::ClosedHat => Shape::noise(0.7, 0.25, 7_000.0),
        Instrument::OpenHat => Shape::noise(0.7, 0.8, 7_000.0),
        Instrument::Crash => Shape { partials: CYMBAL_PARTIALS, ..Shape::noise(0.8, 1.4, 5_000.0) },
        Instrument::Ride => Shape { partials: CYMBAL_PARTIALS, ..Shape::noise(0.4, 1.1, 6_000.0) },
        Instrument::TotalAccent => Shape::noise(0.0, 0.0, 20.0),
    }
}

/// Render one factory variant.
pub fn factory_sample(instrument: Instrument, variant: usize, table: &VariantTable, sample_rate: u32) -> Sample {
    let (major, minor) = table.split_variant(instrument, variant);
    let shape = shape_for(instrument, major, minor);
    let sr = sample_rate as f32;

    let tail = shape.body_s.max(shape.noise.1);
    let len = ((tail * 6.0).min(MAX_SECONDS) * sr) as usize;

    let seed = ((instrument as u64) << 8) | variant as u64;
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut noise_hp = OnePole::high_pass(shape.noise_hp_hz, sample_rate);

    let mut phase = 0.0f32;
    let mut partial_phase = [0.0f32; 4];
    let mut data = Vec::with_capacity(len);
    for i in 0..len {
        let t = i as f32 / sr;
        let mut x = 0.0;

        if shape.pitch.1 > 0.0 {
            let (from, to) = shape.pitch;
            let freq = to + (from - to) * libm::expf(-t / shape.sweep_s);
            phase = wrap(phase + freq / sr);
            x += libm::sinf(TAU * phase) * libm::expf(-t / shape.body_s);
        }

        if shape.noise.0 > 0.0 {
            let mut n = noise_hp.process(rng.gen_range(-1.0f32..1.0));
            if instrument == Instrument::HandClap {
                n *= clap_envelope(t);
            } else {
                n *= libm::expf(-t / shape.noise.1);
            }
            for (p, &freq) in partial_phase.iter_mut().zip(shape.partials) {
                *p = wrap(*p + freq / sr);
                n += 0.15 * square(*p) * libm::expf(-t / shape.noise.1);
            }
            x += shape.noise.0 * n;
        }

        data.push((x.clamp(-1.0, 1.0) * 32767.0) as i16);
    }

    Sample::new(&format!("{}_{}", instrument.stem(), variant), SampleData::Mono16(data), sample_rate)
}

/// Three short bursts followed by a decaying tail.
fn clap_envelope(t: f32) -> f32 {
    const BURST_S: f32 = 0.011;
    if t < BURST_S * 3.0 {
        libm::expf(-(t % BURST_S) / 0.003)
    } else {
        libm::expf(-(t - BURST_S * 3.0) / 0.12)
    }
}

fn wrap(phase: f32) -> f32 {
    phase - libm::floorf(phase)
}

fn square(phase: f32) -> f32 {
    if phase < 0.5 {
        1.0
    } else {
        -1.0
    }
}

/// Fill every variant slot of every voice with its factory rendering.
pub fn load_factory_bank(pool: &mut VoicePool, table: &VariantTable) {
    let sample_rate = pool.output_rate();
    for instrument in Instrument::VOICES {
        for variant in 0..table.variant_count(instrument) {
            pool.insert_variant(instrument, variant, factory_sample(instrument, variant, table, sample_rate));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(sample: &Sample) -> i16 {
        match &sample.data {
            SampleData::Mono16(v) => v.iter().map(|s| s.saturating_abs()).max().unwrap_or(0),
            SampleData::Mono8(_) => unreachable!(),
        }
    }

    #[test]
    fn every_variant_is_audible() {
        let table = VariantTable::default();
        for instrument in Instrument::VOICES {
            for variant in 0..table.variant_count(instrument) {
                let s = factory_sample(instrument, variant, &table, 22_050);
                assert!(!s.is_empty(), "{:?} {} empty", instrument, variant);
                assert!(peak(&s) > 1_000, "{:?} {} too quiet", instrument, variant);
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let table = VariantTable::default();
        let a = factory_sample(Instrument::ClosedHat, 0, &table, 22_050);
        let b = factory_sample(Instrument::ClosedHat, 0, &table, 22_050);
        match (&a.data, &b.data) {
            (SampleData::Mono16(x), SampleData::Mono16(y)) => assert_eq!(x, y),
            _ => unreachable!(),
        }
        assert_eq!(a.name, "ch_0");
    }

    #[test]
    fn longer_decay_bucket_gives_longer_kick() {
        let table = VariantTable::default();
        let short = factory_sample(Instrument::BassDrum, table.variant_index(Instrument::BassDrum, 0, 0), &table, 22_050);
        let long = factory_sample(Instrument::BassDrum, table.variant_index(Instrument::BassDrum, 0, 2), &table, 22_050);
        assert!(long.len() > short.len());
    }

    #[test]
    fn bank_fills_every_slot() {
        let table = VariantTable::default();
        let mut pool = VoicePool::new(4, 11_025);
        load_factory_bank(&mut pool, &table);
        assert_eq!(pool.loaded_variants(Instrument::BassDrum), 12);
        assert_eq!(pool.loaded_variants(Instrument::Ride), 1);
    }
}
