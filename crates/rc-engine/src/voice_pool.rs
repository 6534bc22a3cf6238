//! VoicePool: voice allocation and the sample-variant bank.

use alloc::vec::Vec;
use rc_ir::{Instrument, Sample, SampleKey, NUM_VOICES};
use slotmap::SlotMap;

use crate::dispatch::NoteSpec;
use crate::voice::Voice;

/// Identifier for a voice slot in the pool.
pub type VoiceId = usize;

/// Default number of simultaneous voices.
pub const DEFAULT_MAX_VOICES: usize = 64;

/// Fixed pool of voices with the sample bank they read from.
pub struct VoicePool {
    /// Voice slots (None = free).
    pub(crate) slots: Vec<Option<Voice>>,
    /// Sample bank (owns all sample data).
    pub sample_bank: SlotMap<SampleKey, Sample>,
    /// Variant keys per voice index
    variants: Vec<Vec<Option<SampleKey>>>,
    output_rate: u32,
}

impl VoicePool {
    /// Create an empty pool with `max_voices` slots.
    pub fn new(max_voices: usize, output_rate: u32) -> Self {
        Self {
            slots: (0..max_voices.max(1)).map(|_| None).collect(),
            sample_bank: SlotMap::with_key(),
            variants: (0..NUM_VOICES).map(|_| Vec::new()).collect(),
            output_rate,
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Store a sample as one variant of a voice, replacing any previous one.
    pub fn insert_variant(&mut self, instrument: Instrument, variant: usize, sample: Sample) -> Option<SampleKey> {
        let voice = instrument.voice_index()?;
        let key = self.sample_bank.insert(sample);
        let slots = &mut self.variants[voice];
        if slots.len() <= variant {
            slots.resize(variant + 1, None);
        }
        if let Some(old) = slots[variant].replace(key) {
            self.sample_bank.remove(old);
        }
        Some(key)
    }

    /// Key of a loaded variant.
    pub fn variant_key(&self, instrument: Instrument, variant: usize) -> Option<SampleKey> {
        let voice = instrument.voice_index()?;
        self.variants[voice].get(variant).copied().flatten()
    }

    /// Number of variant slots filled for a voice.
    pub fn loaded_variants(&self, instrument: Instrument) -> usize {
        instrument
            .voice_index()
            .map_or(0, |v| self.variants[v].iter().filter(|k| k.is_some()).count())
    }

    /// Start a note. Notes whose variant isn't loaded are skipped.
    pub fn start(&mut self, note: &NoteSpec) -> Option<VoiceId> {
        let key = self.variant_key(note.instrument, note.variant as usize)?;
        let sample = self.sample_bank.get(key)?;
        let voice = Voice::new(key, sample, note, self.output_rate);
        if !voice.playing {
            return None;
        }
        Some(self.allocate(voice))
    }

    /// Allocate a voice slot, returning its ID.
    /// Steals the quietest voice if the pool is full.
    pub fn allocate(&mut self, voice: Voice) -> VoiceId {
        // First try a free slot
        if let Some(id) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[id] = Some(voice);
            return id;
        }
        let id = self.find_steal_candidate();
        self.slots[id] = Some(voice);
        id
    }

    fn find_steal_candidate(&self) -> VoiceId {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i, v.level())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Get a reference to a voice.
    pub fn get(&self, id: VoiceId) -> Option<&Voice> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }

    /// Kill (remove) a voice immediately.
    pub fn kill(&mut self, id: VoiceId) {
        if let Some(slot) = self.slots.get_mut(id) {
            *slot = None;
        }
    }

    pub fn kill_all(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    /// Remove voices that have stopped playing.
    pub fn reap_finished(&mut self) {
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|v| !v.playing) {
                *slot = None;
            }
        }
    }

    /// Count of active (occupied) voice slots.
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Render all active voices and return their sum.
    pub fn render_all(&mut self) -> f32 {
        let bank = &self.sample_bank;
        let mut sum = 0.0;
        for voice in self.slots.iter_mut().flatten() {
            if let Some(sample) = bank.get(voice.sample_key) {
                sum += voice.render(sample);
            } else {
                voice.playing = false;
            }
        }
        sum
    }
}
