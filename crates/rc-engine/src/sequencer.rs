//! The sequencer core.
//!
//! [`Sequencer`] owns pattern memory, the playback queue, the parameter
//! table and the mute/solo mask, and exposes the typed operation surface
//! the control surface drives. Every change a display may need to redraw
//! is published through [`Observers`]. Transport and the look-ahead loop
//! live in [`crate::scheduler`].

use alloc::format;
use alloc::string::String;

use rc_ir::{
    Accent, Instrument, Lane, MuteSolo, ParamId, ParamTable, PatternAddress, PatternMemory, PatternRecord,
    PlaybackQueue, Scale, Snapshot, SnapshotError, STEPS,
};

use crate::observer::{Direction, Fact, ListenerKey, Notification, Observers, Transport};
use crate::variants::VariantTable;

/// Look-ahead tuning, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lookahead {
    /// How far ahead of the audio clock steps are committed
    pub horizon_s: f64,
    /// Host timer period between [`Sequencer::tick`] calls
    pub interval_s: f64,
}

impl Default for Lookahead {
    fn default() -> Self {
        Self { horizon_s: 0.08, interval_s: 0.02 }
    }
}

/// Timing attributes of the pattern being played, resolved at
/// pattern boundaries so mid-pattern edits don't shift the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePattern {
    pub address: PatternAddress,
    pub scale: Scale,
    pub first_step: u8,
    pub last_step: u8,
    pub shuffle: f32,
    pub flam: f32,
    pub invert: bool,
}

impl ActivePattern {
    pub fn resolve(memory: &PatternMemory, address: PatternAddress) -> Self {
        let record = memory.read(address);
        Self {
            address,
            scale: record.scale(),
            first_step: record.first_step(),
            last_step: record.last_step(),
            shuffle: record.shuffle(),
            flam: record.flam(),
            invert: record.invert(),
        }
    }

    pub fn direction(&self) -> Direction {
        if self.invert {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    /// Last step played before the pattern wraps.
    pub fn terminal_edge(&self) -> u8 {
        match self.direction() {
            Direction::Forward => self.last_step - 1,
            Direction::Reverse => self.first_step,
        }
    }

    /// Position one step before the first step played.
    pub(crate) fn lead_in(&self) -> i8 {
        match self.direction() {
            Direction::Forward => self.first_step as i8 - 1,
            Direction::Reverse => self.last_step as i8,
        }
    }
}

/// Values the control surface shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayState {
    pub pattern: PatternAddress,
    /// Pattern number within its group, 1-based as printed on the panel
    pub pattern_number: u8,
    pub queue_len: usize,
    pub queue_cursor: usize,
    pub bpm: f32,
    pub beat_position: Option<u8>,
    pub transport: Transport,
    pub recording: bool,
    pub cycle: bool,
}

/// Core engine object.
pub struct Sequencer {
    pub(crate) memory: PatternMemory,
    pub(crate) queue: PlaybackQueue,
    pub(crate) params: ParamTable,
    pub(crate) mute_solo: MuteSolo,
    pub(crate) observers: Observers,
    pub(crate) variants: VariantTable,
    editing: PatternAddress,
    selected: Instrument,
    recording: bool,
    pub(crate) cycle: bool,
    pub(crate) transport: Transport,
    /// Last step scheduled, or the lead-in position before the first one
    pub(crate) position: i8,
    /// Audio-clock time of the next step (s)
    pub(crate) next_time: f64,
    /// Onset of the step last committed, if any since the transport started
    pub(crate) prior_onset: Option<f64>,
    /// Steps committed since the transport started; its parity picks the swing
    pub(crate) played: u32,
    /// The playing entry was deleted and the cursor already rests on its
    /// successor, so the next wrap must not advance past it
    pub(crate) cursor_slid: bool,
    pub(crate) active: ActivePattern,
    pub(crate) beat: Option<u8>,
    pub(crate) lookahead: Lookahead,
    clipboard: Option<PatternRecord>,
    pub(crate) sample_rate: u32,
}

impl Sequencer {
    /// Empty memory, one-entry queue on the first pattern, factory params.
    pub fn new(sample_rate: u32) -> Self {
        let editing = PatternAddress::default();
        let memory = PatternMemory::new();
        let active = ActivePattern::resolve(&memory, editing);
        Self {
            memory,
            queue: PlaybackQueue::new(editing),
            params: ParamTable::factory(),
            mute_solo: MuteSolo::default(),
            observers: Observers::new(),
            variants: VariantTable::default(),
            editing,
            selected: Instrument::BassDrum,
            recording: false,
            cycle: false,
            transport: Transport::Stopped,
            position: active.lead_in(),
            next_time: 0.0,
            prior_onset: None,
            played: 0,
            cursor_slid: false,
            active,
            beat: None,
            lookahead: Lookahead::default(),
            clipboard: None,
            sample_rate,
        }
    }

    pub fn with_lookahead(mut self, lookahead: Lookahead) -> Self {
        self.lookahead = lookahead;
        self
    }

    pub fn with_variants(mut self, variants: VariantTable) -> Self {
        self.variants = variants;
        self
    }

    pub fn memory(&self) -> &PatternMemory {
        &self.memory
    }

    pub fn queue(&self) -> &PlaybackQueue {
        &self.queue
    }

    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    pub fn mute_solo(&self) -> MuteSolo {
        self.mute_solo
    }

    pub fn variants(&self) -> &VariantTable {
        &self.variants
    }

    pub fn lookahead(&self) -> Lookahead {
        self.lookahead
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Rate used to stamp events; must match the bus they are sent to.
    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn active(&self) -> &ActivePattern {
        &self.active
    }

    /// Step most recently scheduled.
    pub fn beat_position(&self) -> Option<u8> {
        self.beat
    }

    // --- observers ---

    pub fn subscribe(&mut self, fact: Fact, callback: impl FnMut(&Notification) + Send + 'static) -> ListenerKey {
        self.observers.subscribe(fact, callback)
    }

    pub fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        self.observers.unsubscribe(key)
    }

    pub(crate) fn notify(&mut self, notification: Notification) {
        self.observers.notify(&notification);
    }

    /// Post a human-readable notice to listeners.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.notify(Notification::Notice(message.into()));
    }

    pub(crate) fn notify_queue(&mut self) {
        let (len, cursor) = (self.queue.len(), self.queue.cursor());
        self.notify(Notification::QueueLength { len, cursor });
    }

    // --- editing context ---

    pub fn editing(&self) -> PatternAddress {
        self.editing
    }

    /// Choose the pattern the editor works on. While stopped, a one-entry
    /// queue follows the selection.
    pub fn select_pattern(&mut self, address: PatternAddress) {
        self.editing = address;
        if !self.transport.is_running() && self.queue.len() == 1 {
            self.queue.replace_current(address);
            self.resync_active();
        }
        self.notify(Notification::CurrentPattern(address));
    }

    pub fn selected_instrument(&self) -> Instrument {
        self.selected
    }

    pub fn select_instrument(&mut self, instrument: Instrument) {
        self.selected = instrument;
    }

    pub fn recording(&self) -> bool {
        self.recording
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub fn cycle(&self) -> bool {
        self.cycle
    }

    pub fn set_cycle(&mut self, cycle: bool) {
        self.cycle = cycle;
    }

    pub fn edit_locked(&self) -> bool {
        self.queue.edit_locked()
    }

    pub fn set_edit_lock(&mut self, locked: bool) {
        self.queue.set_edit_lock(locked);
    }

    // --- pattern edits ---

    /// Write one step. Ignored unless recording; returns whether it landed.
    pub fn write_step(
        &mut self,
        address: PatternAddress,
        instrument: Instrument,
        index: usize,
        value: Option<Accent>,
    ) -> bool {
        if !self.recording || index >= STEPS {
            return false;
        }
        let step = self.memory.write(address, |p| {
            p.set_step(instrument, index, value);
            p.step(instrument.lane(), index)
        });
        self.notify(Notification::StepChanged { address, instrument, index, step });
        true
    }

    /// Apply a mutation to one record, outside the recording gate.
    pub fn edit_pattern<R>(&mut self, address: PatternAddress, mutator: impl FnOnce(&mut PatternRecord) -> R) -> R {
        self.memory.write(address, mutator)
    }

    pub fn set_scale(&mut self, address: PatternAddress, scale: Scale) {
        self.edit_pattern(address, |p| p.set_scale(scale));
    }

    pub fn set_last_step(&mut self, address: PatternAddress, last: u8) {
        self.edit_pattern(address, |p| p.set_last_step(last));
    }

    pub fn set_first_step(&mut self, address: PatternAddress, first: u8) {
        self.edit_pattern(address, |p| p.set_first_step(first));
    }

    pub fn set_shuffle(&mut self, address: PatternAddress, shuffle: f32) {
        self.edit_pattern(address, |p| p.set_shuffle(shuffle));
    }

    pub fn set_flam(&mut self, address: PatternAddress, flam: f32) {
        self.edit_pattern(address, |p| p.set_flam(flam));
    }

    pub fn set_flam_enabled(&mut self, address: PatternAddress, instrument: Instrument, enabled: bool) {
        self.edit_pattern(address, |p| p.set_flam_enabled(instrument, enabled));
    }

    pub fn set_invert(&mut self, address: PatternAddress, invert: bool) {
        self.edit_pattern(address, |p| p.set_invert(invert));
    }

    pub fn clear_pattern(&mut self, address: PatternAddress) {
        self.memory.clear_pattern(address);
        self.notify_lane_redraw(address);
    }

    pub fn clear_instrument(&mut self, address: PatternAddress, instrument: Instrument) {
        self.memory.clear_instrument(address, instrument);
        self.notify_lane_redraw(address);
    }

    fn notify_lane_redraw(&mut self, address: PatternAddress) {
        if !self.observers.wants(Fact::StepChanged) {
            return;
        }
        let record = self.memory.read(address).clone();
        for instrument in Instrument::VOICES.into_iter().chain([Instrument::TotalAccent]) {
            // The open hat shares the closed hat's lane.
            if instrument == Instrument::OpenHat {
                continue;
            }
            for index in 0..STEPS {
                let step = record.step(instrument.lane(), index);
                self.observers.notify(&Notification::StepChanged { address, instrument, index, step });
            }
        }
    }

    pub fn copy_pattern(&mut self, address: PatternAddress) {
        self.clipboard = Some(self.memory.copy_record(address));
    }

    /// Paste the clipboard. Returns false when nothing was copied.
    pub fn paste_pattern(&mut self, address: PatternAddress) -> bool {
        let Some(record) = self.clipboard.take() else {
            return false;
        };
        self.memory.paste_record(address, &record);
        self.clipboard = Some(record);
        self.notify_lane_redraw(address);
        true
    }

    /// Reset memory, queue and parameters to an empty preset.
    pub fn clear_preset(&mut self) {
        self.memory.clear_all();
        self.queue = PlaybackQueue::new(self.editing);
        self.params = ParamTable::factory();
        self.resync_active();
        self.rewind();
        self.notify_queue();
        self.notify_all_params();
    }

    // --- queue edits ---

    pub fn queue_append(&mut self, address: PatternAddress) -> bool {
        let ok = self.queue.append(address);
        self.notify_queue();
        ok
    }

    pub fn queue_insert_after_cursor(&mut self, addresses: &[PatternAddress]) -> usize {
        let inserted = self.queue.insert_after_cursor(addresses);
        self.notify_queue();
        inserted
    }

    pub fn queue_truncate(&mut self) {
        self.queue.truncate_from_cursor();
        self.notify_queue();
    }

    /// Delete the entry under the cursor. While running, the pattern being
    /// played finishes and the entry that slid into its place plays next.
    pub fn queue_delete(&mut self) -> bool {
        let cursor = self.queue.cursor();
        let ok = self.queue.delete_at_cursor();
        if ok && self.transport.is_running() {
            self.cursor_slid = self.queue.cursor() == cursor;
        }
        self.notify_queue();
        ok
    }

    // --- parameters ---

    /// Set a knob position; returns the stored (clamped) value.
    pub fn set_param(&mut self, id: ParamId, raw: f32) -> f32 {
        let raw = self.params.set_raw(id, raw);
        let value = self.params.value(id);
        self.notify(Notification::ParamChanged { id, raw, value });
        raw
    }

    /// Set a knob by its stable name. Unknown names return `None`.
    pub fn set_param_by_name(&mut self, name: &str, raw: f32) -> Option<f32> {
        let id = ParamId::from_name(name)?;
        Some(self.set_param(id, raw))
    }

    fn notify_all_params(&mut self) {
        if !self.observers.wants(Fact::ParamChanged) {
            return;
        }
        for id in ParamId::ALL {
            let (raw, value) = (self.params.raw(id), self.params.value(id));
            self.observers.notify(&Notification::ParamChanged { id, raw, value });
        }
    }

    // --- mute / solo ---

    pub fn set_muted(&mut self, lane: Lane, muted: bool) {
        self.mute_solo.set_muted(lane, muted);
    }

    pub fn set_soloed(&mut self, lane: Lane, soloed: bool) {
        self.mute_solo.set_soloed(lane, soloed);
    }

    pub fn toggle_mute(&mut self, lane: Lane) {
        self.mute_solo.toggle_mute(lane);
    }

    pub fn toggle_solo(&mut self, lane: Lane) {
        self.mute_solo.toggle_solo(lane);
    }

    pub fn set_mute_solo(&mut self, mute_solo: MuteSolo) {
        self.mute_solo = mute_solo;
    }

    // --- persistence ---

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.memory, &self.queue, &self.params, self.cycle)
    }

    /// Replace memory, queue and parameters from a snapshot.
    ///
    /// On error nothing changes and a [`Notification::Notice`] is sent.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let restored = match snapshot.restore() {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "snapshot rejected");
                self.notice(format!("preset not loaded: {}", e));
                return Err(e);
            }
        };
        self.memory = restored.memory;
        self.queue = restored.queue;
        self.params = restored.params;
        self.cycle = restored.cycle;
        self.resync_active();
        self.rewind();
        tracing::info!(patterns = snapshot.patterns.len(), queue = self.queue.len(), "snapshot restored");

        self.notify_queue();
        self.notify_all_params();
        let current = self.active.address;
        self.notify(Notification::CurrentPattern(current));
        self.notice("preset loaded");
        Ok(())
    }

    /// Put the position ahead of the current pattern's first step, so the
    /// next step committed is the head of a fresh queue.
    pub(crate) fn rewind(&mut self) {
        self.position = self.active.lead_in();
        self.played = 0;
        self.cursor_slid = false;
    }

    /// Re-read timing attributes of the queue's current pattern.
    pub(crate) fn resync_active(&mut self) {
        self.active = ActivePattern::resolve(&self.memory, self.queue.current());
        if self.transport.is_running() {
            self.transport = Transport::Running(self.active.direction());
        }
    }

    pub fn display(&self) -> DisplayState {
        let pattern = if self.transport.is_running() { self.active.address } else { self.editing };
        DisplayState {
            pattern,
            pattern_number: pattern.number.get() + 1,
            queue_len: self.queue.len(),
            queue_cursor: self.queue.cursor(),
            bpm: self.params.tempo(),
            beat_position: self.beat,
            transport: self.transport,
            recording: self.recording,
            cycle: self.cycle,
        }
    }
}

impl core::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sequencer")
            .field("transport", &self.transport)
            .field("active", &self.active)
            .field("position", &self.position)
            .field("queue", &self.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_ir::{Step, MEMORY_SIZE};
    use std::sync::{Arc, Mutex};

    fn addr(i: usize) -> PatternAddress {
        PatternAddress::from_index(i).unwrap()
    }

    fn collect(seq: &mut Sequencer, fact: Fact) -> Arc<Mutex<Vec<Notification>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        seq.subscribe(fact, move |n| sink.lock().unwrap().push(n.clone()));
        seen
    }

    #[test]
    fn step_writes_need_recording() {
        let mut seq = Sequencer::new(44_100);
        assert!(!seq.write_step(addr(0), Instrument::BassDrum, 0, Some(Accent::Normal)));
        assert!(seq.memory().read(addr(0)).step(Lane::BassDrum, 0).is_off());

        seq.set_recording(true);
        let seen = collect(&mut seq, Fact::StepChanged);
        assert!(seq.write_step(addr(0), Instrument::BassDrum, 0, Some(Accent::Strong)));
        assert_eq!(seq.memory().read(addr(0)).step(Lane::BassDrum, 0), Step::Hit(Accent::Strong));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!seq.write_step(addr(0), Instrument::BassDrum, STEPS, Some(Accent::Normal)));
    }

    #[test]
    fn param_changes_are_published() {
        let mut seq = Sequencer::new(44_100);
        let seen = collect(&mut seq, Fact::ParamChanged);
        let stored = seq.set_param(ParamId::Tempo, 2.0);
        assert_eq!(stored, 1.0);
        assert_eq!(seq.params().tempo(), rc_ir::TEMPO_MAX);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(seq.set_param_by_name("no_such_knob", 0.5).is_none());
    }

    #[test]
    fn queue_edits_publish_length() {
        let mut seq = Sequencer::new(44_100);
        let seen = collect(&mut seq, Fact::QueueLength);
        assert!(seq.queue_append(addr(1)));
        assert_eq!(seq.queue_insert_after_cursor(&[addr(2), addr(3)]), 2);
        assert_eq!(seq.queue().len(), 4);
        assert!(seq.queue_delete());
        let last = seen.lock().unwrap().last().cloned();
        assert_eq!(last, Some(Notification::QueueLength { len: 3, cursor: 0 }));
    }

    #[test]
    fn copy_paste_is_a_value_copy() {
        let mut seq = Sequencer::new(44_100);
        seq.set_recording(true);
        seq.write_step(addr(5), Instrument::Ride, 3, Some(Accent::Normal));
        assert!(!seq.paste_pattern(addr(6)));
        seq.copy_pattern(addr(5));
        assert!(seq.paste_pattern(addr(6)));
        seq.write_step(addr(5), Instrument::Ride, 3, None);
        assert_eq!(seq.memory().read(addr(6)).step(Lane::Ride, 3), Step::Hit(Accent::Normal));
    }

    #[test]
    fn clear_pattern_redraws_every_lane_blank() {
        let mut seq = Sequencer::new(44_100);
        seq.set_recording(true);
        seq.write_step(addr(7), Instrument::LowTom, 4, Some(Accent::Normal));
        seq.write_step(addr(7), Instrument::OpenHat, 9, Some(Accent::Strong));
        seq.set_last_step(addr(7), 8);
        let seen = collect(&mut seq, Fact::StepChanged);
        seq.clear_pattern(addr(7));

        assert!(!seq.memory().read(addr(7)).is_populated());
        let seen = seen.lock().unwrap();
        // Eleven lanes: the open hat is drawn on the closed hat's.
        assert_eq!(seen.len(), 11 * STEPS);
        assert!(seen.iter().all(|n| matches!(
            n,
            Notification::StepChanged { address, step: Step::Off, .. } if *address == addr(7)
        )));
    }

    #[test]
    fn clear_preset_resets_everything() {
        let mut seq = Sequencer::new(44_100);
        seq.set_recording(true);
        seq.write_step(addr(9), Instrument::HandClap, 0, Some(Accent::Normal));
        seq.queue_append(addr(9));
        seq.set_param(ParamId::CpLevel, 0.1);
        seq.clear_preset();
        assert_eq!(seq.memory().populated().count(), 0);
        assert_eq!(seq.queue().entries(), &[seq.editing()]);
        assert_eq!(seq.params().raw(ParamId::CpLevel), ParamTable::factory().raw(ParamId::CpLevel));
    }

    #[test]
    fn restore_swaps_state_and_resyncs() {
        let mut source = Sequencer::new(44_100);
        source.set_recording(true);
        source.write_step(addr(40), Instrument::SnareDrum, 2, Some(Accent::Normal));
        source.set_scale(addr(40), Scale::Triplet);
        source.set_last_step(addr(40), 12);
        source.select_pattern(addr(40));
        source.set_cycle(true);
        let snap = source.snapshot();

        let mut seq = Sequencer::new(44_100);
        seq.restore(&snap).unwrap();
        assert_eq!(seq.active().address, addr(40));
        assert_eq!(seq.active().scale, Scale::Triplet);
        assert_eq!(seq.active().last_step, 12);
        assert!(seq.cycle());
        assert_eq!(seq.memory().read(addr(40)), source.memory().read(addr(40)));
    }

    #[test]
    fn rejected_restore_leaves_state_and_notifies() {
        let mut seq = Sequencer::new(44_100);
        seq.queue_append(addr(3));
        let notices = collect(&mut seq, Fact::Notice);

        let mut snap = seq.snapshot();
        snap.queue = vec![MEMORY_SIZE as u16];
        assert!(seq.restore(&snap).is_err());
        assert_eq!(seq.queue().len(), 2);
        assert_eq!(notices.lock().unwrap().len(), 1);
    }

    #[test]
    fn display_reports_editing_pattern_while_stopped() {
        let mut seq = Sequencer::new(44_100);
        seq.select_pattern(addr(3));
        let d = seq.display();
        assert_eq!(d.pattern_number, 4);
        assert_eq!(d.queue_len, 1);
        assert!((d.bpm - 120.0).abs() < 1e-3);
        assert_eq!(d.transport, Transport::Stopped);
        assert_eq!(seq.queue().current(), addr(3));
    }
}
