//! Transport and look-ahead scheduling.
//!
//! The host calls [`Sequencer::tick`] from a coarse periodic timer with the
//! audio clock's current time. Each call commits every step whose onset
//! falls inside the look-ahead horizon to a [`BusSink`], stamped with the
//! audio-clock frame it must fire on. Host timer jitter therefore never
//! reaches the output: the audio side owns the firing time.

use rc_ir::timing::{flam_onset_after, seconds_to_frames, step_duration, swung_interval};

use crate::dispatch::{step_hits, FLAM_GAIN};
use crate::event_queue::{BusEvent, BusPayload, BusSink};
use crate::observer::{Direction, Notification, Transport};
use crate::sequencer::Sequencer;

impl Sequencer {
    /// Start from the head of the queue. The first step lands at `now`.
    pub fn start(&mut self, now: f64) {
        self.queue.set_cursor(0);
        self.resync_active();
        self.rewind();
        self.next_time = now;
        self.prior_onset = None;
        self.set_transport(Transport::Running(self.active.direction()));
        tracing::debug!(pattern = self.active.address.index(), "transport start");
        let current = self.active.address;
        self.notify(Notification::CurrentPattern(current));
        self.notify_queue();
    }

    /// Halt scheduling. Events already handed to the bus still play; the
    /// step position is kept for [`Sequencer::resume`].
    pub fn stop(&mut self) {
        if !self.transport.is_running() {
            return;
        }
        self.halt();
        tracing::debug!(position = self.position, "transport stop");
    }

    fn halt(&mut self) {
        self.set_transport(Transport::Stopped);
        self.beat = None;
        self.notify(Notification::BeatPosition(None));
    }

    /// Continue from the retained position, clamped into the current
    /// pattern's window.
    pub fn resume(&mut self, now: f64) {
        if self.transport.is_running() {
            return;
        }
        self.queue.resolve_cursor();
        self.resync_active();
        let a = self.active;
        self.position = match a.direction() {
            Direction::Forward => self.position.clamp(a.first_step as i8 - 1, a.last_step as i8 - 1),
            Direction::Reverse => self.position.clamp(a.first_step as i8, a.last_step as i8),
        };
        self.next_time = now;
        self.prior_onset = None;
        self.played = 0;
        self.cursor_slid = false;
        self.set_transport(Transport::Running(a.direction()));
        tracing::debug!(position = self.position, "transport resume");
    }

    fn set_transport(&mut self, transport: Transport) {
        self.transport = transport;
        self.notify(Notification::Transport(transport));
    }

    /// Audio-clock time the next step is due at.
    pub fn next_step_time(&self) -> f64 {
        self.next_time
    }

    /// Run one pass of the look-ahead loop. Returns the number of steps
    /// committed.
    pub fn tick(&mut self, now: f64, sink: &mut impl BusSink) -> usize {
        let mut scheduled = 0;
        while self.transport.is_running() && self.next_time < now + self.lookahead.horizon_s {
            let step = self.advance_position();
            let at = self.next_time;
            let nominal = step_duration(self.params.tempo(), self.active.scale);

            self.dispatch_step(step, at, nominal, sink);
            self.next_time += swung_interval(nominal, self.active.shuffle, self.played);
            self.played = self.played.wrapping_add(1);
            self.prior_onset = Some(at);
            self.beat = Some(step);
            self.notify(Notification::BeatPosition(Some(step)));
            scheduled += 1;

            if self.at_terminal_step(step) {
                tracing::info!(pattern = self.active.address.index(), "queue played through, stopping");
                self.halt();
            }
        }
        scheduled
    }

    /// Move one step in the active direction, wrapping into the next
    /// queue entry at the window edge.
    fn advance_position(&mut self) -> u8 {
        let a = self.active;
        let next = match a.direction() {
            Direction::Forward => self.position + 1,
            Direction::Reverse => self.position - 1,
        };
        if next >= a.first_step as i8 && next < a.last_step as i8 {
            self.position = next;
            return next as u8;
        }

        let previous = a.address;
        if core::mem::take(&mut self.cursor_slid) {
            self.queue.resolve_cursor();
        } else {
            self.queue.advance();
        }
        self.resync_active();
        let a = self.active;
        self.position = match a.direction() {
            Direction::Forward => a.first_step as i8,
            Direction::Reverse => a.last_step as i8 - 1,
        };
        if a.address != previous {
            tracing::debug!(from = previous.index(), to = a.address.index(), "pattern change");
            self.notify(Notification::CurrentPattern(a.address));
        }
        self.notify_queue();
        self.position as u8
    }

    fn at_terminal_step(&self, step: u8) -> bool {
        !self.cycle
            && !self.cursor_slid
            && !self.queue.edit_locked()
            && self.queue.at_last()
            && step == self.active.terminal_edge()
    }

    /// Commit one step: flam pre-hits, the step's mix update, then the
    /// main hits, in that order.
    fn dispatch_step(&self, step: u8, at: f64, nominal: f64, sink: &mut impl BusSink) {
        let record = self.memory.read(self.active.address);
        let index = step as usize;
        let hits = || step_hits(record, index, &self.params, self.mute_solo, &self.variants);

        let mut gain_sum = 0.0;
        let flam_at = flam_onset_after(at, self.active.flam, nominal, self.prior_onset);
        let flam_frame = seconds_to_frames(flam_at, self.sample_rate);
        for hit in hits().filter(|h| h.flam) {
            let mut note = hit.note;
            note.gain *= FLAM_GAIN;
            gain_sum += note.gain;
            sink.submit(BusEvent { frame: flam_frame, payload: BusPayload::Note(note) });
        }

        let frame = seconds_to_frames(at, self.sample_rate);
        gain_sum += hits().map(|h| h.note.gain).sum::<f32>();
        sink.submit(BusEvent { frame, payload: BusPayload::StepMix { gain_sum, master: self.params.master() } });
        for hit in hits() {
            sink.submit(BusEvent { frame, payload: BusPayload::Note(hit.note) });
        }
    }
}
