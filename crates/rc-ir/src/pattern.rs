//! Pattern record: eleven 16-step lanes plus timing attributes.

use crate::instrument::{Instrument, Lane, NUM_LANES};
use crate::step::{Accent, Step};

/// Step slots per lane.
pub const STEPS: usize = 16;

/// Shuffle is clamped to this magnitude (fraction of a step).
pub const SHUFFLE_LIMIT: f32 = 0.45;

/// Flam factor range (fraction of a step).
pub const FLAM_MIN: f32 = -0.20;
pub const FLAM_MAX: f32 = 0.30;

/// Subdivision grid selected by a pattern's scale code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scale {
    /// Code 1: four steps per beat
    #[default]
    Sixteenth,
    /// Code 2: eight steps per beat
    ThirtySecond,
    /// Code 3: three steps per beat
    Triplet,
    /// Code 4: six steps per beat
    Sextuplet,
}

impl Scale {
    /// Scale for a stored code (1..=4).
    pub const fn from_code(code: u8) -> Option<Scale> {
        match code {
            1 => Some(Scale::Sixteenth),
            2 => Some(Scale::ThirtySecond),
            3 => Some(Scale::Triplet),
            4 => Some(Scale::Sextuplet),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Scale::Sixteenth => 1,
            Scale::ThirtySecond => 2,
            Scale::Triplet => 3,
            Scale::Sextuplet => 4,
        }
    }

    /// Steps per quarter-note beat.
    pub const fn steps_per_beat(self) -> u32 {
        match self {
            Scale::Sixteenth => 4,
            Scale::ThirtySecond => 8,
            Scale::Triplet => 3,
            Scale::Sextuplet => 6,
        }
    }
}

/// One pattern.
///
/// The active window is `[first_step, last_step)`; steps outside it are
/// kept but never played. `0 <= first_step < last_step <= 16` holds after
/// every setter.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternRecord {
    steps: [[Step; STEPS]; NUM_LANES],
    scale: Scale,
    /// BASE: the step at which the pattern wraps (exclusive)
    last_step: u8,
    first_step: u8,
    shuffle: f32,
    flam: f32,
    /// Per-lane flam enable; the hi-hat entry uses bits for closed and open
    flam_lanes: [u8; NUM_LANES],
    invert: bool,
}

impl Default for PatternRecord {
    fn default() -> Self {
        Self {
            steps: [[Step::Off; STEPS]; NUM_LANES],
            scale: Scale::Sixteenth,
            last_step: STEPS as u8,
            first_step: 0,
            shuffle: 0.0,
            flam: 0.0,
            flam_lanes: [0; NUM_LANES],
            invert: false,
        }
    }
}

impl PatternRecord {
    pub fn new() -> Self {
        Self::default()
    }

    // --- steps ---

    /// Step at `index` on a lane.
    pub fn step(&self, lane: Lane, index: usize) -> Step {
        self.steps[lane.index()][index]
    }

    /// All sixteen slots of a lane.
    pub fn lane(&self, lane: Lane) -> &[Step; STEPS] {
        &self.steps[lane.index()]
    }

    /// Write one instrument's step.
    ///
    /// On the hi-hat lane a closed write replaces an open step and vice
    /// versa. Clearing (`None`) only silences the slot if it currently
    /// belongs to the given hat voice.
    pub fn set_step(&mut self, instrument: Instrument, index: usize, value: Option<Accent>) {
        let slot = &mut self.steps[instrument.lane().index()][index];
        *slot = match (instrument, value) {
            (Instrument::OpenHat, Some(a)) => Step::Open(a),
            (Instrument::OpenHat, None) if matches!(slot, Step::Open(_)) => Step::Off,
            (Instrument::ClosedHat, None) if matches!(slot, Step::Hit(_)) => Step::Off,
            (Instrument::OpenHat | Instrument::ClosedHat, None) => *slot,
            (_, Some(a)) => Step::Hit(a),
            (_, None) => Step::Off,
        };
    }

    /// Store a raw step on a lane (used when restoring stored data).
    pub fn set_lane_step(&mut self, lane: Lane, index: usize, step: Step) {
        self.steps[lane.index()][index] = match (lane, step) {
            (Lane::HiHat, s) => s,
            (_, Step::Open(a)) => Step::Hit(a),
            (_, s) => s,
        };
    }

    /// Zero one instrument's sequence.
    ///
    /// For the hat voices only the slots holding that voice are cleared.
    pub fn clear_instrument(&mut self, instrument: Instrument) {
        let lane = &mut self.steps[instrument.lane().index()];
        for slot in lane.iter_mut() {
            let clear = match instrument {
                Instrument::ClosedHat => matches!(slot, Step::Hit(_)),
                Instrument::OpenHat => matches!(slot, Step::Open(_)),
                _ => true,
            };
            if clear {
                *slot = Step::Off;
            }
        }
    }

    /// Returns true if any lane holds an active step.
    pub fn has_steps(&self) -> bool {
        self.steps.iter().flatten().any(|s| !s.is_off())
    }

    /// Returns true if the record has data worth storing in a sparse snapshot.
    pub fn is_populated(&self) -> bool {
        self.has_steps() || self.first_step != 0 || self.last_step != STEPS as u8
    }

    // --- timing attributes ---

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    /// BASE, the exclusive end of the active window (1..=16).
    pub fn last_step(&self) -> u8 {
        self.last_step
    }

    /// Set BASE, dragging the first step down if the window would close.
    pub fn set_last_step(&mut self, last: u8) {
        self.last_step = last.clamp(1, STEPS as u8);
        if self.first_step >= self.last_step {
            self.first_step = self.last_step - 1;
        }
    }

    pub fn first_step(&self) -> u8 {
        self.first_step
    }

    /// Set the first step, clamped into `0..last_step`.
    pub fn set_first_step(&mut self, first: u8) {
        self.first_step = first.min(self.last_step - 1);
    }

    pub fn shuffle(&self) -> f32 {
        self.shuffle
    }

    pub fn set_shuffle(&mut self, shuffle: f32) {
        self.shuffle = if shuffle.is_finite() {
            shuffle.clamp(-SHUFFLE_LIMIT, SHUFFLE_LIMIT)
        } else {
            0.0
        };
    }

    pub fn flam(&self) -> f32 {
        self.flam
    }

    pub fn set_flam(&mut self, flam: f32) {
        self.flam = if flam.is_finite() { flam.clamp(FLAM_MIN, FLAM_MAX) } else { 0.0 };
    }

    /// Raw flam field of a lane (0..=3 on the hat lane, 0..=1 elsewhere).
    pub fn flam_field(&self, lane: Lane) -> u8 {
        self.flam_lanes[lane.index()]
    }

    /// Store a raw flam field, masked to the bits valid for the lane.
    pub fn set_flam_field(&mut self, lane: Lane, field: u8) {
        let mask = if lane == Lane::HiHat { 0b11 } else { 0b01 };
        self.flam_lanes[lane.index()] = field & mask;
    }

    pub fn flam_enabled(&self, instrument: Instrument) -> bool {
        self.flam_lanes[instrument.lane().index()] & instrument.flam_bit() != 0
    }

    pub fn set_flam_enabled(&mut self, instrument: Instrument, enabled: bool) {
        let field = &mut self.flam_lanes[instrument.lane().index()];
        if enabled {
            *field |= instrument.flam_bit();
        } else {
            *field &= !instrument.flam_bit();
        }
    }

    pub fn invert(&self) -> bool {
        self.invert
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    /// Reset steps and timing attributes to defaults.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_holds(p: &PatternRecord) -> bool {
        p.first_step() < p.last_step() && p.last_step() as usize <= STEPS
    }

    #[test]
    fn window_invariant_survives_edits() {
        let mut p = PatternRecord::new();
        let edits: &[(u8, u8)] = &[(0, 16), (15, 16), (20, 3), (2, 1), (0, 0), (7, 200), (255, 9)];
        for &(first, last) in edits {
            p.set_first_step(first);
            assert!(window_holds(&p));
            p.set_last_step(last);
            assert!(window_holds(&p));
        }
    }

    #[test]
    fn lowering_base_drags_first_step() {
        let mut p = PatternRecord::new();
        p.set_first_step(10);
        p.set_last_step(4);
        assert_eq!(p.last_step(), 4);
        assert_eq!(p.first_step(), 3);
    }

    #[test]
    fn hat_voices_replace_each_other() {
        let mut p = PatternRecord::new();
        p.set_step(Instrument::ClosedHat, 2, Some(Accent::Normal));
        p.set_step(Instrument::OpenHat, 2, Some(Accent::Strong));
        assert_eq!(p.step(Lane::HiHat, 2), Step::Open(Accent::Strong));

        // clearing the closed voice leaves the open hit alone
        p.set_step(Instrument::ClosedHat, 2, None);
        assert_eq!(p.step(Lane::HiHat, 2), Step::Open(Accent::Strong));
        p.set_step(Instrument::OpenHat, 2, None);
        assert_eq!(p.step(Lane::HiHat, 2), Step::Off);
    }

    #[test]
    fn clear_instrument_on_hat_lane_is_selective() {
        let mut p = PatternRecord::new();
        p.set_step(Instrument::ClosedHat, 0, Some(Accent::Normal));
        p.set_step(Instrument::OpenHat, 1, Some(Accent::Normal));
        p.set_step(Instrument::ClosedHat, 2, Some(Accent::Strong));

        p.clear_instrument(Instrument::ClosedHat);
        assert_eq!(p.step(Lane::HiHat, 0), Step::Off);
        assert_eq!(p.step(Lane::HiHat, 1), Step::Open(Accent::Normal));
        assert_eq!(p.step(Lane::HiHat, 2), Step::Off);
    }

    #[test]
    fn plain_lane_rejects_open_steps() {
        let mut p = PatternRecord::new();
        p.set_lane_step(Lane::SnareDrum, 4, Step::Open(Accent::Normal));
        assert_eq!(p.step(Lane::SnareDrum, 4), Step::Hit(Accent::Normal));
    }

    #[test]
    fn shuffle_and_flam_are_clamped() {
        let mut p = PatternRecord::new();
        p.set_shuffle(2.0);
        assert_eq!(p.shuffle(), SHUFFLE_LIMIT);
        p.set_shuffle(f32::NAN);
        assert_eq!(p.shuffle(), 0.0);
        p.set_flam(-1.0);
        assert_eq!(p.flam(), FLAM_MIN);
    }

    #[test]
    fn flam_bits_per_hat_voice() {
        let mut p = PatternRecord::new();
        p.set_flam_enabled(Instrument::OpenHat, true);
        assert!(p.flam_enabled(Instrument::OpenHat));
        assert!(!p.flam_enabled(Instrument::ClosedHat));
        p.set_flam_enabled(Instrument::ClosedHat, true);
        assert_eq!(p.flam_field(Lane::HiHat), 3);
        p.set_flam_field(Lane::BassDrum, 3);
        assert_eq!(p.flam_field(Lane::BassDrum), 1);
    }

    #[test]
    fn scale_codes() {
        for code in 1..=4 {
            assert_eq!(Scale::from_code(code).unwrap().code(), code);
        }
        assert_eq!(Scale::from_code(0), None);
        assert_eq!(Scale::Triplet.steps_per_beat(), 3);
    }

    #[test]
    fn populated_tracks_window_and_steps() {
        let mut p = PatternRecord::new();
        assert!(!p.is_populated());
        p.set_last_step(12);
        assert!(p.is_populated());
        p.clear();
        p.set_step(Instrument::Ride, 3, Some(Accent::Normal));
        assert!(p.is_populated());
    }
}
