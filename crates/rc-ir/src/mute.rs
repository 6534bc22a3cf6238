//! Mute and solo masks.

use crate::instrument::{Instrument, Lane};

/// Bitmasks over the voice lanes. The two hi-hat voices share a bit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MuteSolo {
    mute: u16,
    solo: u16,
}

impl MuteSolo {
    pub fn mute_bits(&self) -> u16 {
        self.mute
    }

    pub fn solo_bits(&self) -> u16 {
        self.solo
    }

    pub fn set_muted(&mut self, lane: Lane, muted: bool) {
        set_bit(&mut self.mute, lane.bit(), muted);
    }

    pub fn set_soloed(&mut self, lane: Lane, soloed: bool) {
        set_bit(&mut self.solo, lane.bit(), soloed);
    }

    pub fn toggle_mute(&mut self, lane: Lane) {
        self.mute ^= lane.bit();
    }

    pub fn toggle_solo(&mut self, lane: Lane) {
        self.solo ^= lane.bit();
    }

    /// A lane sounds if it isn't muted and either nothing is soloed or it is.
    pub fn is_audible(&self, lane: Lane) -> bool {
        let b = lane.bit();
        let muted = self.mute & b != 0;
        if self.solo == 0 {
            !muted
        } else {
            self.solo & b != 0 && !muted
        }
    }

    pub fn instrument_audible(&self, instrument: Instrument) -> bool {
        self.is_audible(instrument.lane())
    }
}

fn set_bit(mask: &mut u16, bit: u16, on: bool) {
    if on {
        *mask |= bit;
    } else {
        *mask &= !bit;
    }
}
