//! Step values and their legacy integer encoding.

use crate::instrument::Lane;

/// Hit strength of an active step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Accent {
    #[default]
    Normal,
    Strong,
}

/// One step slot of a lane.
///
/// `Hit` is the ordinary hit on every lane and means "closed" on the
/// hi-hat lane. `Open` only ever appears on the hi-hat lane; the two hat
/// voices share the slot, so writing one replaces the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Step {
    #[default]
    Off,
    Hit(Accent),
    Open(Accent),
}

impl Step {
    /// Returns true if the slot is silent.
    pub const fn is_off(self) -> bool {
        matches!(self, Step::Off)
    }

    /// Accent of an active step.
    pub const fn accent(self) -> Option<Accent> {
        match self {
            Step::Off => None,
            Step::Hit(a) | Step::Open(a) => Some(a),
        }
    }

    /// Encode to the stored integer form.
    ///
    /// Plain lanes: 0 off, 1 normal, 2 accent. Hi-hat: 0 silent,
    /// 1/2 closed normal/accent, 3 open normal, 6 open accent.
    pub const fn code(self) -> u8 {
        match self {
            Step::Off => 0,
            Step::Hit(Accent::Normal) => 1,
            Step::Hit(Accent::Strong) => 2,
            Step::Open(Accent::Normal) => 3,
            Step::Open(Accent::Strong) => 6,
        }
    }

    /// Decode a stored integer for the given lane.
    ///
    /// Codes 3..=5 on the hat lane decode to open/normal and 6 or above to
    /// open/accent. On plain lanes anything from 2 up is an accented hit.
    pub fn from_code(lane: Lane, code: u8) -> Step {
        match (lane, code) {
            (_, 0) => Step::Off,
            (_, 1) => Step::Hit(Accent::Normal),
            (_, 2) => Step::Hit(Accent::Strong),
            (Lane::HiHat, 3..=5) => Step::Open(Accent::Normal),
            (Lane::HiHat, _) => Step::Open(Accent::Strong),
            (_, _) => Step::Hit(Accent::Strong),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hat_codes_round_trip() {
        for step in [
            Step::Off,
            Step::Hit(Accent::Normal),
            Step::Hit(Accent::Strong),
            Step::Open(Accent::Normal),
            Step::Open(Accent::Strong),
        ] {
            assert_eq!(Step::from_code(Lane::HiHat, step.code()), step);
        }
    }

    #[test]
    fn open_codes_collapse_on_decode() {
        assert_eq!(Step::from_code(Lane::HiHat, 4), Step::Open(Accent::Normal));
        assert_eq!(Step::from_code(Lane::HiHat, 8), Step::Open(Accent::Strong));
    }

    #[test]
    fn plain_lanes_never_decode_open() {
        assert_eq!(Step::from_code(Lane::BassDrum, 3), Step::Hit(Accent::Strong));
        assert_eq!(Step::from_code(Lane::TotalAccent, 1), Step::Hit(Accent::Normal));
    }
}
