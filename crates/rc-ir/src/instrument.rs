//! Step lanes and percussion instruments.
//!
//! A pattern stores eleven step lanes. Ten of them drive a percussion
//! voice; the eleventh is the pattern-wide Total Accent track. The hi-hat
//! lane is shared by two voices (closed and open), so the set of
//! *instruments* addressed by edit and synthesis operations is slightly
//! larger than the set of lanes.

/// Number of step lanes stored per pattern.
pub const NUM_LANES: usize = 11;

/// Number of synthesised percussion voices.
pub const NUM_VOICES: usize = 11;

/// A step lane of a pattern record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lane {
    BassDrum,
    SnareDrum,
    LowTom,
    MidTom,
    HighTom,
    RimShot,
    HandClap,
    /// Shared by the closed and open hi-hat voices
    HiHat,
    Crash,
    Ride,
    /// Pattern-wide accent track (drives no voice)
    TotalAccent,
}

impl Lane {
    /// All lanes in storage order.
    pub const ALL: [Lane; NUM_LANES] = [
        Lane::BassDrum,
        Lane::SnareDrum,
        Lane::LowTom,
        Lane::MidTom,
        Lane::HighTom,
        Lane::RimShot,
        Lane::HandClap,
        Lane::HiHat,
        Lane::Crash,
        Lane::Ride,
        Lane::TotalAccent,
    ];

    /// Storage index (0..11).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lane at a storage index.
    pub fn from_index(index: usize) -> Option<Lane> {
        Self::ALL.get(index).copied()
    }

    /// Bit used by the mute and solo masks.
    pub const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// Two-letter panel label.
    pub const fn label(self) -> &'static str {
        match self {
            Lane::BassDrum => "BD",
            Lane::SnareDrum => "SD",
            Lane::LowTom => "LT",
            Lane::MidTom => "MT",
            Lane::HighTom => "HT",
            Lane::RimShot => "RS",
            Lane::HandClap => "CP",
            Lane::HiHat => "HH",
            Lane::Crash => "CC",
            Lane::Ride => "RC",
            Lane::TotalAccent => "AC",
        }
    }
}

/// An instrument addressed by edits and by voice dispatch.
///
/// `ClosedHat` and `OpenHat` both live on [`Lane::HiHat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Instrument {
    BassDrum,
    SnareDrum,
    LowTom,
    MidTom,
    HighTom,
    RimShot,
    HandClap,
    ClosedHat,
    OpenHat,
    Crash,
    Ride,
    TotalAccent,
}

impl Instrument {
    /// The eleven instruments that produce sound, in voice-index order.
    pub const VOICES: [Instrument; NUM_VOICES] = [
        Instrument::BassDrum,
        Instrument::SnareDrum,
        Instrument::LowTom,
        Instrument::MidTom,
        Instrument::HighTom,
        Instrument::RimShot,
        Instrument::HandClap,
        Instrument::ClosedHat,
        Instrument::OpenHat,
        Instrument::Crash,
        Instrument::Ride,
    ];

    /// The lane this instrument's steps are stored on.
    pub const fn lane(self) -> Lane {
        match self {
            Instrument::BassDrum => Lane::BassDrum,
            Instrument::SnareDrum => Lane::SnareDrum,
            Instrument::LowTom => Lane::LowTom,
            Instrument::MidTom => Lane::MidTom,
            Instrument::HighTom => Lane::HighTom,
            Instrument::RimShot => Lane::RimShot,
            Instrument::HandClap => Lane::HandClap,
            Instrument::ClosedHat | Instrument::OpenHat => Lane::HiHat,
            Instrument::Crash => Lane::Crash,
            Instrument::Ride => Lane::Ride,
            Instrument::TotalAccent => Lane::TotalAccent,
        }
    }

    /// Voice index (0..11), or `None` for the accent track.
    pub fn voice_index(self) -> Option<usize> {
        Self::VOICES.iter().position(|&v| v == self)
    }

    /// Instrument at a voice index.
    pub fn from_voice_index(index: usize) -> Option<Instrument> {
        Self::VOICES.get(index).copied()
    }

    /// Bit this instrument occupies in its lane's flam field.
    ///
    /// The hi-hat lane flags closed and open separately (1 and 2), so its
    /// field ranges over 0..=3; every other lane uses bit 1.
    pub const fn flam_bit(self) -> u8 {
        match self {
            Instrument::OpenHat => 0b10,
            _ => 0b01,
        }
    }

    /// Lower-case file stem used for sample-variant assets.
    pub const fn stem(self) -> &'static str {
        match self {
            Instrument::BassDrum => "bd",
            Instrument::SnareDrum => "sd",
            Instrument::LowTom => "lt",
            Instrument::MidTom => "mt",
            Instrument::HighTom => "ht",
            Instrument::RimShot => "rs",
            Instrument::HandClap => "cp",
            Instrument::ClosedHat => "ch",
            Instrument::OpenHat => "oh",
            Instrument::Crash => "cc",
            Instrument::Ride => "rc",
            Instrument::TotalAccent => "ac",
        }
    }
}
