//! Pattern addressing: (bank, track, group, number) → memory index.

/// Number of pattern records in memory.
pub const MEMORY_SIZE: usize = 384;

/// Patterns per group.
pub const PATTERNS_PER_GROUP: usize = 16;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Bank {
    #[default]
    B1,
    B2,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Track {
    #[default]
    T1,
    T2,
    T3,
    T4,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PatternGroup {
    #[default]
    PG1,
    PG2,
    PG3,
}

impl Bank {
    pub const ALL: [Bank; 2] = [Bank::B1, Bank::B2];

    const fn offset(self) -> usize {
        self as usize * 192
    }
}

impl Track {
    pub const ALL: [Track; 4] = [Track::T1, Track::T2, Track::T3, Track::T4];

    const fn offset(self) -> usize {
        self as usize * 48
    }
}

impl PatternGroup {
    pub const ALL: [PatternGroup; 3] = [PatternGroup::PG1, PatternGroup::PG2, PatternGroup::PG3];

    const fn offset(self) -> usize {
        self as usize * 16
    }
}

/// Pattern number within a group (0..16).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternNumber(u8);

impl PatternNumber {
    /// Returns `None` for numbers outside 0..16.
    pub const fn new(number: u8) -> Option<Self> {
        if (number as usize) < PATTERNS_PER_GROUP {
            Some(Self(number))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Address of one pattern record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PatternAddress {
    pub bank: Bank,
    pub track: Track,
    pub group: PatternGroup,
    pub number: PatternNumber,
}

impl PatternAddress {
    pub const fn new(bank: Bank, track: Track, group: PatternGroup, number: PatternNumber) -> Self {
        Self { bank, track, group, number }
    }

    /// Flat memory index in 0..384.
    pub const fn index(self) -> usize {
        self.bank.offset() + self.track.offset() + self.group.offset() + self.number.0 as usize
    }

    /// Inverse of [`PatternAddress::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= MEMORY_SIZE {
            return None;
        }
        let bank = Bank::ALL[index / 192];
        let rest = index % 192;
        let track = Track::ALL[rest / 48];
        let rest = rest % 48;
        let group = PatternGroup::ALL[rest / 16];
        let number = PatternNumber((rest % 16) as u8);
        Some(Self { bank, track, group, number })
    }
}
