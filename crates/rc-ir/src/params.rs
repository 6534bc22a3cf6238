//! Voice parameter table.
//!
//! Every control is stored as a raw knob position in `0.0..=1.0` and mapped
//! linearly onto its value range on read.

use crate::instrument::Instrument;

/// A named continuous control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamId {
    BdTune,
    BdLevel,
    BdDecay,
    SdTune,
    SdLevel,
    SdTone,
    SdSnappy,
    LtTune,
    LtLevel,
    LtDecay,
    MtTune,
    MtLevel,
    MtDecay,
    HtTune,
    HtLevel,
    HtDecay,
    RsLevel,
    CpLevel,
    HhLevel,
    ChDecay,
    OhDecay,
    CrashLevel,
    CrashTune,
    RideLevel,
    RideTune,
    /// Depth of the Total Accent track
    AccentLevel,
    Tempo,
    MasterVolume,
}

/// Number of entries in the parameter table.
pub const NUM_PARAMS: usize = 28;

/// Tempo range in beats per minute.
pub const TEMPO_MIN: f32 = 37.0;
pub const TEMPO_MAX: f32 = 290.0;

/// Range and factory default of one control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    /// Factory default, in value units
    pub default: f32,
}

impl ParamSpec {
    const fn unit(name: &'static str, default: f32) -> Self {
        Self { name, min: 0.0, max: 1.0, default }
    }

    /// Map a raw position onto the value range.
    pub fn value_of(&self, raw: f32) -> f32 {
        self.min + raw * (self.max - self.min)
    }

    /// Inverse of [`ParamSpec::value_of`].
    pub fn raw_of(&self, value: f32) -> f32 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl ParamId {
    pub const ALL: [ParamId; NUM_PARAMS] = [
        ParamId::BdTune,
        ParamId::BdLevel,
        ParamId::BdDecay,
        ParamId::SdTune,
        ParamId::SdLevel,
        ParamId::SdTone,
        ParamId::SdSnappy,
        ParamId::LtTune,
        ParamId::LtLevel,
        ParamId::LtDecay,
        ParamId::MtTune,
        ParamId::MtLevel,
        ParamId::MtDecay,
        ParamId::HtTune,
        ParamId::HtLevel,
        ParamId::HtDecay,
        ParamId::RsLevel,
        ParamId::CpLevel,
        ParamId::HhLevel,
        ParamId::ChDecay,
        ParamId::OhDecay,
        ParamId::CrashLevel,
        ParamId::CrashTune,
        ParamId::RideLevel,
        ParamId::RideTune,
        ParamId::AccentLevel,
        ParamId::Tempo,
        ParamId::MasterVolume,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn spec(self) -> ParamSpec {
        match self {
            ParamId::BdTune => ParamSpec::unit("bd_tune", 0.5),
            ParamId::BdLevel => ParamSpec::unit("bd_level", 0.8),
            ParamId::BdDecay => ParamSpec::unit("bd_decay", 0.5),
            ParamId::SdTune => ParamSpec::unit("sd_tune", 0.5),
            ParamId::SdLevel => ParamSpec::unit("sd_level", 0.8),
            ParamId::SdTone => ParamSpec::unit("sd_tone", 0.5),
            ParamId::SdSnappy => ParamSpec::unit("sd_snappy", 0.5),
            ParamId::LtTune => ParamSpec::unit("lt_tune", 0.5),
            ParamId::LtLevel => ParamSpec::unit("lt_level", 0.8),
            ParamId::LtDecay => ParamSpec::unit("lt_decay", 0.5),
            ParamId::MtTune => ParamSpec::unit("mt_tune", 0.5),
            ParamId::MtLevel => ParamSpec::unit("mt_level", 0.8),
            ParamId::MtDecay => ParamSpec::unit("mt_decay", 0.5),
            ParamId::HtTune => ParamSpec::unit("ht_tune", 0.5),
            ParamId::HtLevel => ParamSpec::unit("ht_level", 0.8),
            ParamId::HtDecay => ParamSpec::unit("ht_decay", 0.5),
            ParamId::RsLevel => ParamSpec::unit("rs_level", 0.8),
            ParamId::CpLevel => ParamSpec::unit("cp_level", 0.8),
            ParamId::HhLevel => ParamSpec::unit("hh_level", 0.8),
            ParamId::ChDecay => ParamSpec::unit("ch_decay", 0.5),
            ParamId::OhDecay => ParamSpec::unit("oh_decay", 0.5),
            ParamId::CrashLevel => ParamSpec::unit("crash_level", 0.8),
            ParamId::CrashTune => ParamSpec::unit("crash_tune", 0.5),
            ParamId::RideLevel => ParamSpec::unit("ride_level", 0.8),
            ParamId::RideTune => ParamSpec::unit("ride_tune", 0.5),
            ParamId::AccentLevel => ParamSpec::unit("accent_level", 0.5),
            ParamId::Tempo => ParamSpec { name: "tempo", min: TEMPO_MIN, max: TEMPO_MAX, default: 120.0 },
            ParamId::MasterVolume => ParamSpec::unit("master_volume", 0.8),
        }
    }

    pub const fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look a control up by its serialized name.
    pub fn from_name(name: &str) -> Option<ParamId> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Level control of a voice (hats share one).
    pub const fn level_for(instrument: Instrument) -> Option<ParamId> {
        match instrument {
            Instrument::BassDrum => Some(ParamId::BdLevel),
            Instrument::SnareDrum => Some(ParamId::SdLevel),
            Instrument::LowTom => Some(ParamId::LtLevel),
            Instrument::MidTom => Some(ParamId::MtLevel),
            Instrument::HighTom => Some(ParamId::HtLevel),
            Instrument::RimShot => Some(ParamId::RsLevel),
            Instrument::HandClap => Some(ParamId::CpLevel),
            Instrument::ClosedHat | Instrument::OpenHat => Some(ParamId::HhLevel),
            Instrument::Crash => Some(ParamId::CrashLevel),
            Instrument::Ride => Some(ParamId::RideLevel),
            Instrument::TotalAccent => None,
        }
    }
}

/// Raw knob positions for every control.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamTable {
    raw: [f32; NUM_PARAMS],
}

impl Default for ParamTable {
    fn default() -> Self {
        Self::factory()
    }
}

impl ParamTable {
    /// Factory defaults.
    pub fn factory() -> Self {
        let mut raw = [0.0; NUM_PARAMS];
        for id in ParamId::ALL {
            let spec = id.spec();
            raw[id.index()] = spec.raw_of(spec.default);
        }
        Self { raw }
    }

    /// Raw knob position (0..=1).
    pub fn raw(&self, id: ParamId) -> f32 {
        self.raw[id.index()]
    }

    /// Value in the control's own units.
    pub fn value(&self, id: ParamId) -> f32 {
        id.spec().value_of(self.raw[id.index()])
    }

    /// Store a raw position, clamped into 0..=1. Non-finite input is ignored.
    /// Returns the stored position.
    pub fn set_raw(&mut self, id: ParamId, raw: f32) -> f32 {
        if raw.is_finite() {
            self.raw[id.index()] = raw.clamp(0.0, 1.0);
        }
        self.raw[id.index()]
    }

    /// Store a value in the control's units.
    pub fn set_value(&mut self, id: ParamId, value: f32) -> f32 {
        let raw = id.spec().raw_of(value);
        self.set_raw(id, raw)
    }

    pub fn tempo(&self) -> f32 {
        self.value(ParamId::Tempo)
    }

    pub fn master(&self) -> f32 {
        self.value(ParamId::MasterVolume)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParamId, f32)> + '_ {
        ParamId::ALL.into_iter().map(|id| (id, self.raw[id.index()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, id) in ParamId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(ParamId::from_name(id.name()), Some(*id));
        }
        assert_eq!(ParamId::from_name("cowbell"), None);
    }

    #[test]
    fn factory_tempo_is_120() {
        let table = ParamTable::factory();
        assert!((table.tempo() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn tempo_maps_linearly() {
        let mut table = ParamTable::factory();
        table.set_raw(ParamId::Tempo, 0.0);
        assert_eq!(table.tempo(), TEMPO_MIN);
        table.set_raw(ParamId::Tempo, 1.0);
        assert_eq!(table.tempo(), TEMPO_MAX);
        table.set_value(ParamId::Tempo, 1000.0);
        assert_eq!(table.tempo(), TEMPO_MAX);
    }

    #[test]
    fn raw_is_clamped_and_nan_ignored() {
        let mut table = ParamTable::factory();
        assert_eq!(table.set_raw(ParamId::BdLevel, 3.0), 1.0);
        assert_eq!(table.set_raw(ParamId::BdLevel, f32::NAN), 1.0);
        assert_eq!(table.set_raw(ParamId::BdLevel, -1.0), 0.0);
    }

    #[test]
    fn hats_share_a_level() {
        assert_eq!(ParamId::level_for(Instrument::ClosedHat), ParamId::level_for(Instrument::OpenHat));
        assert_eq!(ParamId::level_for(Instrument::TotalAccent), None);
    }
}
