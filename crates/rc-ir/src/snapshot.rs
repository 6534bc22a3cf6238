//! Serializable pattern-memory snapshot.
//!
//! Sparse: only records holding steps or a non-default window are stored,
//! keyed by memory index. Steps use the legacy integer codes so that
//! stored banks stay readable by older tooling.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::address::PatternAddress;
use crate::instrument::{Lane, NUM_LANES};
use crate::memory::PatternMemory;
use crate::params::{ParamId, ParamTable};
use crate::pattern::{PatternRecord, Scale, STEPS};
use crate::queue::{PlaybackQueue, QUEUE_CAPACITY};
use crate::step::Step;

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Stored form of one pattern record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternData {
    /// Eleven lanes of sixteen step codes
    pub steps: Vec<Vec<u8>>,
    pub scale: u8,
    pub base: u8,
    pub first: u8,
    pub shuffle: f32,
    pub flam: f32,
    pub flam_lanes: Vec<u8>,
    pub invert: bool,
}

/// Whole-preset snapshot: pattern memory, queue and parameter table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub patterns: BTreeMap<u16, PatternData>,
    /// Queue entries as memory indices
    pub queue: Vec<u16>,
    /// Raw knob positions by parameter name
    pub params: BTreeMap<String, f32>,
    #[serde(default)]
    pub cycle: bool,
}

/// Live state rebuilt from a validated snapshot.
#[derive(Clone, Debug)]
pub struct Restored {
    pub memory: PatternMemory,
    pub queue: PlaybackQueue,
    pub params: ParamTable,
    pub cycle: bool,
}

/// Structural problems found while restoring a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotError {
    UnsupportedVersion(u32),
    PatternIndex(u16),
    LaneCount { index: u16, found: usize },
    StepCount { index: u16, lane: usize, found: usize },
    FlamLaneCount { index: u16, found: usize },
    ScaleCode { index: u16, code: u8 },
    Window { index: u16, first: u8, base: u8 },
    NonFinite { field: String },
    QueueLength(usize),
    QueueIndex(u16),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::UnsupportedVersion(v) => write!(f, "unsupported snapshot version {}", v),
            SnapshotError::PatternIndex(i) => write!(f, "pattern index {} out of range", i),
            SnapshotError::LaneCount { index, found } => {
                write!(f, "pattern {}: expected {} lanes, found {}", index, NUM_LANES, found)
            }
            SnapshotError::StepCount { index, lane, found } => {
                write!(f, "pattern {} lane {}: expected {} steps, found {}", index, lane, STEPS, found)
            }
            SnapshotError::FlamLaneCount { index, found } => {
                write!(f, "pattern {}: expected {} flam entries, found {}", index, NUM_LANES, found)
            }
            SnapshotError::ScaleCode { index, code } => write!(f, "pattern {}: bad scale code {}", index, code),
            SnapshotError::Window { index, first, base } => {
                write!(f, "pattern {}: bad window first={} base={}", index, first, base)
            }
            SnapshotError::NonFinite { field } => write!(f, "non-finite value in {}", field),
            SnapshotError::QueueLength(n) => write!(f, "queue length {} outside 1..={}", n, QUEUE_CAPACITY),
            SnapshotError::QueueIndex(i) => write!(f, "queue entry {} out of range", i),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SnapshotError {}

impl PatternData {
    pub fn from_record(record: &PatternRecord) -> Self {
        Self {
            steps: Lane::ALL
                .iter()
                .map(|&lane| record.lane(lane).iter().map(|s| s.code()).collect())
                .collect(),
            scale: record.scale().code(),
            base: record.last_step(),
            first: record.first_step(),
            shuffle: record.shuffle(),
            flam: record.flam(),
            flam_lanes: Lane::ALL.iter().map(|&lane| record.flam_field(lane)).collect(),
            invert: record.invert(),
        }
    }

    /// Validate field shapes and build the record.
    pub fn to_record(&self, index: u16) -> Result<PatternRecord, SnapshotError> {
        if self.steps.len() != NUM_LANES {
            return Err(SnapshotError::LaneCount { index, found: self.steps.len() });
        }
        if let Some((lane, codes)) = self.steps.iter().enumerate().find(|(_, c)| c.len() != STEPS) {
            return Err(SnapshotError::StepCount { index, lane, found: codes.len() });
        }
        if self.flam_lanes.len() != NUM_LANES {
            return Err(SnapshotError::FlamLaneCount { index, found: self.flam_lanes.len() });
        }
        let scale = Scale::from_code(self.scale).ok_or(SnapshotError::ScaleCode { index, code: self.scale })?;
        if self.base == 0 || self.base as usize > STEPS || self.first >= self.base {
            return Err(SnapshotError::Window { index, first: self.first, base: self.base });
        }
        if !self.shuffle.is_finite() || !self.flam.is_finite() {
            return Err(SnapshotError::NonFinite { field: alloc::format!("pattern {}", index) });
        }

        let mut record = PatternRecord::new();
        for (lane, codes) in Lane::ALL.iter().zip(&self.steps) {
            for (i, &code) in codes.iter().enumerate() {
                record.set_lane_step(*lane, i, Step::from_code(*lane, code));
            }
        }
        for (lane, &field) in Lane::ALL.iter().zip(&self.flam_lanes) {
            record.set_flam_field(*lane, field);
        }
        record.set_scale(scale);
        record.set_last_step(self.base);
        record.set_first_step(self.first);
        record.set_shuffle(self.shuffle);
        record.set_flam(self.flam);
        record.set_invert(self.invert);
        Ok(record)
    }
}

impl Snapshot {
    /// Capture live state.
    pub fn capture(memory: &PatternMemory, queue: &PlaybackQueue, params: &ParamTable, cycle: bool) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            patterns: memory
                .populated()
                .map(|(i, record)| (i as u16, PatternData::from_record(record)))
                .collect(),
            queue: queue.entries().iter().map(|a| a.index() as u16).collect(),
            params: params.iter().map(|(id, raw)| (id.name().to_string(), raw)).collect(),
            cycle,
        }
    }

    /// Validate and rebuild live state. Nothing is returned unless the
    /// whole snapshot checks out.
    ///
    /// Unknown parameter names are skipped; missing ones keep factory values.
    pub fn restore(&self) -> Result<Restored, SnapshotError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }

        let mut memory = PatternMemory::new();
        for (&index, data) in &self.patterns {
            let address = PatternAddress::from_index(index as usize).ok_or(SnapshotError::PatternIndex(index))?;
            let record = data.to_record(index)?;
            memory.paste_record(address, &record);
        }

        if self.queue.is_empty() || self.queue.len() > QUEUE_CAPACITY {
            return Err(SnapshotError::QueueLength(self.queue.len()));
        }
        let entries = self
            .queue
            .iter()
            .map(|&i| PatternAddress::from_index(i as usize).ok_or(SnapshotError::QueueIndex(i)))
            .collect::<Result<Vec<_>, _>>()?;
        let queue = PlaybackQueue::from_entries(&entries).ok_or(SnapshotError::QueueLength(entries.len()))?;

        let mut params = ParamTable::factory();
        for (name, &raw) in &self.params {
            if !raw.is_finite() {
                return Err(SnapshotError::NonFinite { field: name.clone() });
            }
            if let Some(id) = ParamId::from_name(name) {
                params.set_raw(id, raw);
            }
        }

        Ok(Restored { memory, queue, params, cycle: self.cycle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::Instrument;
    use crate::step::Accent;

    fn sample_memory() -> PatternMemory {
        let mut mem = PatternMemory::new();
        let a = PatternAddress::from_index(17).unwrap();
        mem.write(a, |p| {
            p.set_step(Instrument::BassDrum, 0, Some(Accent::Strong));
            p.set_step(Instrument::OpenHat, 2, Some(Accent::Normal));
            p.set_scale(Scale::Triplet);
            p.set_last_step(12);
            p.set_first_step(2);
            p.set_shuffle(0.125);
            p.set_flam(0.1);
            p.set_flam_enabled(Instrument::OpenHat, true);
            p.set_invert(true);
        });
        mem
    }

    #[test]
    fn capture_is_sparse() {
        let mem = sample_memory();
        let queue = PlaybackQueue::new(PatternAddress::default());
        let snap = Snapshot::capture(&mem, &queue, &ParamTable::factory(), false);
        assert_eq!(snap.patterns.keys().copied().collect::<Vec<_>>(), alloc::vec![17]);
        assert_eq!(snap.patterns[&17].steps[Lane::HiHat.index()][2], 3);
    }

    #[test]
    fn restore_reproduces_records() {
        let mem = sample_memory();
        let queue = PlaybackQueue::from_entries(&[
            PatternAddress::from_index(17).unwrap(),
            PatternAddress::from_index(3).unwrap(),
        ])
        .unwrap();
        let mut params = ParamTable::factory();
        params.set_raw(ParamId::SdTone, 0.25);

        let restored = Snapshot::capture(&mem, &queue, &params, true).restore().unwrap();
        assert_eq!(restored.memory, mem);
        assert_eq!(restored.queue.entries(), queue.entries());
        assert_eq!(restored.params, params);
        assert!(restored.cycle);
    }

    #[test]
    fn short_lane_is_rejected() {
        let mut snap = Snapshot::capture(
            &sample_memory(),
            &PlaybackQueue::new(PatternAddress::default()),
            &ParamTable::factory(),
            false,
        );
        snap.patterns.get_mut(&17).unwrap().steps[4].pop();
        assert_eq!(
            snap.restore().unwrap_err(),
            SnapshotError::StepCount { index: 17, lane: 4, found: 15 }
        );
    }

    #[test]
    fn bad_queue_and_window_are_rejected() {
        let mut snap = Snapshot::capture(
            &sample_memory(),
            &PlaybackQueue::new(PatternAddress::default()),
            &ParamTable::factory(),
            false,
        );
        snap.queue.clear();
        assert_eq!(snap.restore().unwrap_err(), SnapshotError::QueueLength(0));

        snap.queue.push(400);
        assert_eq!(snap.restore().unwrap_err(), SnapshotError::QueueIndex(400));

        snap.queue[0] = 0;
        snap.patterns.get_mut(&17).unwrap().first = 12;
        assert!(matches!(snap.restore().unwrap_err(), SnapshotError::Window { .. }));
    }

    #[test]
    fn unknown_params_are_ignored() {
        let mut snap = Snapshot::capture(
            &PatternMemory::new(),
            &PlaybackQueue::new(PatternAddress::default()),
            &ParamTable::factory(),
            false,
        );
        snap.params.insert("cowbell".to_string(), 0.3);
        snap.params.remove("tempo");
        let restored = snap.restore().unwrap();
        assert_eq!(restored.params, ParamTable::factory());
    }
}
