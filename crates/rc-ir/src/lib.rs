//! Core data types for the rhythm composer.
//!
//! Pattern memory and its addressing, the playback queue, the voice
//! parameter table and the snapshot format used to persist them. The
//! sequencer engine consumes these types; nothing here touches audio I/O.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod address;
mod instrument;
mod memory;
mod mute;
mod params;
mod pattern;
mod queue;
mod sample;
pub mod snapshot;
mod step;
pub mod timing;

pub use address::{Bank, PatternAddress, PatternGroup, PatternNumber, Track, MEMORY_SIZE, PATTERNS_PER_GROUP};
pub use instrument::{Instrument, Lane, NUM_LANES, NUM_VOICES};
pub use memory::PatternMemory;
pub use mute::MuteSolo;
pub use params::{ParamId, ParamSpec, ParamTable, NUM_PARAMS, TEMPO_MAX, TEMPO_MIN};
pub use pattern::{PatternRecord, Scale, FLAM_MAX, FLAM_MIN, SHUFFLE_LIMIT, STEPS};
pub use queue::{PlaybackQueue, QUEUE_CAPACITY};
pub use sample::{Sample, SampleData, SampleKey};
pub use snapshot::{PatternData, Restored, Snapshot, SnapshotError};
pub use step::{Accent, Step};
