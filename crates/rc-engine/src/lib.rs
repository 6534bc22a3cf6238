//! Sequencer engine for the rhythm composer.
//!
//! The [`Sequencer`] schedules steps ahead of the audio clock; the
//! [`MixBus`] renders the resulting voice events into frames.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod dispatch;
mod event_queue;
pub mod factory;
mod filter;
mod frame;
mod frequency;
mod mix_bus;
mod observer;
pub mod scheduler;
mod sequencer;
mod variants;
mod voice;
mod voice_pool;

pub use dispatch::{Hit, NoteSpec};
pub use event_queue::{BusEvent, BusPayload, BusSink, EventQueue, EVENT_CAPACITY};
pub use factory::load_factory_bank;
pub use filter::{FilterKind, FilterSpec, OnePole};
pub use frame::Frame;
pub use frequency::{rate_to_increment, semitones_to_rate};
pub use mix_bus::MixBus;
pub use observer::{Direction, Fact, ListenerKey, Notification, Observers, Transport};
pub use sequencer::{ActivePattern, DisplayState, Lookahead, Sequencer};
pub use variants::VariantTable;
pub use voice::Voice;
pub use voice_pool::{VoiceId, VoicePool, DEFAULT_MAX_VOICES};
