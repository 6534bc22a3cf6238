//! Observer registry for the control surface.
//!
//! A listener subscribes to one [`Fact`] and is called with every
//! [`Notification`] of that kind. The core never knows who is listening.

use alloc::boxed::Box;
use alloc::string::String;

use rc_ir::{Instrument, ParamId, PatternAddress, Step};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle returned by [`Observers::subscribe`].
    pub struct ListenerKey;
}

/// Playback direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Transport state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Stopped,
    Running(Direction),
}

impl Transport {
    pub fn is_running(self) -> bool {
        matches!(self, Transport::Running(_))
    }
}

/// Kinds of observable change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fact {
    StepChanged,
    BeatPosition,
    QueueLength,
    ParamChanged,
    Transport,
    CurrentPattern,
    Notice,
}

/// A change the control surface may want to redraw.
#[derive(Clone, Debug, PartialEq)]
pub enum Notification {
    StepChanged { address: PatternAddress, instrument: Instrument, index: usize, step: Step },
    /// Step just scheduled; `None` once playback stops
    BeatPosition(Option<u8>),
    QueueLength { len: usize, cursor: usize },
    ParamChanged { id: ParamId, raw: f32, value: f32 },
    Transport(Transport),
    CurrentPattern(PatternAddress),
    /// Human-readable message, e.g. a rejected preset load
    Notice(String),
}

impl Notification {
    pub fn fact(&self) -> Fact {
        match self {
            Notification::StepChanged { .. } => Fact::StepChanged,
            Notification::BeatPosition(_) => Fact::BeatPosition,
            Notification::QueueLength { .. } => Fact::QueueLength,
            Notification::ParamChanged { .. } => Fact::ParamChanged,
            Notification::Transport(_) => Fact::Transport,
            Notification::CurrentPattern(_) => Fact::CurrentPattern,
            Notification::Notice(_) => Fact::Notice,
        }
    }
}

type Callback = Box<dyn FnMut(&Notification) + Send>;

struct Listener {
    fact: Fact,
    callback: Callback,
}

/// Registered listeners, keyed by subscription handle.
#[derive(Default)]
pub struct Observers {
    listeners: SlotMap<ListenerKey, Listener>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, fact: Fact, callback: impl FnMut(&Notification) + Send + 'static) -> ListenerKey {
        self.listeners.insert(Listener { fact, callback: Box::new(callback) })
    }

    /// Returns false if the key was already gone.
    pub fn unsubscribe(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns true if anyone listens for `fact`.
    pub fn wants(&self, fact: Fact) -> bool {
        self.listeners.values().any(|l| l.fact == fact)
    }

    pub fn notify(&mut self, notification: &Notification) {
        let fact = notification.fact();
        for listener in self.listeners.values_mut().filter(|l| l.fact == fact) {
            (listener.callback)(notification);
        }
    }
}

impl core::fmt::Debug for Observers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers").field("listeners", &self.listeners.len()).finish()
    }
}
