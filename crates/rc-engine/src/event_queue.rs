//! Timed events bound for the mix bus.

use crate::dispatch::NoteSpec;

/// Pending events the mix bus can hold.
pub const EVENT_CAPACITY: usize = 512;

/// What happens at an event's frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusPayload {
    /// Start a voice
    Note(NoteSpec),
    /// A new step begins: summed note gain for the step and master volume
    StepMix { gain_sum: f32, master: f32 },
}

/// An event stamped with the audio-clock frame it fires on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BusEvent {
    pub frame: u64,
    pub payload: BusPayload,
}

/// Receiver of scheduled events.
///
/// Events must arrive in nondecreasing frame order.
pub trait BusSink {
    /// Queue an event. Returns false if it was dropped.
    fn submit(&mut self, event: BusEvent) -> bool;
}

/// A sink that keeps everything, for inspecting scheduler output.
impl BusSink for alloc::vec::Vec<BusEvent> {
    fn submit(&mut self, event: BusEvent) -> bool {
        self.push(event);
        true
    }
}

/// Fixed-capacity queue of events sorted by frame.
///
/// Insertion keeps frame order (stable for equal frames) so a late-arriving
/// earlier event still fires first. Never allocates.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: heapless::Deque<BusEvent, EVENT_CAPACITY>,
    dropped: u32,
}

impl EventQueue {
    /// Create a new empty event queue.
    pub fn new() -> Self {
        Self { events: heapless::Deque::new(), dropped: 0 }
    }

    /// Push an event into the queue.
    pub fn push(&mut self, event: BusEvent) -> bool {
        let in_order = self.events.back().map_or(true, |last| last.frame <= event.frame);
        if in_order {
            if self.events.push_back(event).is_err() {
                self.dropped += 1;
                return false;
            }
            return true;
        }
        self.insert_sorted(event)
    }

    fn insert_sorted(&mut self, event: BusEvent) -> bool {
        if self.events.is_full() {
            self.dropped += 1;
            return false;
        }
        // Shift every later event back one slot, carrying the displaced one.
        let mut carry = event;
        for slot in self.events.iter_mut().skip_while(|e| e.frame <= event.frame) {
            core::mem::swap(slot, &mut carry);
        }
        let _ = self.events.push_back(carry);
        true
    }

    /// Pop the next event if it is due at or before `frame`.
    pub fn pop_due(&mut self, frame: u64) -> Option<BusEvent> {
        if self.events.front()?.frame <= frame {
            self.events.pop_front()
        } else {
            None
        }
    }

    /// Clear all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the number of events in the queue.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events refused because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl BusSink for EventQueue {
    fn submit(&mut self, event: BusEvent) -> bool {
        self.push(event)
    }
}
