//! Playback queue: the ordered list of pattern addresses to play.

use arrayvec::ArrayVec;

use crate::address::PatternAddress;

/// Maximum number of queued entries.
pub const QUEUE_CAPACITY: usize = 120;

/// Ordered play list with a cursor on the currently playing entry.
///
/// Never empty. Entries are address copies, so later edits to whatever
/// address the editor is pointing at never alias into the queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaybackQueue {
    entries: ArrayVec<PatternAddress, QUEUE_CAPACITY>,
    cursor: usize,
    /// Pins the cursor so the current entry can be revised in place
    edit_lock: bool,
}

impl PlaybackQueue {
    /// A queue holding a single entry.
    pub fn new(first: PatternAddress) -> Self {
        let mut entries = ArrayVec::new();
        entries.push(first);
        Self { entries, cursor: 0, edit_lock: false }
    }

    /// Replace the whole queue (preset load). Returns `None` if `entries`
    /// is empty or longer than [`QUEUE_CAPACITY`].
    pub fn from_entries(entries: &[PatternAddress]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let entries = ArrayVec::try_from(entries).ok()?;
        Some(Self { entries, cursor: 0, edit_lock: false })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PatternAddress] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor; out-of-range positions are ignored.
    pub fn set_cursor(&mut self, cursor: usize) {
        if cursor < self.entries.len() {
            self.cursor = cursor;
        }
    }

    /// Reset the cursor to the head if its entry has gone away.
    pub fn resolve_cursor(&mut self) -> usize {
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
        }
        self.cursor
    }

    /// The entry under the cursor (the head if the cursor is stale).
    pub fn current(&self) -> PatternAddress {
        self.entries.get(self.cursor).copied().unwrap_or(self.entries[0])
    }

    /// Returns true if the cursor is on the final entry.
    pub fn at_last(&self) -> bool {
        self.cursor + 1 >= self.entries.len()
    }

    pub fn edit_locked(&self) -> bool {
        self.edit_lock
    }

    pub fn set_edit_lock(&mut self, locked: bool) {
        self.edit_lock = locked;
    }

    /// Append an entry. Returns false (no-op) once the queue is full.
    pub fn append(&mut self, address: PatternAddress) -> bool {
        self.entries.try_push(address).is_ok()
    }

    /// Insert entries right after the cursor, shifting later ones back.
    /// Whatever would overflow the capacity is dropped from the tail.
    /// Returns how many of `addresses` were inserted.
    pub fn insert_after_cursor(&mut self, addresses: &[PatternAddress]) -> usize {
        let at = self.resolve_cursor() + 1;
        let room = QUEUE_CAPACITY - at;
        let inserted = addresses.len().min(room);
        let keep_tail = (self.entries.len() - at).min(room - inserted);
        self.entries.truncate(at + keep_tail);
        for (offset, addr) in addresses[..inserted].iter().enumerate() {
            self.entries.insert(at + offset, *addr);
        }
        inserted
    }

    /// Drop every entry after the cursor.
    pub fn truncate_from_cursor(&mut self) {
        let keep = self.resolve_cursor() + 1;
        self.entries.truncate(keep);
    }

    /// Remove the entry under the cursor. The last remaining entry can't be
    /// deleted. The cursor stays on the entry that slid into its place.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        let at = self.resolve_cursor();
        self.entries.remove(at);
        if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len() - 1;
        }
        true
    }

    /// Overwrite the entry under the cursor.
    pub fn replace_current(&mut self, address: PatternAddress) {
        let at = self.resolve_cursor();
        self.entries[at] = address;
    }

    /// Step to the next entry, wrapping to the head. A stale cursor resets
    /// to the head; an edit lock pins it.
    pub fn advance(&mut self) -> usize {
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
        } else if !self.edit_lock {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
        self.cursor
    }
}
