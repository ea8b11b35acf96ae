//! Duplicate suppression over a bounded recency window.
//!
//! Senders repeat every state report several times because the link does not
//! acknowledge anything.  The daemon must act on each transmission once, so it
//! remembers the message ids it has already accepted in a small ring buffer.
//!
//! The window is deliberately tiny: senders are few and local, so 32 recent
//! ids cover every retransmission burst.  Once an id has been pushed out by 32
//! newer ones it is forgotten, and seeing it again counts as a new
//! transmission.  That is what lets 24-bit ids wrap around safely.
//!
//! # Complexity
//!
//! `accept` scans at most 32 slots and records in O(1) by writing at the ring
//! cursor and advancing it modulo the capacity.

use crate::protocol::packet::MessageId;

/// Number of accepted message ids remembered at once.
pub const DEDUP_CAPACITY: usize = 32;

/// Fixed-capacity ring of recently accepted message ids.
///
/// Only *accepted* ids are recorded; rejected duplicates never move the
/// cursor.  Slots start empty, so a fresh window accepts every id, including 0.
#[derive(Debug, Clone)]
pub struct DedupWindow {
    slots: [Option<MessageId>; DEDUP_CAPACITY],
    cursor: usize,
}

impl DedupWindow {
    /// Creates an empty window.
    pub fn new() -> Self {
        Self {
            slots: [None; DEDUP_CAPACITY],
            cursor: 0,
        }
    }

    /// Returns `true` and records `id` if it is absent from the window;
    /// returns `false` otherwise.
    ///
    /// When the window is full the oldest accepted id is overwritten.
    pub fn accept(&mut self, id: MessageId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.slots[self.cursor] = Some(id);
        self.cursor = (self.cursor + 1) % DEDUP_CAPACITY;
        true
    }

    /// Returns `true` if `id` is currently remembered.
    pub fn contains(&self, id: MessageId) -> bool {
        self.slots.contains(&Some(id))
    }

    /// Number of ids currently remembered (at most [`DEDUP_CAPACITY`]).
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` if nothing has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        DEDUP_CAPACITY
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
