//! 24-bit wrapping message-id sequence.
//!
//! The radio link carries no transmission identifier, so the radio transport
//! stamps each received frame with the next id from a [`MessageIdSequence`].
//! Consecutive ids never repeat within 2^24 frames, which keeps radio frames
//! clear of the 32-entry duplicate window.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::protocol::packet::{MessageId, U24_MAX};

/// A monotonically increasing counter that wraps modulo 2^24.
///
/// # Examples
///
/// ```rust
/// use gamepad_core::protocol::{MessageId, MessageIdSequence};
///
/// let seq = MessageIdSequence::new();
/// assert_eq!(seq.next(), MessageId::new(0));
/// assert_eq!(seq.next(), MessageId::new(1));
/// ```
pub struct MessageIdSequence {
    inner: AtomicU32,
}

impl MessageIdSequence {
    /// Creates a new sequence starting at 0.
    pub fn new() -> Self {
        Self::starting_at(MessageId::new(0))
    }

    /// Creates a sequence whose first id is `first`.
    pub fn starting_at(first: MessageId) -> Self {
        Self {
            inner: AtomicU32::new(first.get()),
        }
    }

    /// Returns the next id and advances the sequence.
    ///
    /// `Ordering::Relaxed` is enough: ids only need to be distinct, they do
    /// not publish any other memory.
    pub fn next(&self) -> MessageId {
        let raw = self
            .inner
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(if v >= U24_MAX { 0 } else { v + 1 })
            })
            // The closure always returns Some, so both arms carry the old value.
            .unwrap_or_else(|v| v);
        MessageId::new(raw)
    }

    /// Returns the id the next call to [`next`](Self::next) will produce.
    pub fn current(&self) -> MessageId {
        MessageId::new(self.inner.load(Ordering::Relaxed))
    }
}

impl Default for MessageIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
