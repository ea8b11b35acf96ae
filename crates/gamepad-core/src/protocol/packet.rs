//! The logical gamepad packet shared by both wire variants.
//!
//! Radio and broadcast frames look nothing alike on the wire, but once decoded
//! both reduce to the same three fields: who sent it, which transmission it
//! is, and which buttons are held.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Every frame variant is exactly this many bytes long.
pub const FRAME_SIZE: usize = 32;

/// Largest value representable in a 24-bit wire field.
pub const U24_MAX: u32 = 0x00FF_FFFF;

// ── Identifiers ───────────────────────────────────────────────────────────────

/// 24-bit identifier of a remote transmitting device.
///
/// Values wider than 24 bits are truncated on construction, matching what
/// fits in the wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SenderId(u32);

impl SenderId {
    /// Creates a sender id, keeping only the low 24 bits of `raw`.
    pub const fn new(raw: u32) -> Self {
        Self(raw & U24_MAX)
    }

    /// Returns the raw 24-bit value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

/// 24-bit identifier of a single transmission.
///
/// Senders retransmit the same state several times under one message id;
/// the id wraps modulo 2^24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u32);

impl MessageId {
    /// Creates a message id, keeping only the low 24 bits of `raw`.
    pub const fn new(raw: u32) -> Self {
        Self(raw & U24_MAX)
    }

    /// Returns the raw 24-bit value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the id that follows this one, wrapping after `0xFFFFFF`.
    pub const fn wrapping_next(self) -> Self {
        Self::new(self.0.wrapping_add(1))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 16-bit button bitmask, one bit per logical button.
///
/// Only bits 0–7 carry buttons; bits 8–15 are reserved and ignored by the
/// translator but preserved here so diagnostics show exactly what arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonMask(pub u16);

impl ButtonMask {
    /// A mask with no buttons held.
    pub const NONE: ButtonMask = ButtonMask(0);

    /// Returns `true` if bit `index` is set.
    pub const fn bit(self, index: u8) -> bool {
        index < 16 && self.0 & (1 << index) != 0
    }
}

impl fmt::Display for ButtonMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

// ── Packet ────────────────────────────────────────────────────────────────────

/// One decoded gamepad state report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Remote origin of the report.
    pub sender: SenderId,
    /// Transmission instance; the duplicate-suppression key.
    pub message_id: MessageId,
    /// Buttons held at the time of transmission.
    pub buttons: ButtonMask,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
