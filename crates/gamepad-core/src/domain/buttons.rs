//! Bit-to-button table and the per-update event batch.
//!
//! A gamepad report is a bitmask; the OS wants discrete key events.  Every
//! update is turned into exactly nine events: one press or release for each of
//! the eight buttons, in bit order, followed by a sync marker.  The batch is
//! always complete and never a diff against the previous mask.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::packet::ButtonMask;

/// Logical buttons of an NES-style pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

/// Bit index → logical button.  Bits 8–15 have no entry and are ignored.
pub const BUTTON_MAP: [Button; 8] = [
    Button::A,
    Button::B,
    Button::Select,
    Button::Start,
    Button::Up,
    Button::Down,
    Button::Left,
    Button::Right,
];

impl Button {
    /// Returns the mask bit carrying this button.
    pub fn bit(self) -> u8 {
        // BUTTON_MAP has 8 entries, so the cast cannot truncate.
        BUTTON_MAP
            .iter()
            .position(|b| *b == self)
            .unwrap_or_default() as u8
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::A => "A",
            Button::B => "B",
            Button::Select => "Select",
            Button::Start => "Start",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Left => "Left",
            Button::Right => "Right",
        };
        f.write_str(name)
    }
}

/// One event of an update batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonEvent {
    Press(Button),
    Release(Button),
    /// Terminates the batch; consumers apply the preceding events together.
    Sync,
}

/// Number of events in every batch: eight button states plus the sync marker.
pub const BATCH_LEN: usize = BUTTON_MAP.len() + 1;

/// The complete, ordered set of events for one button mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBatch {
    mask: ButtonMask,
    events: [ButtonEvent; BATCH_LEN],
}

impl ButtonBatch {
    /// Builds the batch for `mask`.  Reserved bits 8–15 are ignored.
    pub fn from_mask(mask: ButtonMask) -> Self {
        let mut events = [ButtonEvent::Sync; BATCH_LEN];
        for (bit, button) in BUTTON_MAP.iter().enumerate() {
            events[bit] = if mask.bit(bit as u8) {
                ButtonEvent::Press(*button)
            } else {
                ButtonEvent::Release(*button)
            };
        }
        Self { mask, events }
    }

    /// The mask this batch was built from.
    pub fn mask(&self) -> ButtonMask {
        self.mask
    }

    /// All nine events, sync marker last.
    pub fn events(&self) -> &[ButtonEvent] {
        &self.events
    }

    /// The eight button events without the trailing sync marker.
    pub fn button_events(&self) -> &[ButtonEvent] {
        &self.events[..BUTTON_MAP.len()]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
