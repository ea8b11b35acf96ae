//! # gamepad-core
//!
//! Shared library for the gamepad daemon containing the packet model, the
//! two wire codecs, duplicate suppression and the button translation table.
//!
//! This crate has zero dependencies on OS APIs, sockets or input devices.
//!
//! # Architecture overview
//!
//! Remote gamepads transmit their button state periodically, and usually
//! more than once per change, over either a point-to-point radio link or a
//! LAN broadcast.  The daemon turns each distinct sender into a virtual
//! input device on the host.  This crate holds the pieces that need no OS:
//!
//! - **`protocol`** – How bytes travel over the air.  Both frame variants are
//!   32 bytes long and decode into the same logical [`Packet`].
//!
//! - **`domain`** – Pure logic.  The [`DedupWindow`] remembers the last 32
//!   accepted message ids, and the button table maps mask bits to logical
//!   buttons and builds the 9-event [`ButtonBatch`] committed per update.

pub mod domain;
pub mod protocol;

pub use domain::buttons::{Button, ButtonBatch, ButtonEvent, BUTTON_MAP};
pub use domain::dedup::{DedupWindow, DEDUP_CAPACITY};
pub use protocol::codec::{
    decode_broadcast_frame, decode_radio_frame, encode_broadcast_frame, encode_radio_frame,
    FrameError,
};
pub use protocol::packet::{ButtonMask, MessageId, Packet, SenderId};
