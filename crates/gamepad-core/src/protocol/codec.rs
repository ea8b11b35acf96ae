//! Binary codecs for the two gamepad frame variants.
//!
//! Radio frame (point-to-point link, sender implicit):
//! ```text
//! [magic:8 = "gamepad\0"][buttons:2][reserved:22]
//! ```
//!
//! Broadcast frame (LAN, explicit addressing):
//! ```text
//! [from:3][to:3][firmware:3][message_id:3][mode:1][type:1][buttons:2×4][reserved:10]
//! ```
//!
//! Both frames are exactly [`FRAME_SIZE`] bytes.  All multi-byte integers are
//! little-endian.  Only `buttons[0]` of a broadcast frame reaches the button
//! translator; the remaining three are reserved for multi-pad senders.

use thiserror::Error;

use crate::protocol::packet::{ButtonMask, MessageId, Packet, SenderId, FRAME_SIZE};

/// ASCII marker at the start of every radio frame.
pub const RADIO_MAGIC: [u8; 8] = *b"gamepad\0";

/// Broadcast `mode` value for frames addressed to every listener.
pub const PACKET_MODE_BROADCAST: u8 = 2;

/// Broadcast `type` value for gamepad state reports.
pub const PACKET_TYPE_GAMEPAD: u8 = 0x20;

/// Number of button-mask slots carried by a broadcast frame.
pub const BROADCAST_BUTTON_SLOTS: usize = 4;

const BROADCAST_BUTTONS_OFFSET: usize = 14;

/// Errors that can occur while decoding a frame.
///
/// None of these ever abort the daemon: the transport treats every variant as
/// "no data" and drops the frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The datagram is not exactly one frame long.
    #[error("wrong frame size: expected {expected} bytes, got {actual}")]
    WrongSize { expected: usize, actual: usize },

    /// A radio frame does not start with [`RADIO_MAGIC`].
    #[error("bad magic marker")]
    BadMagic,

    /// A broadcast frame is not a broadcast-mode packet.
    #[error("unexpected packet mode: {0}")]
    UnexpectedMode(u8),

    /// A broadcast frame carries something other than gamepad state.
    #[error("unexpected packet type: 0x{0:02X}")]
    UnexpectedType(u8),
}

/// Full contents of a decoded broadcast frame.
///
/// The daemon consumes only [`BroadcastFrame::packet`], but keeps the rest for
/// diagnostics logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastFrame {
    pub from: SenderId,
    pub to: u32,
    pub firmware: u32,
    pub message_id: MessageId,
    pub mode: u8,
    pub packet_type: u8,
    pub buttons: [ButtonMask; BROADCAST_BUTTON_SLOTS],
}

impl BroadcastFrame {
    /// Builds a broadcast gamepad frame from `from` carrying a single pad's state.
    pub fn gamepad(from: SenderId, message_id: MessageId, buttons: ButtonMask) -> Self {
        Self {
            from,
            to: 0,
            firmware: 0,
            message_id,
            mode: PACKET_MODE_BROADCAST,
            packet_type: PACKET_TYPE_GAMEPAD,
            buttons: [buttons, ButtonMask::NONE, ButtonMask::NONE, ButtonMask::NONE],
        }
    }

    /// Reduces the frame to the logical packet shape.
    pub fn packet(&self) -> Packet {
        Packet {
            sender: self.from,
            message_id: self.message_id,
            buttons: self.buttons[0],
        }
    }
}

// ── Radio ─────────────────────────────────────────────────────────────────────

/// Decodes the button mask carried by a radio frame.
///
/// The radio frame has no sender or message id; the transport supplies both.
///
/// # Errors
///
/// Returns [`FrameError::WrongSize`] unless `bytes` is exactly one frame, and
/// [`FrameError::BadMagic`] if the marker does not match.
pub fn decode_radio_frame(bytes: &[u8]) -> Result<ButtonMask, FrameError> {
    check_size(bytes)?;
    if bytes[..RADIO_MAGIC.len()] != RADIO_MAGIC {
        return Err(FrameError::BadMagic);
    }
    Ok(ButtonMask(u16::from_le_bytes([bytes[8], bytes[9]])))
}

/// Encodes a radio frame carrying `buttons`.  Reserved bytes are zero.
pub fn encode_radio_frame(buttons: ButtonMask) -> [u8; FRAME_SIZE] {
    let mut frame = [0u8; FRAME_SIZE];
    frame[..RADIO_MAGIC.len()].copy_from_slice(&RADIO_MAGIC);
    frame[8..10].copy_from_slice(&buttons.0.to_le_bytes());
    frame
}

// ── Broadcast ─────────────────────────────────────────────────────────────────

/// Decodes a broadcast gamepad frame.
///
/// # Errors
///
/// Returns [`FrameError::WrongSize`] unless `bytes` is exactly one frame, and
/// [`FrameError::UnexpectedMode`] / [`FrameError::UnexpectedType`] for valid
/// frames that are not broadcast gamepad reports.
pub fn decode_broadcast_frame(bytes: &[u8]) -> Result<BroadcastFrame, FrameError> {
    check_size(bytes)?;

    let mode = bytes[12];
    if mode != PACKET_MODE_BROADCAST {
        return Err(FrameError::UnexpectedMode(mode));
    }
    let packet_type = bytes[13];
    if packet_type != PACKET_TYPE_GAMEPAD {
        return Err(FrameError::UnexpectedType(packet_type));
    }

    let mut buttons = [ButtonMask::NONE; BROADCAST_BUTTON_SLOTS];
    for (slot, mask) in buttons.iter_mut().enumerate() {
        let at = BROADCAST_BUTTONS_OFFSET + slot * 2;
        *mask = ButtonMask(u16::from_le_bytes([bytes[at], bytes[at + 1]]));
    }

    Ok(BroadcastFrame {
        from: SenderId::new(read_u24(&bytes[0..3])),
        to: read_u24(&bytes[3..6]),
        firmware: read_u24(&bytes[6..9]),
        message_id: MessageId::new(read_u24(&bytes[9..12])),
        mode,
        packet_type,
        buttons,
    })
}

/// Encodes a broadcast frame.  Reserved bytes are zero.
pub fn encode_broadcast_frame(frame: &BroadcastFrame) -> [u8; FRAME_SIZE] {
    let mut out = [0u8; FRAME_SIZE];
    write_u24(&mut out[0..3], frame.from.get());
    write_u24(&mut out[3..6], frame.to);
    write_u24(&mut out[6..9], frame.firmware);
    write_u24(&mut out[9..12], frame.message_id.get());
    out[12] = frame.mode;
    out[13] = frame.packet_type;
    for (slot, mask) in frame.buttons.iter().enumerate() {
        let at = BROADCAST_BUTTONS_OFFSET + slot * 2;
        out[at..at + 2].copy_from_slice(&mask.0.to_le_bytes());
    }
    out
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_size(bytes: &[u8]) -> Result<(), FrameError> {
    if bytes.len() != FRAME_SIZE {
        return Err(FrameError::WrongSize {
            expected: FRAME_SIZE,
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn read_u24(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

fn write_u24(out: &mut [u8], value: u32) {
    out.copy_from_slice(&value.to_le_bytes()[..3]);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
