//! Radio transport: fixed-size frames from a character device.
//!
//! The radio driver exposes received payloads through a device node (by
//! default `/dev/nrf24`); each `read` returns one 32-byte payload.  The node
//! is opened with `O_NONBLOCK` so an empty receive FIFO shows up as
//! `WouldBlock` instead of stalling the dispatch loop.
//!
//! Radio frames carry no sender or message id.  Every valid frame is stamped
//! with the configured sender id and the next value of a
//! [`MessageIdSequence`], so the duplicate window never drops radio input.
//!
//! | read result                      | outcome            |
//! |----------------------------------|--------------------|
//! | 32 bytes with the magic marker   | `Packet`           |
//! | short read, bad magic            | `NoData` (dropped) |
//! | `WouldBlock`, `Interrupted`,     | `NoData`           |
//! | `TimedOut`                       |                    |
//! | 0 bytes (end of file)            | `Fatal(Closed)`    |
//! | any other I/O error              | `Fatal(Lost)`      |

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::unix::fs::OpenOptionsExt;

use gamepad_core::{
    decode_radio_frame, protocol::packet::FRAME_SIZE, protocol::MessageIdSequence, Packet,
    SenderId,
};
use tracing::trace;

use super::is_transient;
use crate::application::transport::{PollOutcome, Transport, TransportError};
use crate::infrastructure::storage::config::RadioConfig;

/// Reads radio frames from any byte source; a [`File`] in production.
pub struct RadioTransport<R = File> {
    source: R,
    sender: SenderId,
    sequence: MessageIdSequence,
}

impl RadioTransport<File> {
    /// Opens the configured device node in non-blocking read mode.
    ///
    /// # Errors
    ///
    /// [`TransportError::DeviceMissing`] when the node does not exist,
    /// [`TransportError::Open`] for any other open failure.
    pub fn open(config: &RadioConfig) -> Result<Self, TransportError> {
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(&config.device)
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => TransportError::DeviceMissing(config.device.clone()),
                _ => TransportError::Open {
                    target: config.device.display().to_string(),
                    source,
                },
            })?;
        Ok(Self::from_reader(file, SenderId::new(config.sender_id)))
    }
}

impl<R: Read> RadioTransport<R> {
    /// Wraps an already open byte source.
    pub fn from_reader(source: R, sender: SenderId) -> Self {
        Self {
            source,
            sender,
            sequence: MessageIdSequence::new(),
        }
    }

    /// The sender id stamped on every frame.
    pub fn sender(&self) -> SenderId {
        self.sender
    }
}

impl<R: Read + Send> Transport for RadioTransport<R> {
    fn name(&self) -> &'static str {
        "radio"
    }

    fn poll(&mut self) -> PollOutcome {
        let mut buf = [0u8; FRAME_SIZE];
        let len = match self.source.read(&mut buf) {
            Ok(0) => return PollOutcome::Fatal(TransportError::Closed),
            Ok(len) => len,
            Err(e) if is_transient(&e) => return PollOutcome::NoData,
            Err(e) => return PollOutcome::Fatal(TransportError::Lost(e)),
        };

        match decode_radio_frame(&buf[..len]) {
            Ok(buttons) => PollOutcome::Packet(Packet {
                sender: self.sender,
                message_id: self.sequence.next(),
                buttons,
            }),
            Err(e) => {
                trace!("dropping radio frame: {e}");
                PollOutcome::NoData
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
