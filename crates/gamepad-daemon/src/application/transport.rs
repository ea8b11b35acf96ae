//! Transport abstraction: where packets come from.
//!
//! A transport yields decoded [`Packet`]s one poll at a time.  Polling must
//! never block for long; when nothing is waiting it reports
//! [`PollOutcome::NoData`] and the dispatch loop sleeps briefly before trying
//! again.  Malformed frames are also reported as `NoData` because they are
//! dropped silently.  Only losing the underlying device is fatal.

use std::path::PathBuf;

use gamepad_core::Packet;
use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not be opened at startup.
    #[error("failed to open {target}: {source}")]
    Open {
        target: String,
        #[source]
        source: std::io::Error,
    },
    /// The radio device node does not exist.
    #[error("radio device {0} not found")]
    DeviceMissing(PathBuf),
    /// The link went away (hardware disconnect, interface down).
    #[error("transport lost: {0}")]
    Lost(#[source] std::io::Error),
    /// The device reported end-of-file.
    #[error("transport closed by the device")]
    Closed,
}

/// Result of a single poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// A valid gamepad packet was received.
    Packet(Packet),
    /// Nothing usable is available right now.
    NoData,
    /// The transport is gone for good.
    Fatal(TransportError),
}

/// A source of gamepad packets.
///
/// Exactly one transport is active per daemon instance.
pub trait Transport: Send {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Returns the next packet, `NoData`, or `Fatal`, without blocking for
    /// more than a short timeout.
    fn poll(&mut self) -> PollOutcome;
}
