//! Broadcast transport: gamepad envelopes over UDP.
//!
//! Senders broadcast 32-byte envelopes carrying their own 24-bit id and a
//! message id that is repeated on retransmission.  The socket is put in
//! non-blocking mode so an empty receive queue maps to
//! [`PollOutcome::NoData`].
//!
//! Datagrams that are not exactly one gamepad envelope (wrong size, wrong
//! mode, wrong type) are dropped without comment beyond a `trace` line.

use std::net::{SocketAddr, UdpSocket};

use gamepad_core::decode_broadcast_frame;
use tracing::trace;

use super::is_transient;
use crate::application::transport::{PollOutcome, Transport, TransportError};
use crate::infrastructure::storage::config::BroadcastConfig;

/// Large enough to notice oversized datagrams instead of truncating them to
/// a valid-looking frame.
const RECV_BUFFER_SIZE: usize = 512;

pub struct BroadcastTransport {
    socket: UdpSocket,
    buf: Box<[u8; RECV_BUFFER_SIZE]>,
}

impl BroadcastTransport {
    /// Binds `bind_address:port` and switches the socket to non-blocking.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Open`] if the address cannot be bound.
    pub fn bind(config: &BroadcastConfig) -> Result<Self, TransportError> {
        let target = format!("udp {}:{}", config.bind_address, config.port);
        let socket = UdpSocket::bind((config.bind_address.as_str(), config.port))
            .and_then(|socket| {
                socket.set_nonblocking(true)?;
                Ok(socket)
            })
            .map_err(|source| TransportError::Open { target, source })?;

        Ok(Self {
            socket,
            buf: Box::new([0u8; RECV_BUFFER_SIZE]),
        })
    }

    /// The bound address, useful when port 0 was requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    pub(crate) fn local_addr_string(&self) -> String {
        self.local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "<unknown>".into())
    }
}

impl Transport for BroadcastTransport {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn poll(&mut self) -> PollOutcome {
        let (len, src) = match self.socket.recv_from(&mut self.buf[..]) {
            Ok(pair) => pair,
            Err(e) if is_transient(&e) => return PollOutcome::NoData,
            Err(e) => return PollOutcome::Fatal(TransportError::Lost(e)),
        };

        match decode_broadcast_frame(&self.buf[..len]) {
            Ok(frame) => {
                trace!(
                    "envelope from {src}: to={:06x} fw={:06x} msg={}",
                    frame.to, frame.firmware, frame.message_id
                );
                PollOutcome::Packet(frame.packet())
            }
            Err(e) => {
                trace!("dropping datagram from {src}: {e}");
                PollOutcome::NoData
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
