//! Transport implementations.
//!
//! - **`radio`** – Reads fixed 32-byte frames from the radio device node.
//!   Unix only.
//! - **`broadcast`** – Receives broadcast envelopes on a non-blocking UDP
//!   socket.
//! - **`mock`** – Replays a scripted sequence of poll outcomes for tests.
//!
//! Which one runs is decided once at startup by [`open_transport`].

pub mod broadcast;
pub mod mock;
#[cfg(unix)]
pub mod radio;

use std::io;

use tracing::info;

use crate::application::transport::{Transport, TransportError};
use crate::infrastructure::storage::config::{TransportConfig, TransportKind};

/// Opens the transport selected by `config.kind`.
///
/// # Errors
///
/// Returns the transport's open error; the daemon treats it as an
/// initialization failure.
pub fn open_transport(config: &TransportConfig) -> Result<Box<dyn Transport>, TransportError> {
    match config.kind {
        TransportKind::Broadcast => {
            let transport = broadcast::BroadcastTransport::bind(&config.broadcast)?;
            info!("listening for broadcast frames on udp {}", transport.local_addr_string());
            Ok(Box::new(transport))
        }
        TransportKind::Radio => open_radio(config),
    }
}

/// Read errors that only mean "nothing right now".  Both transports map
/// these to `NoData`; anything else is fatal.
pub(crate) fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(unix)]
fn open_radio(config: &TransportConfig) -> Result<Box<dyn Transport>, TransportError> {
    let transport = radio::RadioTransport::open(&config.radio)?;
    info!(
        "reading radio frames from {} as sender {}",
        config.radio.device.display(),
        transport.sender()
    );
    Ok(Box::new(transport))
}

#[cfg(not(unix))]
fn open_radio(config: &TransportConfig) -> Result<Box<dyn Transport>, TransportError> {
    Err(TransportError::Open {
        target: config.radio.device.display().to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "the radio transport needs a unix device node",
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::config::{BroadcastConfig, RadioConfig};

    #[test]
    fn test_open_broadcast_on_ephemeral_port() {
        // Arrange
        let config = TransportConfig {
            kind: TransportKind::Broadcast,
            radio: RadioConfig::default(),
            broadcast: BroadcastConfig {
                bind_address: "127.0.0.1".into(),
                port: 0,
            },
        };

        // Act
        let transport = open_transport(&config);

        // Assert
        assert_eq!(transport.unwrap().name(), "broadcast");
    }

    #[test]
    fn test_transient_read_errors() {
        assert!(is_transient(&io::ErrorKind::WouldBlock.into()));
        assert!(is_transient(&io::ErrorKind::Interrupted.into()));
        assert!(is_transient(&io::ErrorKind::TimedOut.into()));
        assert!(!is_transient(&io::ErrorKind::ConnectionReset.into()));
        assert!(!is_transient(&io::ErrorKind::BrokenPipe.into()));
    }

    #[test]
    fn test_open_radio_with_missing_device_fails() {
        let config = TransportConfig {
            kind: TransportKind::Radio,
            radio: RadioConfig {
                device: "/nonexistent/gamepadd-radio".into(),
                sender_id: 0,
            },
            broadcast: BroadcastConfig::default(),
        };

        let result = open_transport(&config);

        assert!(result.is_err());
    }
}
