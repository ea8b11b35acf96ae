//! gamepad-daemon library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the daemon do?
//!
//! Small battery-powered pads read an NES-style controller and transmit its
//! state over a radio link or a LAN broadcast, repeating every report a few
//! times.  The daemon:
//!
//! 1. Polls exactly one transport for decoded packets.
//! 2. Drops retransmissions using the 32-slot message-id window.
//! 3. Looks up, or lazily creates, one virtual input device per sender.
//! 4. Commits the packet's button mask to that device as one atomic batch of
//!    eight key events plus a sync marker.
//!
//! On SIGINT/SIGTERM or transport loss it releases every device and exits.

/// Application layer: device registry, button translation and the dispatch loop.
pub mod application;

/// Infrastructure layer: transports, OS input devices and configuration.
pub mod infrastructure;
