//! Application layer for the daemon.
//!
//! - **`device_registry`** – Maps each sender id to its lazily created
//!   virtual device and owns every device until shutdown.
//!
//! - **`translate_buttons`** – Commits a button mask to a device as one
//!   indivisible batch.
//!
//! - **`dispatch`** – The single-threaded loop composing transport, duplicate
//!   window, registry and translator, plus the Running → Draining → Stopped
//!   shutdown state machine.
//!
//! - **`transport`** – The `Transport` trait the infrastructure layer
//!   implements for the radio and broadcast links.

pub mod device_registry;
pub mod dispatch;
pub mod translate_buttons;
pub mod transport;
