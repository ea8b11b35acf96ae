//! Infrastructure layer for the daemon.
//!
//! Contains OS-facing adapters: packet transports, virtual input devices and
//! configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `gamepad_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.
//!
//! # Sub-modules
//!
//! - **`transport`** – The radio and broadcast implementations of
//!   `Transport`, plus a scripted transport for tests.  Exactly one is opened
//!   per daemon instance, chosen from configuration at startup.
//!
//! - **`input_device`** – `DeviceFactory` implementations.  On Linux the
//!   uinput backend creates real devices; a recording backend is provided for
//!   tests and for platforms without uinput.
//!
//! - **`storage`** – TOML configuration file loading.

pub mod input_device;
pub mod storage;
pub mod transport;
