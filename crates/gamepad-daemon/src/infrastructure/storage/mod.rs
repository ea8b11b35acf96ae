//! Storage infrastructure: the daemon's TOML configuration file.
//!
//! The `config` sub-module finds the config file, reads it, and fills every
//! missing field with its default, so the daemon runs without any file at
//! all.

pub mod config;
