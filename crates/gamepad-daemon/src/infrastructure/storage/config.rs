//! TOML-based configuration for the daemon.
//!
//! Default location: `$XDG_CONFIG_HOME/gamepadd/config.toml`, falling back to
//! `~/.config/gamepadd/config.toml`.  A missing file is not an error; the
//! daemon then runs with [`DaemonConfig::default`].
//!
//! ```toml
//! [daemon]
//! log_level = "info"
//! poll_interval_ms = 1
//!
//! [transport]
//! kind = "broadcast"          # or "radio"
//!
//! [transport.radio]
//! device = "/dev/nrf24"
//! sender_id = 0
//!
//! [transport.broadcast]
//! bind_address = "0.0.0.0"
//! port = 7777
//! ```
//!
//! Every field has a serde default, so a partial file only overrides what it
//! names.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine the config directory (XDG_CONFIG_HOME and HOME are unset)")]
    NoConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    #[serde(default)]
    pub daemon: DaemonSettings,
    #[serde(default)]
    pub transport: TransportConfig,
}

/// General daemon behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonSettings {
    /// `tracing` filter used when neither `RUST_LOG` nor `--log-level` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Sleep after an idle poll, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Which transport to open and how.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    #[serde(default)]
    pub kind: TransportKind,
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// The two packet sources.  Exactly one is active per daemon instance.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Point-to-point radio link through a character device.
    Radio,
    /// UDP broadcast on the local network.
    #[default]
    Broadcast,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadioConfig {
    /// Device node exposed by the radio driver.
    #[serde(default = "default_radio_device")]
    pub device: PathBuf,
    /// Sender id assigned to the single radio peer.
    #[serde(default)]
    pub sender_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BroadcastConfig {
    /// IP address to bind.  `"0.0.0.0"` listens on all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_broadcast_port")]
    pub port: u16,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_poll_interval_ms() -> u64 {
    1
}
fn default_radio_device() -> PathBuf {
    PathBuf::from("/dev/nrf24")
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_broadcast_port() -> u16 {
    7777
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            device: default_radio_device(),
            sender_id: 0,
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_broadcast_port(),
        }
    }
}

impl DaemonConfig {
    /// The idle-poll sleep as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.daemon.poll_interval_ms)
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves `gamepadd/config.toml` under the user's config directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when neither `XDG_CONFIG_HOME` nor
/// `HOME` is set.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
    .ok_or(ConfigError::NoConfigDir)
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("gamepadd").join("config.toml"))
}

/// Loads the config at `path`, returning [`DaemonConfig::default`] if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<DaemonConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DaemonConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses config text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the TOML is malformed or a field has the
/// wrong type.
pub fn parse_config(content: &str) -> Result<DaemonConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
