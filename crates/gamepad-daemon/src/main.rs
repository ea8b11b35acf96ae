//! gamepadd: exposes remote gamepads as local virtual input devices.
//!
//! # Usage
//!
//! ```text
//! gamepadd [OPTIONS]
//!
//! Options:
//!   --config <PATH>                    Config file
//!                                      [default: $XDG_CONFIG_HOME/gamepadd/config.toml]
//!   --transport <radio|broadcast>      Override the configured transport
//!   --log-level <FILTER>               Override the configured log filter
//! ```
//!
//! | Variable              | Same as          |
//! |-----------------------|------------------|
//! | `GAMEPADD_CONFIG`     | `--config`       |
//! | `GAMEPADD_TRANSPORT`  | `--transport`    |
//! | `GAMEPADD_LOG_LEVEL`  | `--log-level`    |
//!
//! `RUST_LOG`, when set, replaces the log filter entirely.
//!
//! # Exit status
//!
//! 0 after SIGINT or SIGTERM, 1 after transport loss or a startup failure.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use gamepad_daemon::application::{
    device_registry::{DeviceFactory, DeviceRegistry},
    dispatch::Dispatcher,
};
use gamepad_daemon::infrastructure::{
    storage::config::{default_config_path, load_config, DaemonConfig, TransportKind},
    transport::open_transport,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Gamepad daemon.
///
/// Receives gamepad packets over a radio link or LAN broadcast and creates
/// one virtual input device per remote pad.
#[derive(Debug, Parser)]
#[command(
    name = "gamepadd",
    about = "Expose remote radio/LAN gamepads as local virtual input devices",
    version
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "GAMEPADD_CONFIG")]
    config: Option<PathBuf>,

    /// Transport to read packets from, overriding the config file.
    #[arg(long, value_enum, env = "GAMEPADD_TRANSPORT")]
    transport: Option<TransportKind>,

    /// `tracing` filter, e.g. `debug` or `gamepad_daemon=trace`.
    #[arg(long, env = "GAMEPADD_LOG_LEVEL")]
    log_level: Option<String>,
}

/// Config plus the file it came from, if any.
struct LoadedConfig {
    config: DaemonConfig,
    path: Option<PathBuf>,
}

impl Cli {
    /// Loads the config file named by `--config`, or the default one, then
    /// applies `--transport`.
    fn load_config(&self) -> anyhow::Result<LoadedConfig> {
        self.load_config_with(default_config_path().ok())
    }

    /// Same as [`load_config`](Self::load_config) with the default path
    /// already resolved.  `None` means there is no config directory, so the
    /// defaults are used.
    ///
    /// An explicit path must exist; the default path may be missing.
    fn load_config_with(&self, default_path: Option<PathBuf>) -> anyhow::Result<LoadedConfig> {
        let path = match &self.config {
            Some(path) => {
                if !path.exists() {
                    bail!("config file {} does not exist", path.display());
                }
                Some(path.clone())
            }
            None => default_path,
        };

        let mut config = match &path {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => DaemonConfig::default(),
        };
        if let Some(kind) = self.transport {
            config.transport.kind = kind;
        }
        Ok(LoadedConfig { config, path })
    }
}

/// Log filter used when `RUST_LOG` is unset: `--log-level`, then the
/// config's `log_level`, then `info`.
fn fallback_filter<'a>(cli_level: Option<&'a str>, config_level: Option<&'a str>) -> &'a str {
    cli_level.or(config_level).unwrap_or("info")
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"))
        }))
        .init();
}

#[cfg(target_os = "linux")]
fn device_factory() -> anyhow::Result<Box<dyn DeviceFactory>> {
    use gamepad_daemon::infrastructure::input_device::linux::UinputDeviceFactory;
    Ok(Box::new(UinputDeviceFactory::new()))
}

#[cfg(not(target_os = "linux"))]
fn device_factory() -> anyhow::Result<Box<dyn DeviceFactory>> {
    bail!("virtual gamepads need Linux uinput, which this platform does not have")
}

fn build_dispatcher(config: &DaemonConfig) -> anyhow::Result<Dispatcher> {
    let factory = device_factory()?;
    let transport = open_transport(&config.transport).context("failed to open transport")?;
    Ok(Dispatcher::new(
        transport,
        DeviceRegistry::new(factory),
        config.poll_interval(),
    ))
}

// ── Signals ───────────────────────────────────────────────────────────────────

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|()| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|()| "Ctrl+C")
}

/// Sets `stop` when SIGINT or SIGTERM arrives.  The dispatch loop notices at
/// its next iteration boundary.
fn spawn_signal_listener(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!("received {name}, shutting down");
                stop.store(true, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for termination signals: {e}"),
        }
    });
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The config is read before logging starts because it may carry the
    // log filter; a load failure is reported once logging is up.
    let loaded = cli.load_config();
    let config_level = loaded
        .as_ref()
        .ok()
        .map(|l| l.config.daemon.log_level.as_str());
    init_tracing(fallback_filter(cli.log_level.as_deref(), config_level));

    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("startup failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    match &loaded.path {
        Some(path) => info!("gamepadd starting, config {}", path.display()),
        None => warn!("gamepadd starting without a config directory; using defaults"),
    }

    let mut dispatcher = match build_dispatcher(&loaded.config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("startup failed: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let stop = Arc::new(AtomicBool::new(false));
    spawn_signal_listener(Arc::clone(&stop));

    let cause = dispatcher.run(stop).await;
    info!("gamepadd stopped ({cause:?})");
    ExitCode::from(cause.exit_status())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
