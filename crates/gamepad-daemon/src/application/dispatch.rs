//! Dispatcher: the daemon's single-threaded packet loop.
//!
//! ```text
//! Transport ──poll──▶ DedupWindow ──accept──▶ DeviceRegistry ──▶ ButtonTranslator ──▶ OS
//!    │ NoData: sleep           │ repeat: drop       │ error: log, retry next packet
//!    │ Fatal: drain
//! ```
//!
//! # Shutdown state machine
//!
//! ```text
//! Running ──signal / transport lost──▶ Draining(cause) ──drain()──▶ Stopped(cause)
//! ```
//!
//! The first cause wins; later requests are ignored, and draining twice is a
//! no-op.  A packet that is being processed always finishes before the
//! shutdown request is looked at, because the stop flag is only checked
//! between iterations.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use gamepad_core::{DedupWindow, Packet};
use tokio::time;
use tracing::{debug, error, info, trace, warn};

use crate::application::{
    device_registry::DeviceRegistry,
    transport::{PollOutcome, Transport},
    translate_buttons::ButtonTranslator,
};

/// Default pause after a poll that returned no data.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Why the daemon stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// SIGINT or SIGTERM.
    Signal,
    /// The transport reported device loss.
    TransportLost,
}

impl ShutdownCause {
    /// Process exit status for this cause: 0 for a requested shutdown, 1 for
    /// transport loss.
    pub fn exit_status(self) -> u8 {
        match self {
            ShutdownCause::Signal => 0,
            ShutdownCause::TransportLost => 1,
        }
    }
}

/// Lifecycle of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Running,
    Draining(ShutdownCause),
    Stopped(ShutdownCause),
}

/// What happened to an accepted-or-not packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    /// The message id was already in the window.
    Duplicate,
    /// The mask reached the sender's device.
    Committed,
    /// The sender's device could not be created; the update was dropped.
    DeviceUnavailable,
    /// The device rejected the batch; the update was dropped.
    CommitFailed,
}

/// Result of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The transport had nothing to offer.
    Idle,
    /// A packet was received and handled.
    Processed(PacketOutcome),
    /// The transport failed; the dispatcher is now draining.
    TransportLost,
    /// The dispatcher is no longer running.
    NotRunning,
}

/// Counters reported at shutdown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub packets: u64,
    pub duplicates: u64,
    pub commits: u64,
    pub device_errors: u64,
    pub commit_errors: u64,
}

/// Owns every piece of daemon state and drives it one packet at a time.
pub struct Dispatcher {
    transport: Option<Box<dyn Transport>>,
    dedup: DedupWindow,
    registry: DeviceRegistry,
    translator: ButtonTranslator,
    poll_interval: Duration,
    state: DaemonState,
    stats: DispatchStats,
}

impl Dispatcher {
    /// Creates a running dispatcher reading from `transport`.
    pub fn new(
        transport: Box<dyn Transport>,
        registry: DeviceRegistry,
        poll_interval: Duration,
    ) -> Self {
        Self {
            transport: Some(transport),
            dedup: DedupWindow::new(),
            registry,
            translator: ButtonTranslator::new(),
            poll_interval,
            state: DaemonState::Running,
            stats: DispatchStats::default(),
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Returns `true` until the transport has been released by [`drain`](Self::drain).
    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    /// Runs one iteration: poll once and handle whatever came back.
    pub fn step(&mut self) -> StepOutcome {
        if self.state != DaemonState::Running {
            return StepOutcome::NotRunning;
        }
        let Some(transport) = self.transport.as_mut() else {
            return StepOutcome::NotRunning;
        };

        match transport.poll() {
            PollOutcome::NoData => StepOutcome::Idle,
            PollOutcome::Fatal(e) => {
                error!("{} transport lost: {e}", transport.name());
                self.request_shutdown(ShutdownCause::TransportLost);
                StepOutcome::TransportLost
            }
            PollOutcome::Packet(packet) => StepOutcome::Processed(self.handle_packet(packet)),
        }
    }

    /// Pushes one packet through duplicate suppression, device lookup and
    /// button translation.  Never fails: every error is logged and absorbed.
    pub fn handle_packet(&mut self, packet: Packet) -> PacketOutcome {
        self.stats.packets += 1;

        if !self.dedup.accept(packet.message_id) {
            trace!("duplicate message {} from {}", packet.message_id, packet.sender);
            self.stats.duplicates += 1;
            return PacketOutcome::Duplicate;
        }
        debug!(
            "sender {} message {} buttons {}",
            packet.sender, packet.message_id, packet.buttons
        );

        let device = match self.registry.get_or_create(packet.sender) {
            Ok(device) => device,
            Err(e) => {
                warn!("dropping update from {}: {e}", packet.sender);
                self.stats.device_errors += 1;
                return PacketOutcome::DeviceUnavailable;
            }
        };

        match self.translator.commit(device, packet.buttons) {
            Ok(()) => {
                self.stats.commits += 1;
                PacketOutcome::Committed
            }
            Err(e) => {
                error!("commit to sender {} failed: {e}", packet.sender);
                self.stats.commit_errors += 1;
                PacketOutcome::CommitFailed
            }
        }
    }

    /// Moves Running → Draining.  Returns `false` if a shutdown was already
    /// requested, in which case the original cause is kept.
    pub fn request_shutdown(&mut self, cause: ShutdownCause) -> bool {
        if self.state != DaemonState::Running {
            return false;
        }
        info!("shutting down ({cause:?})");
        self.state = DaemonState::Draining(cause);
        true
    }

    /// Releases every device and the transport, moving Draining → Stopped.
    ///
    /// Returns the shutdown cause once stopped, or `None` while still
    /// running.  Draining an already stopped dispatcher does nothing.
    pub fn drain(&mut self) -> Option<ShutdownCause> {
        match self.state {
            DaemonState::Running => None,
            DaemonState::Stopped(cause) => Some(cause),
            DaemonState::Draining(cause) => {
                let released = self.registry.close_all();
                if let Some(transport) = self.transport.take() {
                    info!("closing {} transport", transport.name());
                }
                let s = self.stats;
                info!(
                    "stopped: {released} device(s) released, {} packet(s), {} duplicate(s), \
                     {} commit(s), {} device error(s), {} commit error(s)",
                    s.packets, s.duplicates, s.commits, s.device_errors, s.commit_errors
                );
                self.state = DaemonState::Stopped(cause);
                Some(cause)
            }
        }
    }

    /// Drives the loop until shutdown and returns the cause.
    ///
    /// `stop` is set by the signal handler; it is checked before every
    /// iteration.  After an idle poll the loop sleeps for the poll interval;
    /// after a packet it yields so the signal task can run.
    pub async fn run(&mut self, stop: Arc<AtomicBool>) -> ShutdownCause {
        if let Some(transport) = self.transport.as_ref() {
            info!("dispatch loop reading from {} transport", transport.name());
        }
        loop {
            if stop.load(Ordering::Relaxed) {
                self.request_shutdown(ShutdownCause::Signal);
            }
            match self.step() {
                StepOutcome::Idle => time::sleep(self.poll_interval).await,
                StepOutcome::Processed(_) => tokio::task::yield_now().await,
                StepOutcome::TransportLost | StepOutcome::NotRunning => {
                    if let Some(cause) = self.drain() {
                        return cause;
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
