//! Recording device backend for tests and uinput-less platforms.
//!
//! # Why a recording backend?
//!
//! The real uinput backend needs write access to `/dev/uinput` and creates
//! devices every process on the machine can see.  The recording backend
//! replaces all of that with an in-memory [`DeviceJournal`] so tests can
//! assert exactly which devices were created, what each received, and which
//! were released.
//!
//! Each committed batch is appended to the journal as one entry while the
//! journal lock is held, so a reader can never see part of a batch.
//!
//! # Failure injection
//!
//! [`RecordingDeviceFactory::fail_next_creates`] and
//! [`RecordingDeviceFactory::fail_next_emits`] make the next N calls fail,
//! which exercises the daemon's error paths without a broken OS.

use std::sync::{Arc, Mutex, MutexGuard};

use gamepad_core::{ButtonBatch, ButtonEvent, SenderId};

use crate::application::device_registry::{DeviceError, DeviceFactory, InputDevice};

/// One observable call made against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Created(SenderId),
    Batch(SenderId, Vec<ButtonEvent>),
    Released(SenderId),
}

/// Ordered log of every call made against the recording backend.
#[derive(Debug, Default)]
pub struct DeviceJournal {
    calls: Mutex<Vec<DeviceCall>>,
}

impl DeviceJournal {
    /// Every call, in the order it happened.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().clone()
    }

    /// Senders whose devices were created.
    pub fn created(&self) -> Vec<SenderId> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Created(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    /// Every committed batch with its sender.
    pub fn batches(&self) -> Vec<(SenderId, Vec<ButtonEvent>)> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Batch(s, events) => Some((*s, events.clone())),
                _ => None,
            })
            .collect()
    }

    /// Senders whose devices were released.
    pub fn released(&self) -> Vec<SenderId> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::Released(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DeviceCall) {
        self.lock().push(call);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DeviceCall>> {
        // A panic while holding the lock only happens in a failing test;
        // the journal is still readable afterwards.
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Default)]
struct FailureBudget {
    creates: u32,
    emits: u32,
}

/// Factory producing [`RecordingDevice`]s.
///
/// Clones share the same journal and failure budget, so a test can keep one
/// clone for assertions after handing the other to the registry.
#[derive(Debug, Clone, Default)]
pub struct RecordingDeviceFactory {
    journal: Arc<DeviceJournal>,
    failures: Arc<Mutex<FailureBudget>>,
}

impl RecordingDeviceFactory {
    /// Creates a factory with an empty journal and no injected failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// The journal shared by this factory and every device it created.
    pub fn journal(&self) -> Arc<DeviceJournal> {
        Arc::clone(&self.journal)
    }

    /// Makes the next `count` calls to `create` fail.
    pub fn fail_next_creates(&self, count: u32) {
        self.budget().creates = count;
    }

    /// Makes the next `count` calls to `emit`, on any device, fail.
    pub fn fail_next_emits(&self, count: u32) {
        self.budget().emits = count;
    }

    fn budget(&self) -> MutexGuard<'_, FailureBudget> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Takes one failure from `remaining`; returns `true` if the call must fail.
fn consume(remaining: &mut u32) -> bool {
    if *remaining == 0 {
        return false;
    }
    *remaining -= 1;
    true
}

impl DeviceFactory for RecordingDeviceFactory {
    fn create(&self, sender: SenderId) -> Result<Box<dyn InputDevice>, DeviceError> {
        if consume(&mut self.budget().creates) {
            return Err(DeviceError::Create {
                sender,
                reason: "mock failure".into(),
            });
        }
        self.journal.record(DeviceCall::Created(sender));
        Ok(Box::new(RecordingDevice {
            sender,
            factory: self.clone(),
        }))
    }
}

/// In-memory device appending to the shared journal.
#[derive(Debug)]
pub struct RecordingDevice {
    sender: SenderId,
    factory: RecordingDeviceFactory,
}

impl InputDevice for RecordingDevice {
    fn emit(&mut self, batch: &ButtonBatch) -> Result<(), DeviceError> {
        if consume(&mut self.factory.budget().emits) {
            return Err(DeviceError::Emit("mock failure".into()));
        }
        self.factory
            .journal
            .record(DeviceCall::Batch(self.sender, batch.events().to_vec()));
        Ok(())
    }

    fn release(self: Box<Self>) -> Result<(), DeviceError> {
        self.factory.journal.record(DeviceCall::Released(self.sender));
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
