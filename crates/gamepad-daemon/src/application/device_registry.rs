//! DeviceRegistry: one virtual input device per remote sender.
//!
//! Devices are created lazily, on the first accepted packet from a sender,
//! and live until the daemon shuts down.  The registry is the only owner of
//! OS device handles; nothing else may emit to or release them directly.
//!
//! Creation failures are not remembered.  The next packet from the same
//! sender simply tries again, with no backoff.

use gamepad_core::{ButtonBatch, ButtonMask, SenderId};
use indexmap::{map::Entry, IndexMap};
use thiserror::Error;
use tracing::{error, info};

/// Error type for virtual device operations.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The OS refused to create or register the device.
    #[error("failed to create virtual device for sender {sender}: {reason}")]
    Create { sender: SenderId, reason: String },
    /// Writing an event batch to the device failed.
    #[error("failed to emit events: {0}")]
    Emit(String),
    /// Destroying the device failed.
    #[error("failed to release virtual device: {0}")]
    Release(String),
    /// The registry has already been torn down.
    #[error("device registry is closed")]
    RegistryClosed,
}

/// A live OS-level virtual input device.
///
/// Each implementation lives in the infrastructure layer.
pub trait InputDevice: Send {
    /// Delivers `batch` to the OS as one indivisible update.
    ///
    /// Consumers of the device must never observe some but not all of the
    /// batch's events.
    fn emit(&mut self, batch: &ButtonBatch) -> Result<(), DeviceError>;

    /// Destroys the device and releases every kernel-side resource.
    fn release(self: Box<Self>) -> Result<(), DeviceError>;
}

/// Creates OS-level virtual input devices.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceFactory: Send + Sync {
    /// Creates a device supporting the eight gamepad buttons for `sender`.
    fn create(&self, sender: SenderId) -> Result<Box<dyn InputDevice>, DeviceError>;
}

/// A registered device together with what was last delivered to it.
pub struct VirtualDevice {
    sender: SenderId,
    handle: Box<dyn InputDevice>,
    last_buttons: Option<ButtonMask>,
}

impl VirtualDevice {
    fn new(sender: SenderId, handle: Box<dyn InputDevice>) -> Self {
        Self {
            sender,
            handle,
            last_buttons: None,
        }
    }

    /// The sender this device represents.
    pub fn sender(&self) -> SenderId {
        self.sender
    }

    /// The last mask successfully committed, or `None` before the first commit.
    pub fn last_buttons(&self) -> Option<ButtonMask> {
        self.last_buttons
    }

    /// Emits `batch` and records its mask on success.
    pub(crate) fn emit(&mut self, batch: &ButtonBatch) -> Result<(), DeviceError> {
        self.handle.emit(batch)?;
        self.last_buttons = Some(batch.mask());
        Ok(())
    }
}

/// Insertion-ordered map from sender id to its virtual device.
pub struct DeviceRegistry {
    factory: Box<dyn DeviceFactory>,
    devices: IndexMap<SenderId, VirtualDevice>,
    closed: bool,
}

impl DeviceRegistry {
    /// Creates an empty registry that builds devices with `factory`.
    pub fn new(factory: Box<dyn DeviceFactory>) -> Self {
        Self {
            factory,
            devices: IndexMap::new(),
            closed: false,
        }
    }

    /// Returns the device for `sender`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Create`] if the OS refuses the device; nothing
    /// is registered and the next call retries.  Returns
    /// [`DeviceError::RegistryClosed`] after [`close_all`](Self::close_all).
    pub fn get_or_create(&mut self, sender: SenderId) -> Result<&mut VirtualDevice, DeviceError> {
        if self.closed {
            return Err(DeviceError::RegistryClosed);
        }
        match self.devices.entry(sender) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let handle = self.factory.create(sender)?;
                info!("created virtual device for sender {sender}");
                Ok(entry.insert(VirtualDevice::new(sender, handle)))
            }
        }
    }

    /// Returns the device for `sender` without creating one.
    pub fn get(&self, sender: SenderId) -> Option<&VirtualDevice> {
        self.devices.get(&sender)
    }

    /// Returns `true` if `sender` has a device.
    pub fn contains(&self, sender: SenderId) -> bool {
        self.devices.contains_key(&sender)
    }

    /// Senders in the order their devices were created.
    pub fn senders(&self) -> impl Iterator<Item = SenderId> + '_ {
        self.devices.keys().copied()
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is registered.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns `true` once [`close_all`](Self::close_all) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Releases every registered device, in creation order.
    ///
    /// Returns the number of devices released.  A failed release is logged
    /// and does not stop the teardown.  Calling this again is a no-op that
    /// returns 0.
    pub fn close_all(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        self.closed = true;

        let mut released = 0;
        for (sender, device) in self.devices.drain(..) {
            match device.handle.release() {
                Ok(()) => info!("released virtual device for sender {sender}"),
                Err(e) => error!("releasing device for sender {sender}: {e}"),
            }
            released += 1;
        }
        released
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
