//! ButtonTranslator: commits a button mask to a virtual device.
//!
//! The translator never diffs against the device's previous mask.  Every
//! commit carries all eight button states plus the sync marker, built from
//! the shared [`BUTTON_MAP`](gamepad_core::BUTTON_MAP) table, and hands them
//! to the device in a single call so the OS applies them together.

use gamepad_core::{ButtonBatch, ButtonMask};
use tracing::trace;

use crate::application::device_registry::{DeviceError, VirtualDevice};

/// Converts masks into complete event batches and delivers them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ButtonTranslator;

impl ButtonTranslator {
    /// Creates a translator.
    pub fn new() -> Self {
        Self
    }

    /// Emits press/release events for buttons 0–7 of `mask`, then a sync
    /// marker, as one indivisible batch.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Emit`] if the device rejects the batch; the
    /// device's last mask is left unchanged in that case.
    pub fn commit(&self, device: &mut VirtualDevice, mask: ButtonMask) -> Result<(), DeviceError> {
        let batch = ButtonBatch::from_mask(mask);
        device.emit(&batch)?;
        trace!("sender {} buttons {mask}", device.sender());
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::device_registry::DeviceRegistry;
    use crate::infrastructure::input_device::mock::RecordingDeviceFactory;
    use gamepad_core::{Button, ButtonEvent, SenderId};

    fn make_registry() -> (DeviceRegistry, RecordingDeviceFactory) {
        let factory = RecordingDeviceFactory::new();
        let registry = DeviceRegistry::new(Box::new(factory.clone()));
        (registry, factory)
    }

    #[test]
    fn test_commit_delivers_nine_events_in_one_batch() {
        // Arrange
        let (mut registry, factory) = make_registry();
        let device = registry.get_or_create(SenderId::new(1)).unwrap();

        // Act
        ButtonTranslator::new().commit(device, ButtonMask(0x0001)).unwrap();

        // Assert
        let batches = factory.journal().batches();
        assert_eq!(batches.len(), 1, "all events must arrive as one batch");
        assert_eq!(
            batches[0].1,
            vec![
                ButtonEvent::Press(Button::A),
                ButtonEvent::Release(Button::B),
                ButtonEvent::Release(Button::Select),
                ButtonEvent::Release(Button::Start),
                ButtonEvent::Release(Button::Up),
                ButtonEvent::Release(Button::Down),
                ButtonEvent::Release(Button::Left),
                ButtonEvent::Release(Button::Right),
                ButtonEvent::Sync,
            ]
        );
    }

    #[test]
    fn test_commit_is_not_diff_aware() {
        // Arrange
        let (mut registry, factory) = make_registry();
        let device = registry.get_or_create(SenderId::new(1)).unwrap();
        let translator = ButtonTranslator::new();

        // Act – same mask twice
        translator.commit(device, ButtonMask(0x0010)).unwrap();
        translator.commit(device, ButtonMask(0x0010)).unwrap();

        // Assert – both commits carry the full batch
        let batches = factory.journal().batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].1, batches[1].1);
    }

    #[test]
    fn test_commit_records_last_mask() {
        let (mut registry, _factory) = make_registry();
        let device = registry.get_or_create(SenderId::new(2)).unwrap();

        ButtonTranslator::new().commit(device, ButtonMask(0x00C0)).unwrap();

        assert_eq!(device.last_buttons(), Some(ButtonMask(0x00C0)));
    }

    #[test]
    fn test_failed_commit_keeps_previous_mask() {
        // Arrange
        let (mut registry, factory) = make_registry();
        let translator = ButtonTranslator::new();
        let device = registry.get_or_create(SenderId::new(3)).unwrap();
        translator.commit(device, ButtonMask(0x0001)).unwrap();
        factory.fail_next_emits(1);

        // Act
        let result = translator.commit(device, ButtonMask(0x0002));

        // Assert
        assert!(matches!(result, Err(DeviceError::Emit(_))));
        assert_eq!(device.last_buttons(), Some(ButtonMask(0x0001)));
        assert_eq!(factory.journal().batches().len(), 1);
    }
}
