//! Linux virtual gamepads via uinput.
//!
//! Each device is created through the `evdev` crate's uinput builder with the
//! fixed identity from the parent module and key capabilities for exactly the
//! eight pad buttons.
//!
//! # Atomic updates
//!
//! evdev consumers buffer events until they see `SYN_REPORT` and then apply
//! everything since the previous report at once.  [`VirtualDevice::emit`]
//! writes the eight key events and terminates them with that report, so a
//! reader never observes a half-applied mask.
//!
//! # Permissions
//!
//! Creating devices requires write access to `/dev/uinput` (root, or a udev
//! rule granting the daemon's group access).  Without it every creation
//! fails with a `Create` error and the daemon keeps retrying per packet.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, BusType, EventType, InputEvent, InputId, Key,
};
use gamepad_core::{Button, ButtonBatch, ButtonEvent, SenderId, BUTTON_MAP};

use super::{DEVICE_NAME, DEVICE_PRODUCT, DEVICE_VENDOR, DEVICE_VERSION};
use crate::application::device_registry::{DeviceError, DeviceFactory, InputDevice};

/// Linux key code for each logical button.
fn button_key(button: Button) -> Key {
    match button {
        Button::A => Key::BTN_SOUTH,
        Button::B => Key::BTN_EAST,
        Button::Select => Key::BTN_SELECT,
        Button::Start => Key::BTN_START,
        Button::Up => Key::BTN_DPAD_UP,
        Button::Down => Key::BTN_DPAD_DOWN,
        Button::Left => Key::BTN_DPAD_LEFT,
        Button::Right => Key::BTN_DPAD_RIGHT,
    }
}

/// Creates uinput-backed gamepads.
#[derive(Debug, Default, Clone, Copy)]
pub struct UinputDeviceFactory;

impl UinputDeviceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceFactory for UinputDeviceFactory {
    fn create(&self, sender: SenderId) -> Result<Box<dyn InputDevice>, DeviceError> {
        let create_err = move |e: std::io::Error| DeviceError::Create {
            sender,
            reason: e.to_string(),
        };

        let mut keys = AttributeSet::<Key>::new();
        for button in BUTTON_MAP {
            keys.insert(button_key(button));
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(create_err)?
            .name(DEVICE_NAME)
            .input_id(InputId::new(
                BusType::BUS_USB,
                DEVICE_VENDOR,
                DEVICE_PRODUCT,
                DEVICE_VERSION,
            ))
            .with_keys(&keys)
            .map_err(create_err)?
            .build()
            .map_err(create_err)?;

        Ok(Box::new(UinputDevice { device }))
    }
}

/// A live uinput device.  Dropping it closes `/dev/uinput`, which makes the
/// kernel destroy the device.
pub struct UinputDevice {
    device: VirtualDevice,
}

impl InputDevice for UinputDevice {
    fn emit(&mut self, batch: &ButtonBatch) -> Result<(), DeviceError> {
        let events: Vec<InputEvent> = batch
            .button_events()
            .iter()
            .filter_map(|event| match *event {
                ButtonEvent::Press(b) => Some(key_event(b, 1)),
                ButtonEvent::Release(b) => Some(key_event(b, 0)),
                // emit() appends SYN_REPORT itself.
                ButtonEvent::Sync => None,
            })
            .collect();

        self.device
            .emit(&events)
            .map_err(|e| DeviceError::Emit(e.to_string()))
    }

    fn release(self: Box<Self>) -> Result<(), DeviceError> {
        drop(self.device);
        Ok(())
    }
}

fn key_event(button: Button, value: i32) -> InputEvent {
    InputEvent::new(EventType::KEY, button_key(button).code(), value)
}
