//! Virtual input device backends.
//!
//! Every device the daemon creates has the same identity, so that games and
//! udev rules can match them regardless of which remote pad they represent.

pub mod mock;

#[cfg(target_os = "linux")]
pub mod linux;

/// Human-readable device name shown by `evtest` and game controller settings.
pub const DEVICE_NAME: &str = "Duge's gamepad";

/// USB vendor id reported by every virtual device.
pub const DEVICE_VENDOR: u16 = 0x7777;

/// USB product id reported by every virtual device.
pub const DEVICE_PRODUCT: u16 = 0x7777;

/// Device version reported alongside the vendor and product ids.
pub const DEVICE_VERSION: u16 = 1;
