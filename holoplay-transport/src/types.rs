//! Common types for transport layer

use serde::{Deserialize, Serialize};

use crate::protocol::device;

/// Identification of an enumerated HID device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// USB Vendor ID
    pub vendor_id: u16,
    /// USB Product ID
    pub product_id: u16,
    /// Manufacturer string if the device reports one
    pub manufacturer_string: Option<String>,
    /// Product string if the device reports one
    pub product_string: Option<String>,
    /// Platform device path
    pub path: String,
    /// Serial number if available
    pub serial: Option<String>,
}

/// Selection policy for the display's HID interface.
///
/// A device is accepted when its product string equals `product` **or** its
/// manufacturer string equals `manufacturer`. The IDs are only used to flag
/// devices that matched by name but report unexpected IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceMatcher {
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: String,
    pub product: String,
}

impl Default for DeviceMatcher {
    fn default() -> Self {
        Self {
            vendor_id: device::VENDOR_ID,
            product_id: device::PRODUCT_ID,
            manufacturer: device::MANUFACTURER.to_string(),
            product: device::PRODUCT.to_string(),
        }
    }
}

impl DeviceMatcher {
    /// Check a descriptor against the selection policy
    pub fn matches(&self, device: &DeviceDescriptor) -> bool {
        device.product_string.as_deref() == Some(self.product.as_str())
            || device.manufacturer_string.as_deref() == Some(self.manufacturer.as_str())
    }

    /// Whether the descriptor carries the expected vendor/product IDs
    pub fn has_expected_ids(&self, device: &DeviceDescriptor) -> bool {
        device.vendor_id == self.vendor_id && device.product_id == self.product_id
    }
}

/// How long a read may wait for an input report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadTimeout {
    /// Wait until a report arrives
    Blocking,
    /// Wait at most this many milliseconds (0 = non-blocking)
    Millis(u32),
}

impl ReadTimeout {
    /// Return immediately if nothing is queued
    pub const NON_BLOCKING: ReadTimeout = ReadTimeout::Millis(0);
}
