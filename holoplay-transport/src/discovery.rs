//! Device discovery for HoloPlay displays

use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::hid::HidTransport;
use crate::types::{DeviceDescriptor, DeviceMatcher};
use crate::{BoxedTransport, HidBackend};

/// Enumerates and opens devices through hidapi
#[derive(Debug, Default)]
pub struct HidApiBackend;

impl HidApiBackend {
    pub fn new() -> Self {
        Self
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let api = HidApi::new()?;
        let devices: Vec<DeviceDescriptor> = api
            .device_list()
            .map(|d| DeviceDescriptor {
                vendor_id: d.vendor_id(),
                product_id: d.product_id(),
                manufacturer_string: d.manufacturer_string().map(str::to_string),
                product_string: d.product_string().map(str::to_string),
                path: d.path().to_string_lossy().to_string(),
                serial: d.serial_number().map(str::to_string),
            })
            .collect();
        debug!("Enumerated {} HID devices", devices.len());
        Ok(devices)
    }

    fn open(&self, device: &DeviceDescriptor) -> Result<BoxedTransport, TransportError> {
        let api = HidApi::new()?;
        let handle = api.open(device.vendor_id, device.product_id)?;
        info!(
            "Opened {:04X}:{:04X} at {}",
            device.vendor_id, device.product_id, device.path
        );
        Ok(Box::new(HidTransport::new(handle, device.clone())))
    }
}

/// Pick the first enumerated device accepted by `matcher`
pub fn select_device(
    backend: &dyn HidBackend,
    matcher: &DeviceMatcher,
) -> Result<DeviceDescriptor, TransportError> {
    let device = backend
        .enumerate()?
        .into_iter()
        .find(|d| matcher.matches(d))
        .ok_or_else(|| {
            TransportError::DeviceNotFound(format!(
                "no HID device with product \"{}\" or manufacturer \"{}\"",
                matcher.product, matcher.manufacturer
            ))
        })?;

    if !matcher.has_expected_ids(&device) {
        warn!(
            "Selected device reports {:04X}:{:04X}, expected {:04X}:{:04X}",
            device.vendor_id, device.product_id, matcher.vendor_id, matcher.product_id
        );
    }
    Ok(device)
}

/// Select and open the display in one step
pub fn open_matching(
    backend: &dyn HidBackend,
    matcher: &DeviceMatcher,
) -> Result<BoxedTransport, TransportError> {
    let device = select_device(backend, matcher)?;
    backend.open(&device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockTransport};

    fn descriptor(vid: u16, manufacturer: &str, product: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            vendor_id: vid,
            product_id: 0x0001,
            manufacturer_string: Some(manufacturer.into()),
            product_string: Some(product.into()),
            path: format!("/dev/hidraw-{vid:04x}"),
            serial: None,
        }
    }

    #[test]
    fn test_selects_product_match() {
        let backend = MockBackend::new(MockTransport::new())
            .with_device(descriptor(0x046d, "Logitech", "USB Receiver"))
            .with_device(descriptor(0x04d8, "Microchip", "HoloPlay"));
        let dev = select_device(&backend, &DeviceMatcher::default()).unwrap();
        assert_eq!(dev.vendor_id, 0x04d8);
    }

    #[test]
    fn test_selects_first_of_two_matches() {
        let backend = MockBackend::new(MockTransport::new())
            .with_device(descriptor(0x1111, "Looking Glass Factory", "LKG Portrait"))
            .with_device(descriptor(0x2222, "Microchip", "HoloPlay"));
        let dev = select_device(&backend, &DeviceMatcher::default()).unwrap();
        assert_eq!(dev.vendor_id, 0x1111);
    }

    #[test]
    fn test_no_match_does_not_open() {
        let backend = MockBackend::new(MockTransport::new())
            .with_device(descriptor(0x046d, "Logitech", "USB Receiver"));
        let result = open_matching(&backend, &DeviceMatcher::default());
        assert!(matches!(result, Err(TransportError::DeviceNotFound(_))));
        assert!(backend.opened().is_empty());
    }
}
