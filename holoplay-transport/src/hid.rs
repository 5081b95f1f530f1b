//! hidapi-backed transport for the display's USB HID interface

use hidapi::HidDevice;
use tracing::trace;

use crate::error::TransportError;
use crate::types::{DeviceDescriptor, ReadTimeout};
use crate::Transport;

/// HID transport for the display's vendor interface.
///
/// Feature reports carry flash requests, input reports carry flash
/// responses and button state. Both share this one handle.
pub struct HidTransport {
    device: HidDevice,
    descriptor: DeviceDescriptor,
}

impl HidTransport {
    pub fn new(device: HidDevice, descriptor: DeviceDescriptor) -> Self {
        Self { device, descriptor }
    }
}

impl Transport for HidTransport {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        trace!("Feature report: {:02X?}", &data[..data.len().min(8)]);
        self.device.send_feature_report(data)?;
        Ok(())
    }

    fn read(&self, max_len: usize, timeout: ReadTimeout) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; max_len];
        let len = match timeout {
            ReadTimeout::Blocking => self.device.read(&mut buf)?,
            ReadTimeout::Millis(ms) => self
                .device
                .read_timeout(&mut buf, i32::try_from(ms).unwrap_or(i32::MAX))?,
        };
        buf.truncate(len);
        if len > 0 {
            trace!("Input report ({} bytes): {:02X?}", len, &buf[..len.min(8)]);
        }
        Ok(buf)
    }

    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }
}
