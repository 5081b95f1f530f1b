//! Device session
//!
//! Owns the single open handle to a display. Calibration is loaded and the
//! shader configuration derived once, at open. Every later operation (button
//! polls, ad-hoc page reads) takes the handle lock for its whole duration:
//! the flash protocol has no transaction IDs, so two interleaved callers would
//! consume each other's reports.

use holoplay_transport::{
    open_matching, poll_buttons, BoxedTransport, ButtonState, DeviceDescriptor, DeviceMatcher,
    HidBackend, PagedFlashReader, ProtocolTiming,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calibration::{self, RawCalibration};
use crate::derive::{derive, DeriveOptions, DerivedConfig};
use crate::error::DeviceError;

/// Everything needed to find and initialize a display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub device: DeviceMatcher,
    pub protocol: ProtocolTiming,
    pub derive: DeriveOptions,
}

/// An open display with its calibration
pub struct LookingGlass {
    transport: Mutex<BoxedTransport>,
    descriptor: DeviceDescriptor,
    timing: ProtocolTiming,
    calibration: RawCalibration,
    config: DerivedConfig,
}

impl LookingGlass {
    /// Find the display, open it and load its calibration
    pub fn open(backend: &dyn HidBackend, options: &SessionOptions) -> Result<Self, DeviceError> {
        let transport = open_matching(backend, &options.device)?;
        Self::from_transport(transport, options)
    }

    /// Initialize a session on an already open handle
    pub fn from_transport(
        transport: BoxedTransport,
        options: &SessionOptions,
    ) -> Result<Self, DeviceError> {
        let descriptor = transport.descriptor().clone();
        let calibration =
            calibration::load_calibration(&PagedFlashReader::new(transport.as_ref(), options.protocol))?;
        let config = derive(&calibration, &options.derive)?;
        let (w, h) = config.screen_size();
        info!(
            "Display {} ready: {}x{}, tilt {:.5}, pitch {:.5}",
            calibration.serial().unwrap_or("(no serial)"),
            w,
            h,
            config.tilt(),
            config.pitch()
        );

        Ok(Self {
            transport: Mutex::new(transport),
            descriptor,
            timing: options.protocol,
            calibration,
            config,
        })
    }

    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Calibration as read from flash
    pub fn calibration(&self) -> &RawCalibration {
        &self.calibration
    }

    /// Shader configuration derived at open
    pub fn config(&self) -> &DerivedConfig {
        &self.config
    }

    /// Block until the next input report and return the button mask
    pub fn poll_buttons(&self) -> Result<ButtonState, DeviceError> {
        let transport = self.transport.lock();
        Ok(poll_buttons(&**transport)?)
    }

    /// Read one flash page, flushing stale input first
    pub fn read_page(&self, page: u16, byte_count: usize) -> Result<Vec<u8>, DeviceError> {
        let transport = self.transport.lock();
        let reader = PagedFlashReader::new(&**transport, self.timing);
        reader.flush()?;
        Ok(reader.read_page(page, byte_count)?)
    }

    /// Re-read the whole calibration blob, length prefix included.
    ///
    /// The derived configuration is not touched.
    pub fn read_calibration_blob(&self) -> Result<Vec<u8>, DeviceError> {
        let transport = self.transport.lock();
        calibration::read_blob(&PagedFlashReader::new(&**transport, self.timing))
    }
}
