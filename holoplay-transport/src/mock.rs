//! Scripted transport for tests
//!
//! `MockTransport` serves queued input reports in order and records every
//! feature report written. It can also act as a flash image: each READ_PAGE
//! request then queues the matching page response, behind anything already
//! queued, so stale reports can be injected ahead of the real answer.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::protocol::{cmd, BUTTON_MASK, FEATURE_REPORT_SIZE, HEADER_SIZE, PAGE_SIZE};
use crate::types::{DeviceDescriptor, DeviceMatcher, ReadTimeout};
use crate::{BoxedTransport, HidBackend, Transport};

/// Build a full 68-byte page response
pub fn page_report(page: u16, buttons: u8, payload: &[u8]) -> Vec<u8> {
    let [hi, lo] = page.to_be_bytes();
    let mut report = vec![buttons & BUTTON_MASK, cmd::READ_PAGE, hi, lo];
    report.extend_from_slice(&payload[..payload.len().min(PAGE_SIZE)]);
    report.resize(HEADER_SIZE + PAGE_SIZE, 0);
    report
}

/// Build a calibration flash image: u32 BE length prefix followed by `json`
pub fn calibration_image(json: &str) -> Vec<u8> {
    let mut image = (json.len() as u32).to_be_bytes().to_vec();
    image.extend_from_slice(json.as_bytes());
    image
}

#[derive(Default)]
struct MockState {
    reads: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    read_calls: Vec<(usize, ReadTimeout)>,
    flash: Option<Vec<u8>>,
    disconnected: bool,
}

/// In-memory transport; clones share state
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    descriptor: DeviceDescriptor,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        let matcher = DeviceMatcher::default();
        Self {
            state: Arc::new(Mutex::new(MockState::default())),
            descriptor: DeviceDescriptor {
                vendor_id: matcher.vendor_id,
                product_id: matcher.product_id,
                manufacturer_string: Some(matcher.manufacturer),
                product_string: Some(matcher.product),
                path: "mock://holoplay".into(),
                serial: Some("LKG-MOCK-0001".into()),
            },
        }
    }

    /// Answer READ_PAGE requests from this flash image
    pub fn with_flash(self, image: Vec<u8>) -> Self {
        self.state.lock().flash = Some(image);
        self
    }

    /// Queue a raw input report
    pub fn queue_read(&self, data: Vec<u8>) {
        self.state.lock().reads.push_back(data);
    }

    /// Feature reports written so far
    pub fn write_history(&self) -> Vec<Vec<u8>> {
        self.state.lock().writes.clone()
    }

    /// Pages requested so far, decoded from the write history
    pub fn requested_pages(&self) -> Vec<u16> {
        self.state
            .lock()
            .writes
            .iter()
            .filter(|w| w.len() >= 4 && w[1] == cmd::READ_PAGE)
            .map(|w| u16::from_be_bytes([w[2], w[3]]))
            .collect()
    }

    /// `(max_len, timeout)` of every read call
    pub fn read_calls(&self) -> Vec<(usize, ReadTimeout)> {
        self.state.lock().read_calls.clone()
    }

    pub fn pending_reads(&self) -> usize {
        self.state.lock().reads.len()
    }

    pub fn disconnect(&self) {
        self.state.lock().disconnected = true;
    }
}

impl Transport for MockTransport {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.disconnected {
            return Err(TransportError::Disconnected);
        }
        state.writes.push(data.to_vec());

        if data.len() == FEATURE_REPORT_SIZE && data[1] == cmd::READ_PAGE {
            let page = u16::from_be_bytes([data[2], data[3]]);
            let response = state.flash.as_ref().map(|image| {
                let start = (page as usize * PAGE_SIZE).min(image.len());
                let end = (start + PAGE_SIZE).min(image.len());
                page_report(page, 0, &image[start..end])
            });
            if let Some(report) = response {
                state.reads.push_back(report);
            }
        }
        Ok(())
    }

    fn read(&self, max_len: usize, timeout: ReadTimeout) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        if state.disconnected {
            return Err(TransportError::Disconnected);
        }
        state.read_calls.push((max_len, timeout));
        let mut report = state.reads.pop_front().unwrap_or_default();
        report.truncate(max_len);
        Ok(report)
    }

    fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }
}

/// Backend listing fixed descriptors; every `open` hands out a clone of one transport
pub struct MockBackend {
    devices: Vec<DeviceDescriptor>,
    transport: MockTransport,
    opened: Mutex<Vec<DeviceDescriptor>>,
}

impl MockBackend {
    pub fn new(transport: MockTransport) -> Self {
        Self {
            devices: Vec::new(),
            transport,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn with_device(mut self, device: DeviceDescriptor) -> Self {
        self.devices.push(device);
        self
    }

    /// Descriptors passed to `open`, in call order
    pub fn opened(&self) -> Vec<DeviceDescriptor> {
        self.opened.lock().clone()
    }
}

impl HidBackend for MockBackend {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        Ok(self.devices.clone())
    }

    fn open(&self, device: &DeviceDescriptor) -> Result<BoxedTransport, TransportError> {
        self.opened.lock().push(device.clone());
        Ok(Box::new(self.transport.clone()))
    }
}
