//! Transport layer for Looking Glass HoloPlay displays
//!
//! The display exposes a single vendor HID interface. Calibration lives in a
//! small flash store that is read one 64-byte page at a time through feature
//! reports, and the four front-panel buttons are reported in the first byte of
//! every input report.
//!
//! ```text
//! [HidApiBackend / MockBackend]   ← enumerate + open
//!            |
//!      [dyn Transport]            ← raw feature writes / input reads
//!        |         |
//! [PagedFlashReader] [poll_buttons]
//! ```

pub mod buttons;
pub mod error;
pub mod flash;
pub mod mock;
pub mod protocol;
pub mod types;

mod discovery;
mod hid;

pub use buttons::{poll_buttons, Button, ButtonState};
pub use discovery::{open_matching, select_device, HidApiBackend};
pub use error::{ProtocolError, ReadError, TransportError};
pub use flash::{PagedFlashReader, ProtocolTiming};
pub use hid::HidTransport;
pub use types::{DeviceDescriptor, DeviceMatcher, ReadTimeout};

/// Raw report I/O on an open device handle.
///
/// Implementations do not correlate requests with responses; that is the job
/// of [`PagedFlashReader`]. Callers sharing one handle must serialize access
/// themselves, the protocol has no transaction IDs.
pub trait Transport: Send {
    /// Send a feature report. `data[0]` is the report ID.
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Read one input report of at most `max_len` bytes.
    ///
    /// Returns an empty buffer when the timeout expires without data.
    fn read(&self, max_len: usize, timeout: ReadTimeout) -> Result<Vec<u8>, TransportError>;

    /// Descriptor of the device this handle was opened from
    fn descriptor(&self) -> &DeviceDescriptor;
}

/// Device enumeration and opening
pub trait HidBackend {
    /// List every HID device visible to the process
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open a previously enumerated device
    fn open(&self, device: &DeviceDescriptor) -> Result<BoxedTransport, TransportError>;
}

/// Type alias for a boxed transport
pub type BoxedTransport = Box<dyn Transport>;
