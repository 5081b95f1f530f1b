//! Protocol constants and report layouts for the HoloPlay HID interface

use zerocopy::byteorder::big_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Device identification defaults
pub mod device {
    /// Microchip vendor ID used by the display controller
    pub const VENDOR_ID: u16 = 0x04d8;
    pub const PRODUCT_ID: u16 = 0xef7e;
    pub const MANUFACTURER: &str = "Looking Glass Factory";
    pub const PRODUCT: &str = "HoloPlay";
}

/// Flash command bytes
pub mod cmd {
    /// Read one flash page
    pub const READ_PAGE: u8 = 0x00;
}

/// Report ID prepended to every feature report (the interface has none)
pub const REPORT_ID: u8 = 0x00;

/// Bytes per flash page and per report payload
pub const PAGE_SIZE: usize = 64;

/// Input report header: button mask, command echo, page echo (u16 BE)
pub const HEADER_SIZE: usize = 4;

/// Full input report: header + one page of payload
pub const INPUT_REPORT_SIZE: usize = HEADER_SIZE + PAGE_SIZE;

/// Feature report including the leading report ID
pub const FEATURE_REPORT_SIZE: usize = 1 + 3 + PAGE_SIZE;

/// Low nibble of the first input byte carries the buttons
pub const BUTTON_MASK: u8 = 0x0F;

/// Length of the calibration blob prefix (u32 BE)
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Length prefix of a flash store that was never written
pub const UNINITIALIZED_LENGTH: u32 = u32::MAX;

/// HID communication timing defaults
pub mod timing {
    /// Wait for the first report of a page response (ms)
    pub const FIRST_READ_TIMEOUT_MS: u32 = 1000;
    /// Wait for the tail of a split report (ms)
    pub const CONTINUATION_TIMEOUT_MS: u32 = 10;
    /// Per-read wait while draining stale input (ms)
    pub const FLUSH_TIMEOUT_MS: u32 = 100;
    /// Reads allowed before giving up on a page echo
    pub const MAX_ECHO_ATTEMPTS: usize = 16;
    /// Upper bound on reports discarded by one flush
    pub const MAX_FLUSH_REPORTS: usize = 256;
}

/// READ_PAGE feature report, 68 bytes on the wire.
///
/// `[report_id=0, command=0, page_hi, page_lo, 64 x 0]`. The device answers
/// with an input report whose bytes 1..4 repeat `command, page_hi, page_lo`.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ReadPageRequest {
    report_id: u8,
    command: u8,
    page: U16,
    _padding: [u8; PAGE_SIZE],
}

impl ReadPageRequest {
    pub fn new(page: u16) -> Self {
        Self {
            report_id: REPORT_ID,
            command: cmd::READ_PAGE,
            page: U16::new(page),
            _padding: [0; PAGE_SIZE],
        }
    }

    pub fn page(&self) -> u16 {
        self.page.get()
    }

    /// The three bytes the device must echo back at `report[1..4]`
    pub fn echo(&self) -> [u8; 3] {
        let [hi, lo] = self.page.get().to_be_bytes();
        [self.command, hi, lo]
    }
}

/// Echoed `(command, page_hi, page_lo)` of an input report, if it has a header
pub fn echoed_header(report: &[u8]) -> Option<[u8; 3]> {
    report
        .get(1..HEADER_SIZE)
        .map(|h| [h[0], h[1], h[2]])
}

/// Payload slice of an input report
pub fn payload(report: &[u8]) -> &[u8] {
    report.get(HEADER_SIZE..).unwrap_or(&[])
}
