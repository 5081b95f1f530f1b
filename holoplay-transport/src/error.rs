//! Transport error types

use thiserror::Error;

/// I/O level failures on the HID handle
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

/// The device answered, but not with what the flash protocol expects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("No report echoing page {page} after {attempts} reads")]
    NoMatchingResponse { page: u16, attempts: usize },

    #[error("Echo mismatch for page {page}: expected {expected:02X?}, got {actual:02X?}")]
    EchoMismatch {
        page: u16,
        expected: [u8; 3],
        actual: Vec<u8>,
    },

    #[error("Short payload for page {page}: expected {expected} bytes, got {actual}")]
    ShortPayload {
        page: u16,
        expected: usize,
        actual: usize,
    },

    #[error("Page request of {requested} bytes exceeds the {max}-byte page size")]
    PageTooLarge { requested: usize, max: usize },

    #[error("Calibration store is uninitialized (length prefix 0xFFFFFFFF)")]
    Uninitialized,

    #[error("Calibration length {declared} exceeds the {max}-byte flash address space")]
    BlobTooLarge { declared: u32, max: usize },

    #[error("Input report was empty")]
    EmptyReport,
}

/// Failure of a single flash read or button poll
#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
