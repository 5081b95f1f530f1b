//! Device layer error types

use holoplay_transport::{ProtocolError, ReadError, TransportError};
use thiserror::Error;

/// The calibration blob could not be turned into a key/value map
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Calibration blob contains non-ASCII byte 0x{byte:02X} at offset {offset}")]
    NotAscii { offset: usize, byte: u8 },

    #[error("Calibration JSON is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The raw calibration does not support the shader parameter derivation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeriveError {
    #[error("Calibration is missing required field \"{0}\"")]
    MissingField(&'static str),

    #[error("Calibration field \"{0}\" is not numeric")]
    NotNumeric(&'static str),

    #[error("Cannot derive \"{output}\": {reason}")]
    Arithmetic {
        output: &'static str,
        reason: &'static str,
    },
}

/// Errors from display operations
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Flash protocol violation
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Derivation error: {0}")]
    Derive(#[from] DeriveError),
}

impl From<ReadError> for DeviceError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::Transport(e) => DeviceError::Transport(e),
            ReadError::Protocol(e) => DeviceError::Protocol(e),
        }
    }
}
