//! Calibration blob loading
//!
//! Flash layout: a u32 big-endian length `L` at page 0 offset 0, then `L`
//! bytes of ASCII JSON. The blob is read page by page until `L + 4` bytes are
//! assembled. Values in the JSON object appear either bare (`"serial": "..."`)
//! or wrapped (`"pitch": {"value": 47.56}`); both forms are kept as read and
//! unwrapped later by the derivation.

use std::collections::BTreeMap;
use std::fmt;

use holoplay_transport::protocol::{LENGTH_PREFIX_SIZE, PAGE_SIZE, UNINITIALIZED_LENGTH};
use holoplay_transport::{PagedFlashReader, ProtocolError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CalibrationError, DeviceError};

/// Everything addressable with a 16-bit page index
const MAX_BLOB_SIZE: usize = (u16::MAX as usize + 1) * PAGE_SIZE;

/// A single calibration value after unwrapping.
///
/// Integer is tried before Number so `2560` and `2560.0` stay distinguishable;
/// anything that is neither a number, bool nor string is carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Number(f64),
    Flag(bool),
    Text(String),
    Other(serde_json::Value),
}

impl Scalar {
    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{i}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Flag(b) => write!(f, "{b}"),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Integer(v)
    }
}

/// A calibration entry as stored on the device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// `{"value": x, ...}`; sibling keys are ignored
    Envelope { value: Scalar },
    Bare(Scalar),
}

impl RawValue {
    pub fn unwrap_value(&self) -> &Scalar {
        match self {
            RawValue::Envelope { value } => value,
            RawValue::Bare(value) => value,
        }
    }
}

/// Key/value map decoded from the calibration blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCalibration(BTreeMap<String, RawValue>);

impl RawCalibration {
    pub fn new(entries: BTreeMap<String, RawValue>) -> Self {
        Self(entries)
    }

    /// Decode the JSON text that follows the length prefix
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, CalibrationError> {
        if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
            return Err(CalibrationError::NotAscii {
                offset,
                byte: bytes[offset],
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every entry with envelopes replaced by their `value`
    pub fn unwrapped(&self) -> BTreeMap<String, Scalar> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.unwrap_value().clone()))
            .collect()
    }

    /// Device serial, when the calibration carries one
    pub fn serial(&self) -> Option<&str> {
        self.get("serial").and_then(|v| v.unwrap_value().as_str())
    }
}

/// Read the raw calibration blob (length prefix included) from flash.
///
/// Flushes stale input first. Fails with [`ProtocolError::Uninitialized`]
/// after the first page read if the store was never written.
pub fn read_blob(reader: &PagedFlashReader<'_>) -> Result<Vec<u8>, DeviceError> {
    reader.flush()?;

    let prefix = reader.read_page(0, LENGTH_PREFIX_SIZE)?;
    let declared = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    if declared == UNINITIALIZED_LENGTH {
        return Err(ProtocolError::Uninitialized.into());
    }

    let total = declared as usize + LENGTH_PREFIX_SIZE;
    if total > MAX_BLOB_SIZE {
        return Err(ProtocolError::BlobTooLarge {
            declared,
            max: MAX_BLOB_SIZE,
        }
        .into());
    }
    debug!("Calibration blob: {} bytes across {} pages", total, total.div_ceil(PAGE_SIZE));

    let mut data = Vec::with_capacity(total);
    while data.len() < total {
        let page = data.len() / PAGE_SIZE;
        let offset = page * PAGE_SIZE;
        let len = PAGE_SIZE.min(total - offset);
        // total <= MAX_BLOB_SIZE keeps page within u16
        let chunk = reader.read_page(page as u16, len)?;
        data.truncate(offset);
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Load and decode the calibration map
pub fn load_calibration(reader: &PagedFlashReader<'_>) -> Result<RawCalibration, DeviceError> {
    let blob = read_blob(reader)?;
    let calibration = RawCalibration::from_json_bytes(&blob[LENGTH_PREFIX_SIZE..])?;
    info!(
        "Loaded calibration: {} fields, serial {}",
        calibration.len(),
        calibration.serial().unwrap_or("unknown")
    );
    Ok(calibration)
}
