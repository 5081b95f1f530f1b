//! Shader parameter derivation
//!
//! Turns the raw calibration into the constants the quilt shader consumes:
//!
//! ```text
//! tilt  = screenH / (screenW * slope)
//! pitch = -(screenW / DPI) * pitch * sin(atan(slope))
//! subp  = 1 / (3 * screenW)
//! ri, bi: sub-pixel channel indices, configured rather than measured
//! ```
//!
//! `pitch` is overwritten in place; the output has no raw pitch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calibration::{RawCalibration, Scalar};
use crate::error::DeriveError;

/// Parameter names shared by the calibration and the shader
pub mod keys {
    pub const SCREEN_W: &str = "screenW";
    pub const SCREEN_H: &str = "screenH";
    pub const SLOPE: &str = "slope";
    pub const DPI: &str = "DPI";
    pub const PITCH: &str = "pitch";
    pub const CENTER: &str = "center";
    pub const TILT: &str = "tilt";
    pub const SUBP: &str = "subp";
    pub const RI: &str = "ri";
    pub const BI: &str = "bi";
}

/// Inputs that must be present and numeric
pub const REQUIRED_KEYS: [&str; 6] = [
    keys::SCREEN_W,
    keys::SCREEN_H,
    keys::SLOPE,
    keys::DPI,
    keys::PITCH,
    keys::CENTER,
];

/// Red/blue sub-pixel indices.
///
/// The vendor SDK normally supplies these per device; the defaults match an
/// RGB stripe panel and are an approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveOptions {
    pub red_index: i64,
    pub blue_index: i64,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            red_index: 0,
            blue_index: 2,
        }
    }
}

/// Shader-ready configuration: unwrapped calibration plus derived values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DerivedConfig {
    values: BTreeMap<String, Scalar>,
}

impl DerivedConfig {
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.values.get(key)
    }

    fn number(&self, key: &str) -> f64 {
        // Every key read through here was validated or written by `derive`
        self.values.get(key).and_then(Scalar::as_f64).unwrap_or(f64::NAN)
    }

    pub fn screen_width(&self) -> f64 {
        self.number(keys::SCREEN_W)
    }

    pub fn screen_height(&self) -> f64 {
        self.number(keys::SCREEN_H)
    }

    pub fn tilt(&self) -> f64 {
        self.number(keys::TILT)
    }

    pub fn pitch(&self) -> f64 {
        self.number(keys::PITCH)
    }

    pub fn center(&self) -> f64 {
        self.number(keys::CENTER)
    }

    pub fn subp(&self) -> f64 {
        self.number(keys::SUBP)
    }

    /// Screen size in whole pixels
    pub fn screen_size(&self) -> (u32, u32) {
        (
            self.screen_width().round() as u32,
            self.screen_height().round() as u32,
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parameter map for template substitution: this configuration plus `extra`.
    ///
    /// Extra keys override configuration keys of the same name.
    pub fn shader_parameters<I, K>(&self, extra: I) -> BTreeMap<String, Scalar>
    where
        I: IntoIterator<Item = (K, Scalar)>,
        K: Into<String>,
    {
        let mut params = self.values.clone();
        params.extend(extra.into_iter().map(|(k, v)| (k.into(), v)));
        params
    }
}

fn required(values: &BTreeMap<String, Scalar>, key: &'static str) -> Result<f64, DeriveError> {
    values
        .get(key)
        .ok_or(DeriveError::MissingField(key))?
        .as_f64()
        .ok_or(DeriveError::NotNumeric(key))
}

/// Derive the shader configuration from raw calibration
pub fn derive(raw: &RawCalibration, options: &DeriveOptions) -> Result<DerivedConfig, DeriveError> {
    let mut values = raw.unwrapped();

    let screen_w = required(&values, keys::SCREEN_W)?;
    let screen_h = required(&values, keys::SCREEN_H)?;
    let slope = required(&values, keys::SLOPE)?;
    let dpi = required(&values, keys::DPI)?;
    let pitch = required(&values, keys::PITCH)?;
    // Not used in the math, but the shader reads it
    required(&values, keys::CENTER)?;

    if screen_w == 0.0 {
        return Err(DeriveError::Arithmetic {
            output: keys::SUBP,
            reason: "screenW is zero",
        });
    }
    if dpi == 0.0 {
        return Err(DeriveError::Arithmetic {
            output: keys::PITCH,
            reason: "DPI is zero",
        });
    }
    if slope == 0.0 {
        return Err(DeriveError::Arithmetic {
            output: keys::TILT,
            reason: "slope is zero",
        });
    }

    let tilt = screen_h / (screen_w * slope);
    let pitch = -(screen_w / dpi) * pitch * slope.atan().sin();
    let subp = 1.0 / (3.0 * screen_w);

    values.insert(keys::TILT.into(), Scalar::Number(tilt));
    values.insert(keys::PITCH.into(), Scalar::Number(pitch));
    values.insert(keys::SUBP.into(), Scalar::Number(subp));
    values.insert(keys::RI.into(), Scalar::Integer(options.red_index));
    values.insert(keys::BI.into(), Scalar::Integer(options.blue_index));

    Ok(DerivedConfig { values })
}
