//! High-level interface for Looking Glass HoloPlay displays
//!
//! Loads the factory calibration over the transport layer and derives the
//! parameters a lenticular quilt shader needs.

pub mod calibration;
pub mod derive;
pub mod error;
pub mod session;

pub use calibration::{load_calibration, RawCalibration, RawValue, Scalar};
pub use derive::{derive, DeriveOptions, DerivedConfig};
pub use error::{CalibrationError, DeriveError, DeviceError};
pub use session::{LookingGlass, SessionOptions};

// Re-export for consumers that only depend on this crate
pub use holoplay_transport::{Button, ButtonState, DeviceDescriptor, DeviceMatcher, ProtocolTiming};
