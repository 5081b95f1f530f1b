//! HoloPlay display driver
//!
//! Host-side pieces around the device crates: configuration, finding the
//! display among the attached monitors, rendering the quilt shader and
//! launching a player on the display.

pub mod config;
pub mod display;
pub mod player;
pub mod shader;

pub use config::{DriverConfig, ShaderConfig};
pub use display::{platform_locator, DisplayError, DisplayLocator, ScreenGeometry};
pub use player::{PlayerCommand, PlayerConfig, PlayerError};
pub use shader::{quilt_parameters, render, TemplateError};
