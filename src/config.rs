//! Driver configuration
//!
//! Read from a TOML file, `~/.config/holoplay/config.toml` by default. Every
//! section and field is optional; anything left out takes the built-in
//! default, so an absent file behaves like an empty one.
//!
//! ```toml
//! [device]
//! manufacturer = "Looking Glass Factory"
//! product = "HoloPlay"
//!
//! [protocol]
//! max_echo_attempts = 32
//!
//! [shader]
//! tiles_x = 4
//! tiles_y = 8
//!
//! [player]
//! extra_args = ["--hwdec=auto"]
//!
//! [display]
//! width = 1536
//! height = 2048
//! x = 1920
//! y = 0
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use holoplay_device::{DeriveOptions, DeviceMatcher, ProtocolTiming, SessionOptions};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::display::ScreenGeometry;
use crate::player::PlayerConfig;

/// `[shader]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Sub-pixel index of the red channel
    pub red_index: i64,
    /// Sub-pixel index of the blue channel
    pub blue_index: i64,
    /// Quilt columns
    pub tiles_x: u32,
    /// Quilt rows
    pub tiles_y: u32,
    /// Template file used instead of the built-in mpv shader
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        let derive = DeriveOptions::default();
        Self {
            red_index: derive.red_index,
            blue_index: derive.blue_index,
            tiles_x: 5,
            tiles_y: 9,
            template: None,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub device: DeviceMatcher,
    pub protocol: ProtocolTiming,
    pub shader: ShaderConfig,
    pub player: PlayerConfig,
    /// Fixed display geometry; skips automatic lookup when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<ScreenGeometry>,
}

impl DriverConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("holoplay")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Options for opening a display session
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            device: self.device.clone(),
            protocol: self.protocol,
            derive: DeriveOptions {
                red_index: self.shader.red_index,
                blue_index: self.shader.blue_index,
            },
        }
    }
}
