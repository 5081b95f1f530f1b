//! Display locator
//!
//! Maps the panel size from calibration to the geometry of an attached
//! monitor, so the player window can be placed on the display itself.
//! The strategy is picked once by [`platform_locator`].

use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Position and size of a monitor in the desktop coordinate space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// Output connector name, when the platform reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
}

impl ScreenGeometry {
    /// X11-style geometry string, `WxH+X+Y`
    pub fn geometry_arg(&self) -> String {
        format!("{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("No attached display is {width}x{height}")]
    NotFound { width: u32, height: u32 },

    #[error("Display lookup is not supported on {0}; set [display] in the config file")]
    Unsupported(&'static str),

    #[error("Failed to run {command}: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}")]
    CommandFailed { command: String, status: String },
}

/// Strategy for finding the display that matches a panel size
pub trait DisplayLocator {
    fn locate(&self, width: u32, height: u32) -> Result<ScreenGeometry, DisplayError>;
}

/// Geometry given in configuration
#[derive(Debug, Clone)]
pub struct FixedLocator {
    geometry: ScreenGeometry,
}

impl FixedLocator {
    pub fn new(geometry: ScreenGeometry) -> Self {
        Self { geometry }
    }
}

impl DisplayLocator for FixedLocator {
    fn locate(&self, width: u32, height: u32) -> Result<ScreenGeometry, DisplayError> {
        if (self.geometry.width, self.geometry.height) != (width, height) {
            warn!(
                "Configured display is {}x{}, calibration says {}x{}",
                self.geometry.width, self.geometry.height, width, height
            );
        }
        Ok(self.geometry.clone())
    }
}

/// X11 lookup through `xrandr --listactivemonitors`
#[derive(Debug, Clone)]
pub struct XrandrLocator {
    program: String,
}

impl Default for XrandrLocator {
    fn default() -> Self {
        Self {
            program: "xrandr".to_string(),
        }
    }
}

fn monitor_line() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // " 1: +HDMI-1 1536/107x2048/142+1920+0  HDMI-1"
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?m)^ (?P<screen>\d+): \S+ (?P<w>\d+)/\d+x(?P<h>\d+)/\d+\+(?P<x>\d+)\+(?P<y>\d+)\s+(?P<connector>\S+)",
        )
        .expect("monitor pattern is valid")
    })
}

/// Parse the monitor list printed by `xrandr --listactivemonitors`.
///
/// Lines that do not look like a monitor entry are skipped.
pub fn parse_monitors(output: &str) -> Vec<ScreenGeometry> {
    monitor_line()
        .captures_iter(output)
        .filter_map(|caps| {
            Some(ScreenGeometry {
                width: caps["w"].parse().ok()?,
                height: caps["h"].parse().ok()?,
                x: caps["x"].parse().ok()?,
                y: caps["y"].parse().ok()?,
                connector: Some(caps["connector"].to_string()),
            })
        })
        .collect()
}

impl XrandrLocator {
    /// Use a different executable, e.g. a wrapper script
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn monitors(&self) -> Result<Vec<ScreenGeometry>, DisplayError> {
        let command = format!("{} --listactivemonitors", self.program);
        let output = Command::new(&self.program)
            .arg("--listactivemonitors")
            .output()
            .map_err(|source| DisplayError::Command {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(DisplayError::CommandFailed {
                command,
                status: output.status.to_string(),
            });
        }

        let monitors = parse_monitors(&String::from_utf8_lossy(&output.stdout));
        debug!("xrandr reported {} monitor(s)", monitors.len());
        Ok(monitors)
    }
}

impl DisplayLocator for XrandrLocator {
    fn locate(&self, width: u32, height: u32) -> Result<ScreenGeometry, DisplayError> {
        // TODO: confirm the match against the monitor's EDID instead of size alone
        self.monitors()?
            .into_iter()
            .find(|m| m.width == width && m.height == height)
            .ok_or(DisplayError::NotFound { width, height })
    }
}

/// Pick the locator for this machine: configured geometry first, then the
/// native lookup.
pub fn platform_locator(
    configured: Option<&ScreenGeometry>,
) -> Result<Box<dyn DisplayLocator>, DisplayError> {
    if let Some(geometry) = configured {
        return Ok(Box::new(FixedLocator::new(geometry.clone())));
    }
    if cfg!(target_os = "linux") {
        Ok(Box::new(XrandrLocator::default()))
    } else {
        Err(DisplayError::Unsupported(std::env::consts::OS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Monitors: 2\n \
0: +*eDP-1 1920/344x1080/194+0+0  eDP-1\n \
1: +HDMI-1 1536/107x2048/142+1920+0  HDMI-1\n";

    #[test]
    fn test_parse_monitors() {
        let monitors = parse_monitors(LISTING);
        assert_eq!(monitors.len(), 2);
        assert_eq!(
            monitors[1],
            ScreenGeometry {
                width: 1536,
                height: 2048,
                x: 1920,
                y: 0,
                connector: Some("HDMI-1".into()),
            }
        );
        assert_eq!(monitors[0].connector.as_deref(), Some("eDP-1"));
    }

    #[test]
    fn test_parse_ignores_noise() {
        assert!(parse_monitors("").is_empty());
        assert!(parse_monitors("Monitors: 0\n").is_empty());
        assert!(parse_monitors("Can't open display\n").is_empty());
    }

    #[test]
    fn test_geometry_arg() {
        let g = ScreenGeometry {
            width: 2560,
            height: 1600,
            x: 1920,
            y: 40,
            connector: None,
        };
        assert_eq!(g.geometry_arg(), "2560x1600+1920+40");
    }

    #[test]
    fn test_fixed_locator_returns_configured() {
        let g = ScreenGeometry {
            width: 2560,
            height: 1600,
            x: 0,
            y: 0,
            connector: None,
        };
        let locator = FixedLocator::new(g.clone());
        assert_eq!(locator.locate(2560, 1600).unwrap(), g);
        // Size mismatch only warns
        assert_eq!(locator.locate(1536, 2048).unwrap(), g);
    }

    #[test]
    fn test_configured_geometry_wins() {
        let g = ScreenGeometry {
            width: 1536,
            height: 2048,
            x: 10,
            y: 20,
            connector: None,
        };
        let locator = platform_locator(Some(&g)).unwrap();
        assert_eq!(locator.locate(1536, 2048).unwrap(), g);
    }

    #[test]
    fn test_missing_program_is_command_error() {
        let locator = XrandrLocator::with_program("/nonexistent/xrandr-holoplay");
        assert!(matches!(
            locator.locate(1536, 2048),
            Err(DisplayError::Command { .. })
        ));
    }
}
