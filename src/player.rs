//! Media player launcher
//!
//! Runs mpv (or a compatible player) fullscreen on the display, with the
//! rendered quilt shader attached as a GLSL hook.

use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::display::ScreenGeometry;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Failed to write shader file: {0}")]
    ShaderFile(#[source] std::io::Error),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exited { program: String, status: ExitStatus },
}

/// `[player]` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player executable
    pub command: String,
    /// Arguments added before the ones given on the command line
    pub extra_args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Write rendered shader source to a `.glsl` temp file.
///
/// The file is removed when the handle is dropped, so keep it alive until the
/// player exits.
pub fn write_shader_file(source: &str) -> Result<NamedTempFile, PlayerError> {
    let mut file = tempfile::Builder::new()
        .prefix("holoplay-quilt-")
        .suffix(".glsl")
        .tempfile()
        .map_err(PlayerError::ShaderFile)?;
    file.write_all(source.as_bytes())
        .and_then(|_| file.flush())
        .map_err(PlayerError::ShaderFile)?;
    debug!("Shader written to {}", file.path().display());
    Ok(file)
}

/// A fully assembled player invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlayerCommand {
    /// Fullscreen on `screen`, shader hooked, aspect ratio left to the quilt,
    /// looping. `user_args` (files, seek options) go last.
    pub fn new(
        config: &PlayerConfig,
        screen: &ScreenGeometry,
        shader: &Path,
        user_args: &[String],
    ) -> Self {
        let mut args = vec![
            format!("--geometry={}", screen.geometry_arg()),
            "--fs".to_string(),
            format!("--glsl-shader={}", shader.display()),
            "--no-keepaspect".to_string(),
            "--loop-file".to_string(),
        ];
        args.extend(config.extra_args.iter().cloned());
        args.extend(user_args.iter().cloned());

        Self {
            program: config.command.clone(),
            args,
        }
    }

    /// Run the player and wait for it to exit
    pub fn run(&self) -> Result<(), PlayerError> {
        info!("Running {} {}", self.program, self.args.join(" "));
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| PlayerError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(PlayerError::Exited {
                program: self.program.clone(),
                status,
            })
        }
    }
}
