// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "holoplay_driver")]
#[command(author, version, about = "Looking Glass HoloPlay calibration and quilt driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/holoplay/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Device Queries ===
    /// List HID devices and whether each would be selected
    #[command(visible_alias = "ls")]
    List,

    /// Print the derived shader configuration as JSON
    #[command(visible_aliases = ["cfg", "c"])]
    Config,

    /// Print the raw calibration as stored on the device
    #[command(visible_alias = "cal")]
    Calibration,

    /// Hex dump of one flash page
    DumpPage {
        /// Page index (64 bytes per page)
        page: u16,
        /// Bytes to read from the page
        #[arg(short, long, default_value = "64")]
        len: usize,
    },

    /// Show the front-panel buttons as a live 4-bit mask
    #[command(visible_alias = "b")]
    Buttons,

    // === Display ===
    /// Locate the monitor that belongs to the display
    Screen,

    /// Render the quilt shader for this display
    Shader {
        /// Template file (default: built-in mpv shader)
        #[arg(short, long, value_name = "FILE")]
        template: Option<PathBuf>,
        /// Quilt columns
        #[arg(long)]
        tiles_x: Option<u32>,
        /// Quilt rows
        #[arg(long)]
        tiles_y: Option<u32>,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Play media fullscreen on the display through the quilt shader
    #[command(visible_alias = "mpv")]
    Play {
        /// Quilt columns
        #[arg(long)]
        tiles_x: Option<u32>,
        /// Quilt rows
        #[arg(long)]
        tiles_y: Option<u32>,
        /// Arguments passed through to the player (files, seek options)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}
