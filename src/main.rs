//! Looking Glass HoloPlay Driver CLI
//!
//! Reads the display's calibration, renders the quilt shader for it and
//! launches a player on the display.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use holoplay_driver::DriverConfig;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config_path = cli.config.unwrap_or_else(DriverConfig::default_path);
    debug!("Loading config from {:?}", config_path);
    let config = DriverConfig::load(&config_path)?;

    match cli.command {
        // Default: show the derived configuration
        None | Some(Commands::Config) => commands::query::config(&config),

        // === Device Queries ===
        Some(Commands::List) => commands::query::list(&config),
        Some(Commands::Calibration) => commands::query::calibration(&config),
        Some(Commands::DumpPage { page, len }) => commands::query::dump_page(&config, page, len),
        Some(Commands::Buttons) => commands::query::buttons(&config),

        // === Display ===
        Some(Commands::Screen) => commands::display::screen(&config),
        Some(Commands::Shader {
            template,
            tiles_x,
            tiles_y,
            output,
        }) => commands::display::shader(&config, template, tiles_x, tiles_y, output),
        Some(Commands::Play {
            tiles_x,
            tiles_y,
            args,
        }) => commands::display::play(&config, tiles_x, tiles_y, &args),
    }
}
