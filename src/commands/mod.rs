//! Command handlers for the CLI application.
//!
//! - `query`: device commands (list, config, calibration, dump-page, buttons)
//! - `display`: host-side commands (screen, shader, play)

pub mod display;
pub mod query;

use anyhow::Context;
use holoplay_device::LookingGlass;
use holoplay_driver::DriverConfig;
use holoplay_transport::HidApiBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Built-in mpv quilt shader template
pub const MPV_QUILT_TEMPLATE: &str = include_str!("../../shaders/mpv_quilt.glsl");

/// Find the display, open it and load its calibration
pub fn open_display(config: &DriverConfig) -> anyhow::Result<LookingGlass> {
    LookingGlass::open(&HidApiBackend::new(), &config.session_options())
        .context("opening Looking Glass display")
}

/// Setup Ctrl+C handler and return the running flag
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}

/// Hex dump in 16-byte rows with an offset column
pub fn hex_dump(base: usize, data: &[u8]) -> String {
    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
            let ascii: String = chunk
                .iter()
                .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
                .collect();
            format!("{:08x}  {:<47}  |{}|", base + row * 16, hex.join(" "), ascii)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
