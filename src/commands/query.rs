//! Device command handlers.

use super::{hex_dump, open_display, setup_interrupt_handler, CommandResult};
use anyhow::Context;
use holoplay_driver::DriverConfig;
use holoplay_transport::protocol::PAGE_SIZE;
use holoplay_transport::{HidApiBackend, HidBackend};
use std::io::Write;
use std::sync::atomic::Ordering;

/// List HID devices, marking the ones the selection policy accepts
pub fn list(config: &DriverConfig) -> CommandResult {
    let devices = HidApiBackend::new()
        .enumerate()
        .context("enumerating HID devices")?;

    let mut matched = 0;
    for d in &devices {
        let selected = config.device.matches(d);
        if selected {
            matched += 1;
        }
        println!(
            "{} {:04x}:{:04x}  {:<24} {:<12} {}",
            if selected { "*" } else { " " },
            d.vendor_id,
            d.product_id,
            d.manufacturer_string.as_deref().unwrap_or("-"),
            d.product_string.as_deref().unwrap_or("-"),
            d.path
        );
    }
    println!("\n{} device(s), {} matching", devices.len(), matched);
    Ok(())
}

/// Print the derived configuration
pub fn config(config: &DriverConfig) -> CommandResult {
    let display = open_display(config)?;
    println!("{}", serde_json::to_string_pretty(display.config())?);
    Ok(())
}

/// Print the calibration exactly as decoded from flash
pub fn calibration(config: &DriverConfig) -> CommandResult {
    let display = open_display(config)?;
    println!("{}", serde_json::to_string_pretty(display.calibration())?);
    Ok(())
}

/// Hex dump one flash page
pub fn dump_page(config: &DriverConfig, page: u16, len: usize) -> CommandResult {
    let display = open_display(config)?;
    let data = display
        .read_page(page, len)
        .with_context(|| format!("reading page {page}"))?;
    println!("{}", hex_dump(usize::from(page) * PAGE_SIZE, &data));
    Ok(())
}

/// Print the button mask every time an input report arrives
pub fn buttons(config: &DriverConfig) -> CommandResult {
    let display = open_display(config)?;
    let running = setup_interrupt_handler();

    println!("Reading buttons (Ctrl+C to stop):");
    let mut stdout = std::io::stdout();
    // A blocking poll only notices Ctrl+C once the next report arrives
    while running.load(Ordering::SeqCst) {
        let state = display.poll_buttons()?;
        let names: Vec<&str> = state.pressed().map(|b| b.name()).collect();
        write!(stdout, "\r{state}  {:<32}", names.join(" "))?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}
