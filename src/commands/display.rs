//! Display, shader and player command handlers.

use super::{open_display, CommandResult, MPV_QUILT_TEMPLATE};
use anyhow::Context;
use holoplay_device::{DerivedConfig, LookingGlass};
use holoplay_driver::player::write_shader_file;
use holoplay_driver::{
    platform_locator, quilt_parameters, render, DriverConfig, PlayerCommand, ScreenGeometry,
};
use std::path::{Path, PathBuf};
use tracing::info;

fn locate_screen(config: &DriverConfig, derived: &DerivedConfig) -> anyhow::Result<ScreenGeometry> {
    let (width, height) = derived.screen_size();
    let locator = platform_locator(config.display.as_ref())?;
    let screen = locator
        .locate(width, height)
        .context("locating the display among attached monitors")?;
    info!(
        "Display at {} ({})",
        screen.geometry_arg(),
        screen.connector.as_deref().unwrap_or("unknown connector")
    );
    Ok(screen)
}

/// Template text from `--template`, then `[shader] template`, then built-in
fn load_template(config: &DriverConfig, cli_template: Option<&Path>) -> anyhow::Result<String> {
    match cli_template.or(config.shader.template.as_deref()) {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading shader template {}", path.display())),
        None => Ok(MPV_QUILT_TEMPLATE.to_string()),
    }
}

fn render_for(
    config: &DriverConfig,
    display: &LookingGlass,
    template: &str,
    tiles_x: Option<u32>,
    tiles_y: Option<u32>,
) -> anyhow::Result<String> {
    let params = quilt_parameters(
        display.config(),
        tiles_x.unwrap_or(config.shader.tiles_x),
        tiles_y.unwrap_or(config.shader.tiles_y),
    );
    render(template, &params).context("rendering shader template")
}

/// Print the monitor geometry of the display
pub fn screen(config: &DriverConfig) -> CommandResult {
    let display = open_display(config)?;
    let screen = locate_screen(config, display.config())?;
    println!("{}", serde_json::to_string_pretty(&screen)?);
    Ok(())
}

/// Render the shader to stdout or a file
pub fn shader(
    config: &DriverConfig,
    template: Option<PathBuf>,
    tiles_x: Option<u32>,
    tiles_y: Option<u32>,
    output: Option<PathBuf>,
) -> CommandResult {
    let template = load_template(config, template.as_deref())?;
    let display = open_display(config)?;
    let source = render_for(config, &display, &template, tiles_x, tiles_y)?;

    match output {
        Some(path) => {
            std::fs::write(&path, source)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Shader written to {}", path.display());
        }
        None => print!("{source}"),
    }
    Ok(())
}

/// Run the player on the display with the quilt shader
pub fn play(
    config: &DriverConfig,
    tiles_x: Option<u32>,
    tiles_y: Option<u32>,
    args: &[String],
) -> CommandResult {
    let template = load_template(config, None)?;
    let display = open_display(config)?;
    let screen = locate_screen(config, display.config())?;
    let source = render_for(config, &display, &template, tiles_x, tiles_y)?;

    // Deleted on drop, so it must outlive the player
    let shader_file = write_shader_file(&source)?;
    PlayerCommand::new(&config.player, &screen, shader_file.path(), args).run()?;
    Ok(())
}
