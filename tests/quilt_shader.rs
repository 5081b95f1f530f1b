//! End-to-end: calibration from a mock display through to the rendered mpv
//! shader and player command line.

use std::path::Path;

use approx::assert_relative_eq;
use holoplay_device::LookingGlass;
use holoplay_driver::{
    platform_locator, quilt_parameters, render, DriverConfig, PlayerCommand, TemplateError,
};
use holoplay_transport::mock::{calibration_image, MockBackend, MockTransport};
use holoplay_transport::DeviceDescriptor;

const TEMPLATE: &str = include_str!("../shaders/mpv_quilt.glsl");

const CALIBRATION: &str = r#"{"serial":"LKG-2K-05123","pitch":{"value":47.56},"slope":{"value":5.0},"center":{"value":0.5},"DPI":{"value":338.0},"screenW":{"value":2560.0},"screenH":{"value":1600.0},"viewCone":{"value":40.0}}"#;

fn open(config: &DriverConfig) -> LookingGlass {
    let mock = MockTransport::new().with_flash(calibration_image(CALIBRATION));
    let backend = MockBackend::new(mock).with_device(DeviceDescriptor {
        vendor_id: 0x04d8,
        product_id: 0xef7e,
        manufacturer_string: Some("Looking Glass Factory".into()),
        product_string: Some("HoloPlay".into()),
        path: "/dev/hidraw0".into(),
        serial: None,
    });
    LookingGlass::open(&backend, &config.session_options()).unwrap()
}

/// Value of `const <ty> <name> = <value>;` in rendered GLSL
fn constant<'a>(source: &'a str, name: &str) -> &'a str {
    source
        .lines()
        .find_map(|line| {
            let (lhs, rhs) = line.split_once(" = ")?;
            lhs.ends_with(&format!(" {name}"))
                .then(|| rhs.trim_end_matches(';'))
        })
        .unwrap_or_else(|| panic!("no constant {name}"))
}

#[test]
fn built_in_template_renders_for_display() {
    let config = DriverConfig::default();
    let display = open(&config);
    let params = quilt_parameters(display.config(), 5, 9);
    let source = render(TEMPLATE, &params).unwrap();

    assert!(source.contains("//!WIDTH 2560.0\n"));
    assert!(source.contains("//!HEIGHT 1600.0\n"));
    assert!(source.contains("const float tilt = -1.0 * 0.125;"));
    assert!(source.contains("const vec2 tiles = vec2(5, 9);"));
    assert_eq!(constant(&source, "ri"), "0");
    assert_eq!(constant(&source, "bi"), "2");

    let pitch: f64 = constant(&source, "pitch").parse().unwrap();
    assert_relative_eq!(pitch, -(2560.0 / 338.0) * 47.56 * 5.0f64.atan().sin());

    // Escaped braces come out single, and nothing is left unsubstituted
    assert!(source.contains("vec4 hook() {\n"));
    assert!(!source.contains("{{"));
    assert!(!source.contains("{tilesX}"));
}

#[test]
fn configured_channels_and_tiles_reach_shader() {
    let config = DriverConfig::from_toml(
        r#"
        [shader]
        red_index = 2
        blue_index = 0
        tiles_x = 4
        tiles_y = 8
        "#,
    )
    .unwrap();
    let display = open(&config);
    let params = quilt_parameters(
        display.config(),
        config.shader.tiles_x,
        config.shader.tiles_y,
    );
    let source = render(TEMPLATE, &params).unwrap();

    assert_eq!(constant(&source, "ri"), "2");
    assert_eq!(constant(&source, "bi"), "0");
    assert!(source.contains("vec2(4, 8)"));
}

#[test]
fn template_without_tiles_is_rejected() {
    let display = open(&DriverConfig::default());
    let err = render(TEMPLATE, &display.config().shader_parameters(Vec::<(String, _)>::new()))
        .unwrap_err();
    assert!(matches!(err, TemplateError::UnknownKey { ref name, .. } if name == "tilesX"));
}

#[test]
fn player_targets_configured_display() {
    let config = DriverConfig::from_toml(
        r#"
        [player]
        extra_args = ["--hwdec=auto"]

        [display]
        width = 2560
        height = 1600
        x = 1920
        y = 0
        "#,
    )
    .unwrap();
    let display = open(&config);
    let (w, h) = display.config().screen_size();

    let screen = platform_locator(config.display.as_ref())
        .unwrap()
        .locate(w, h)
        .unwrap();
    let cmd = PlayerCommand::new(
        &config.player,
        &screen,
        Path::new("/tmp/quilt.glsl"),
        &["holo.mp4".to_string()],
    );

    assert_eq!(cmd.program, "mpv");
    assert_eq!(
        cmd.args,
        vec![
            "--geometry=2560x1600+1920+0",
            "--fs",
            "--glsl-shader=/tmp/quilt.glsl",
            "--no-keepaspect",
            "--loop-file",
            "--hwdec=auto",
            "holo.mp4",
        ]
    );
}
