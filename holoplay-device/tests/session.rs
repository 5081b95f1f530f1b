//! Integration tests for calibration loading and the device session.
//!
//! The mock transport serves a flash image the same way the display does, so
//! these exercise the full path: selection → open → flush → paged read →
//! JSON decode → derivation.

use std::collections::BTreeSet;

use approx::assert_relative_eq;
use holoplay_device::{
    load_calibration, DeviceError, LookingGlass, Scalar, SessionOptions,
};
use holoplay_transport::mock::{calibration_image, page_report, MockBackend, MockTransport};
use holoplay_transport::{
    DeviceDescriptor, HidApiBackend, PagedFlashReader, ProtocolError, ProtocolTiming, TransportError,
};

/// Calibration as stored by the factory: mostly envelopes, a few bare values
const PORTRAIT_JSON: &str = r#"{"configVersion":"1.0","serial":"LKG-P01234","pitch":{"value":52.58},"slope":{"value":-7.06},"center":{"value":0.13},"viewCone":{"value":40.0},"invView":{"value":1.0},"verticalAngle":{"value":0.0},"DPI":{"value":324.0},"screenW":{"value":1536.0},"screenH":{"value":2048.0},"flipImageX":{"value":0.0},"flipImageY":{"value":0.0},"flipSubp":{"value":0.0}}"#;

fn descriptor(manufacturer: &str, product: &str) -> DeviceDescriptor {
    DeviceDescriptor {
        vendor_id: 0x04d8,
        product_id: 0xef7e,
        manufacturer_string: Some(manufacturer.into()),
        product_string: Some(product.into()),
        path: "/dev/hidraw3".into(),
        serial: None,
    }
}

// ── calibration assembly ──

#[test]
fn blob_length_matches_prefix_and_keys_round_trip() {
    let mock = MockTransport::new().with_flash(calibration_image(PORTRAIT_JSON));
    let reader = PagedFlashReader::new(&mock, ProtocolTiming::default());

    let blob = holoplay_device::calibration::read_blob(&reader).unwrap();
    assert_eq!(blob.len(), PORTRAIT_JSON.len() + 4);

    let cal = load_calibration(&reader).unwrap();
    let keys: BTreeSet<&str> = cal.keys().collect();
    let expected: BTreeSet<&str> = [
        "configVersion", "serial", "pitch", "slope", "center", "viewCone", "invView",
        "verticalAngle", "DPI", "screenW", "screenH", "flipImageX", "flipImageY", "flipSubp",
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);
}

#[test]
fn pages_requested_in_order_with_partial_last_page() {
    // 4 + 150 = 154 bytes: page 0 prefix, then pages 0, 1, 2 (26 bytes)
    let json = format!(r#"{{"note":"{}"}}"#, "x".repeat(150 - 11));
    assert_eq!(json.len(), 150);
    let mock = MockTransport::new().with_flash(calibration_image(&json));
    let reader = PagedFlashReader::new(&mock, ProtocolTiming::default());

    let blob = holoplay_device::calibration::read_blob(&reader).unwrap();
    assert_eq!(blob.len(), 154);
    assert_eq!(mock.requested_pages(), vec![0, 0, 1, 2]);
}

#[test]
fn blob_exactly_one_page() {
    let json = format!(r#"{{"a":"{}"}}"#, "y".repeat(60 - 8));
    assert_eq!(json.len() + 4, 64);
    let mock = MockTransport::new().with_flash(calibration_image(&json));
    let reader = PagedFlashReader::new(&mock, ProtocolTiming::default());

    let cal = load_calibration(&reader).unwrap();
    assert_eq!(cal.len(), 1);
    assert_eq!(mock.requested_pages(), vec![0, 0]);
}

#[test]
fn uninitialized_store_stops_after_prefix() {
    let mock = MockTransport::new().with_flash(vec![0xFF; 128]);
    let reader = PagedFlashReader::new(&mock, ProtocolTiming::default());

    let err = load_calibration(&reader).unwrap_err();
    assert!(matches!(err, DeviceError::Protocol(ProtocolError::Uninitialized)));
    assert_eq!(mock.requested_pages(), vec![0]);
}

#[test]
fn stale_input_is_flushed_before_loading() {
    let mock = MockTransport::new().with_flash(calibration_image(PORTRAIT_JSON));
    // Leftover echo of page 0 with a bogus length, plus a button report
    mock.queue_read(page_report(0, 0, &[0xFF, 0xFF, 0xFF, 0xFF]));
    mock.queue_read(vec![0x01; 68]);
    let reader = PagedFlashReader::new(&mock, ProtocolTiming::default());

    let cal = load_calibration(&reader).unwrap();
    assert_eq!(cal.serial(), Some("LKG-P01234"));
}

#[test]
fn malformed_json_is_decode_error() {
    let mock = MockTransport::new().with_flash(calibration_image(r#"{"pitch": {"value": }"#));
    let reader = PagedFlashReader::new(&mock, ProtocolTiming::default());
    assert!(matches!(
        load_calibration(&reader).unwrap_err(),
        DeviceError::Calibration(_)
    ));
}

#[test]
fn unanswered_request_aborts_load() {
    let mock = MockTransport::new();
    let timing = ProtocolTiming {
        max_echo_attempts: 2,
        ..ProtocolTiming::default()
    };
    let reader = PagedFlashReader::new(&mock, timing);

    let err = load_calibration(&reader).unwrap_err();
    assert!(matches!(
        err,
        DeviceError::Protocol(ProtocolError::NoMatchingResponse { page: 0, attempts: 2 })
    ));
    assert_eq!(mock.requested_pages(), vec![0]);
}

// ── session ──

#[test]
fn session_derives_configuration() {
    let mock = MockTransport::new().with_flash(calibration_image(PORTRAIT_JSON));
    let backend = MockBackend::new(mock).with_device(descriptor("Looking Glass Factory", "HoloPlay"));

    let lkg = LookingGlass::open(&backend, &SessionOptions::default()).unwrap();
    let cfg = lkg.config();
    assert_eq!(cfg.screen_size(), (1536, 2048));
    assert_relative_eq!(cfg.tilt(), 2048.0 / (1536.0 * -7.06));
    assert_relative_eq!(
        cfg.pitch(),
        -(1536.0 / 324.0) * 52.58 * (-7.06f64).atan().sin()
    );
    assert_relative_eq!(cfg.subp(), 1.0 / (3.0 * 1536.0));
    assert_eq!(cfg.get("ri"), Some(&Scalar::Integer(0)));
    assert_eq!(cfg.get("bi"), Some(&Scalar::Integer(2)));
    assert_eq!(cfg.get("viewCone"), Some(&Scalar::Number(40.0)));
    assert_eq!(lkg.calibration().serial(), Some("LKG-P01234"));
}

#[test]
fn session_accepts_manufacturer_only_match() {
    let mock = MockTransport::new().with_flash(calibration_image(PORTRAIT_JSON));
    let backend = MockBackend::new(mock)
        .with_device(descriptor("Looking Glass Factory", "LKG Display"));
    assert!(LookingGlass::open(&backend, &SessionOptions::default()).is_ok());
    assert_eq!(backend.opened().len(), 1);
}

#[test]
fn session_without_device_never_opens() {
    let backend = MockBackend::new(MockTransport::new())
        .with_device(descriptor("Microchip", "PICkit"));
    let err = LookingGlass::open(&backend, &SessionOptions::default()).err();
    assert!(matches!(
        err,
        Some(DeviceError::Transport(TransportError::DeviceNotFound(_)))
    ));
    assert!(backend.opened().is_empty());
}

#[test]
fn session_polls_buttons_and_reads_pages() {
    let mock = MockTransport::new().with_flash(calibration_image(PORTRAIT_JSON));
    let backend = MockBackend::new(mock.clone())
        .with_device(descriptor("Looking Glass Factory", "HoloPlay"));
    let lkg = LookingGlass::open(&backend, &SessionOptions::default()).unwrap();

    let mut report = vec![0u8; 68];
    report[0] = 0b0101;
    mock.queue_read(report);
    assert_eq!(lkg.poll_buttons().unwrap().mask(), 5);

    let page = lkg.read_page(0, 4).unwrap();
    assert_eq!(page, (PORTRAIT_JSON.len() as u32).to_be_bytes().to_vec());

    let blob = lkg.read_calibration_blob().unwrap();
    assert_eq!(&blob[4..], PORTRAIT_JSON.as_bytes());
}

#[test]
#[ignore = "requires an attached Looking Glass display"]
fn hardware_calibration_loads() {
    let lkg = LookingGlass::open(&HidApiBackend::new(), &SessionOptions::default()).unwrap();
    let (w, h) = lkg.config().screen_size();
    assert!(w > 0 && h > 0);
    assert!(lkg.config().subp() > 0.0);
}
