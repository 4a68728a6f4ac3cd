//! End-to-end lifecycle tests for the camera session over the
//! synthetic backend.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use camstream::{
    camera_session::{camera_session_c::CameraSession, session_error::SessionError},
    device::{
        property::{PropertyKey, PropertyValue},
        synthetic_backend::SyntheticBackend,
    },
    log::NoopLogSink,
};

fn session_with(backend: SyntheticBackend) -> CameraSession {
    CameraSession::new(Box::new(backend), Arc::new(NoopLogSink))
}

#[test]
fn connected_tracks_the_most_recent_terminal_call() {
    let mut session = session_with(SyntheticBackend::new());
    assert!(!session.is_connected());

    session.connect(None).expect("first connect");
    assert!(session.is_connected());

    session.disconnect();
    assert!(!session.is_connected());

    session.disconnect(); // idempotent
    assert!(!session.is_connected());

    session.connect(None).expect("reconnect");
    session.connect(None).expect("redundant connect");
    assert!(session.is_connected());

    session.disconnect();
    assert!(!session.is_connected());
}

#[test]
fn start_stream_on_disconnected_session_fails_with_not_connected() {
    let mut session = session_with(SyntheticBackend::new());

    assert!(matches!(
        session.start_stream(),
        Err(SessionError::NotConnected)
    ));
    assert!(!session.is_streaming());
}

#[test]
fn disconnect_always_clears_both_flags() {
    let mut session = session_with(SyntheticBackend::new());
    session.connect(None).expect("connect");
    session.start_stream().expect("stream");
    assert!(session.is_streaming());

    session.disconnect();

    assert!(!session.is_streaming());
    assert!(!session.is_connected());
}

#[test]
fn roi_write_while_streaming_is_paused_transparently() {
    let mut session = session_with(SyntheticBackend::new());
    session.connect(None).expect("connect");
    session.start_stream().expect("stream");

    for (name, value) in [
        ("Width", PropertyValue::Int(800)),
        ("Height", PropertyValue::Int(600)),
        ("OffsetX", PropertyValue::Int(16)),
        ("OffsetY", PropertyValue::Int(8)),
    ] {
        session.set_property(name, value).expect("roi write");
        assert!(session.is_streaming(), "{name} write must not stop the stream");
    }

    let frame = session
        .capture_frame(Duration::from_millis(50))
        .expect("capture after resume")
        .expect("frame after resume");
    assert_eq!((frame.width, frame.height), (800, 600));
}

#[test]
fn batched_writes_apply_the_accepted_pairs() {
    let mut session = session_with(SyntheticBackend::new());
    session.connect(None).expect("connect");

    let result = session.set_properties(&[
        ("Gain", PropertyValue::Int(5)),
        ("UnknownThing", PropertyValue::Int(1)),
    ]);

    match result {
        Err(SessionError::UnknownProperty(name)) => assert_eq!(name, "UnknownThing"),
        other => panic!("expected UnknownProperty as first failure, got {other:?}"),
    }

    let nodes = session.get_properties();
    assert_eq!(
        nodes.get(&PropertyKey::Gain).expect("gain readable").value,
        PropertyValue::Float(5.0)
    );
}

#[test]
fn capture_with_tiny_timeout_and_no_frames_returns_none_in_time() {
    let backend = SyntheticBackend::new();
    let controls = backend.controls();
    let mut session = session_with(backend);
    session.connect(None).expect("connect");
    session.start_stream().expect("stream");
    controls.set_starved(true);

    let timeout = Duration::from_millis(20);
    let started = Instant::now();
    let outcome = session.capture_frame(timeout).expect("not an error");
    let elapsed = started.elapsed();

    assert!(outcome.is_none());
    assert!(elapsed >= timeout);
    assert!(
        elapsed < timeout + Duration::from_millis(80),
        "timeout should bound the wait, took {elapsed:?}"
    );
}

#[test]
fn empty_enumeration_then_connect_fails_with_no_device_available() {
    let mut session = session_with(SyntheticBackend::without_devices());

    let devices = session.list_devices().expect("enumeration works");
    assert!(devices.is_empty());

    assert!(matches!(
        session.connect(None),
        Err(SessionError::NoDeviceAvailable)
    ));
    assert!(!session.is_connected());
}

#[test]
fn connect_by_serial_selects_the_matching_device() {
    let mut session = session_with(SyntheticBackend::with_devices(3));

    let devices = session.list_devices().expect("enumeration works");
    let wanted = devices[1].serial_id.clone();

    session.connect(Some(&wanted)).expect("connect by serial");
    let connected = session.connected_device().expect("descriptor");
    assert_eq!(connected.serial_id, wanted);
}

#[test]
fn property_listing_reports_ranges_for_numeric_keys_only() {
    let mut session = session_with(SyntheticBackend::new());
    session.connect(None).expect("connect");

    let nodes = session.get_properties();
    assert_eq!(nodes.len(), PropertyKey::ALL.len());

    for (key, node) in &nodes {
        if key.is_numeric() {
            assert!(node.min.is_some() && node.max.is_some(), "{key} needs a range");
        } else {
            assert!(node.min.is_none() && node.max.is_none(), "{key} must not carry a range");
        }
    }
}

#[test]
fn one_shot_capture_works_without_streaming() {
    let mut session = session_with(SyntheticBackend::new());
    session.connect(None).expect("connect");
    assert!(!session.is_streaming());

    let frame = session
        .capture_frame(Duration::from_millis(100))
        .expect("capture")
        .expect("frame");
    assert_eq!((frame.width, frame.height), (1280, 720));
    assert!(!session.is_streaming(), "one-shot capture must not leave the stream on");
}

#[test]
fn losing_the_device_forces_a_clean_disconnect() {
    let backend = SyntheticBackend::new();
    let controls = backend.controls();
    let mut session = session_with(backend);
    session.connect(None).expect("connect");
    session.start_stream().expect("stream");

    controls.unplug();

    assert!(matches!(
        session.capture_frame(Duration::from_millis(10)),
        Err(SessionError::ConnectionLost(_))
    ));
    assert!(!session.is_connected());
    assert!(!session.is_streaming());

    // The session is reusable once the device returns.
    controls.replug();
    session.connect(None).expect("reconnect");
    assert!(session.is_connected());
}
