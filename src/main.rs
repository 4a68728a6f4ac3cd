use std::{path::Path, sync::Arc, thread, time::Duration};

use camstream::{
    camera_session::camera_session_c::CameraSession,
    config::Config,
    device::{backend::CameraBackend, synthetic_backend::SyntheticBackend},
    display::{
        console_sink::ConsoleSink,
        display_loop::{DisplayLoopConfig, run_display_loop},
        stream_flag::StreamFlag,
    },
    frame::snapshot,
    log::{log_sink::LogSink, logger::Logger},
    sink_error, sink_info, sink_warn,
};

fn main() {
    let config = Arc::new(Config::load("camstream.ini").unwrap_or_else(|_| Config::empty()));
    let logger = Logger::start_app(1024, &config);
    let log: Arc<dyn LogSink> = Arc::new(logger.handle());

    let backend = build_backend(&config, &log);
    let mut session = CameraSession::new(backend, log.clone());

    match session.list_devices() {
        Ok(devices) if devices.is_empty() => {
            sink_warn!(log, "No cameras found");
        }
        Ok(devices) => {
            for device in &devices {
                sink_info!(log, "Found {device}");
            }
        }
        Err(e) => {
            sink_error!(log, "Enumeration failed: {e}");
            return;
        }
    }

    let serial = config.get_non_empty("Camera", "serial");
    if let Err(e) = session.connect(serial) {
        sink_error!(log, "Connect failed: {e}");
        return;
    }

    for node in session.get_properties().values() {
        sink_info!(log, "{} = {} (range {:?}..{:?})", node.key, node.value, node.min, node.max);
    }

    if let Err(e) = session.start_stream() {
        sink_error!(log, "Stream start failed: {e}");
        session.disconnect();
        return;
    }

    // Stream to the console sink for a few seconds, then stop.
    let flag = StreamFlag::new();
    flag.set();
    let stopper = flag.clone();
    let stream_secs = config.get_u64_or("Display", "stream_seconds", 3);
    let timer = thread::spawn(move || {
        thread::sleep(Duration::from_secs(stream_secs));
        stopper.clear();
    });

    let loop_config = DisplayLoopConfig {
        grab_timeout: Duration::from_millis(config.get_u64_or("Display", "grab_timeout_ms", 100)),
        poll_interval: Duration::from_millis(config.get_u64_or("Display", "poll_interval_ms", 10)),
        ..DisplayLoopConfig::default()
    };
    let mut sink = ConsoleSink::new(log.clone());
    let stats = run_display_loop(&mut session, &flag, &mut sink, &loop_config, &log);
    let _ = timer.join();
    sink_info!(
        log,
        "Stream ended: {} live frames, {} placeholders",
        stats.live_frames,
        stats.placeholder_frames
    );

    if let Err(e) = session.stop_stream() {
        sink_warn!(log, "Stream stop: {e}");
    }

    // One still capture to disk before closing, like a capture button.
    match session.capture_frame(Duration::from_millis(500)) {
        Ok(Some(frame)) => {
            let path = Path::new("snapshot.png");
            match snapshot::save_png(&frame, path) {
                Ok(()) => sink_info!(log, "Saved snapshot to {}", path.display()),
                Err(e) => sink_warn!(log, "Snapshot failed: {e}"),
            }
        }
        Ok(None) => sink_warn!(log, "No frame available for snapshot"),
        Err(e) => sink_warn!(log, "Snapshot capture failed: {e}"),
    }

    session.disconnect();
    sink_info!(log, "Done; log at {}", logger.file_path().display());
}

fn build_backend(config: &Arc<Config>, log: &Arc<dyn LogSink>) -> Box<dyn CameraBackend> {
    match config.get_or_default("Camera", "backend", "synthetic") {
        #[cfg(feature = "opencv-capture")]
        "opencv" => Box::new(camstream::device::opencv_backend::OpenCvBackend::new()),
        #[cfg(not(feature = "opencv-capture"))]
        "opencv" => {
            sink_warn!(
                log,
                "opencv backend requested but the opencv-capture feature is off; using synthetic"
            );
            Box::new(SyntheticBackend::new())
        }
        "synthetic" => Box::new(SyntheticBackend::new()),
        other => {
            sink_warn!(log, "Unknown backend '{other}'; using synthetic");
            Box::new(SyntheticBackend::new())
        }
    }
}
