//! Cooperative video display loop.
//!
//! Runs on the caller's thread while an external stream flag stays set:
//! grab a frame with a short timeout, hand it (or a neutral-gray
//! placeholder) to the display sink, then yield until the next poll
//! deadline. The loop never fails: an absent frame is always
//! substitutable with the placeholder. Cancellation takes effect
//! within one polling interval.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::{
    camera_session::camera_session_c::CameraSession,
    display::{display_sink::DisplaySink, stream_flag::StreamFlag},
    frame::video_frame::VideoFrame,
    log::log_sink::LogSink,
    sink_warn,
};

/// Caption accompanying live frames.
pub const LIVE_CAPTION: &str = "Camera feed";
/// Caption accompanying in-loop placeholders (timeout / no frame).
pub const NO_FEED_CAPTION: &str = "No camera feed available.";
/// Caption of the single final placeholder handed off when the loop stops.
pub const IDLE_CAPTION: &str = "Camera feed will appear here.";

#[derive(Debug, Clone, Copy)]
pub struct DisplayLoopConfig {
    /// Upper bound on the per-iteration wait for a frame.
    pub grab_timeout: Duration,
    /// Pacing between polls of the stream flag.
    pub poll_interval: Duration,
    /// Placeholder dimensions.
    pub placeholder_width: u32,
    pub placeholder_height: u32,
}

impl Default for DisplayLoopConfig {
    fn default() -> Self {
        Self {
            grab_timeout: Duration::from_millis(100),
            poll_interval: Duration::from_millis(10),
            placeholder_width: 1280,
            placeholder_height: 720,
        }
    }
}

/// Counts of what the loop handed to the sink.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLoopStats {
    pub live_frames: u64,
    pub placeholder_frames: u64,
}

/// Runs until `flag` is cleared, then performs exactly one final
/// placeholder hand-off and returns.
///
/// The loop only reads the flag; ownership stays with the caller, and
/// an in-flight grab finishes (or times out) before a cleared flag is
/// observed. Capture errors are logged and rendered as placeholders;
/// the loop itself never fails.
pub fn run_display_loop(
    session: &mut CameraSession,
    flag: &StreamFlag,
    sink: &mut dyn DisplaySink,
    config: &DisplayLoopConfig,
    logger: &Arc<dyn LogSink>,
) -> DisplayLoopStats {
    let mut stats = DisplayLoopStats::default();
    let placeholder = VideoFrame::placeholder(config.placeholder_width, config.placeholder_height);
    let mut next_deadline = Instant::now() + config.poll_interval;

    while flag.is_set() {
        match session.capture_frame(config.grab_timeout) {
            Ok(Some(frame)) => {
                sink.present(&frame, LIVE_CAPTION);
                stats.live_frames += 1;
            }
            Ok(None) => {
                sink.present(&placeholder, NO_FEED_CAPTION);
                stats.placeholder_frames += 1;
            }
            Err(e) => {
                sink_warn!(logger, "Capture failed in display loop: {e}");
                sink.present(&placeholder, NO_FEED_CAPTION);
                stats.placeholder_frames += 1;
            }
        }

        let now = Instant::now();
        if now < next_deadline {
            thread::sleep(next_deadline - now);
            next_deadline += config.poll_interval;
        } else {
            next_deadline = now + config.poll_interval;
        }
    }

    sink.present(&placeholder, IDLE_CAPTION);
    stats.placeholder_frames += 1;
    stats
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{
        device::synthetic_backend::SyntheticBackend,
        log::NoopLogSink,
    };

    struct RecordingSink {
        presented: Vec<(u32, u32, String)>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self { presented: Vec::new() }
        }
    }

    impl DisplaySink for RecordingSink {
        fn present(&mut self, frame: &VideoFrame, caption: &str) {
            self.presented.push((frame.width, frame.height, caption.to_string()));
        }
    }

    fn test_config() -> DisplayLoopConfig {
        DisplayLoopConfig {
            grab_timeout: Duration::from_millis(5),
            poll_interval: Duration::from_millis(1),
            placeholder_width: 64,
            placeholder_height: 48,
        }
    }

    fn noop_logger() -> Arc<dyn LogSink> {
        Arc::new(NoopLogSink)
    }

    #[test]
    fn presents_live_frames_then_one_final_placeholder() {
        let mut session = CameraSession::new(
            Box::new(SyntheticBackend::new()),
            noop_logger(),
        );
        session.connect(None).unwrap();
        session.start_stream().unwrap();

        let flag = StreamFlag::new();
        flag.set();
        let stopper = flag.clone();
        let timer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(40));
            stopper.clear();
        });

        let mut sink = RecordingSink::new();
        let stats =
            run_display_loop(&mut session, &flag, &mut sink, &test_config(), &noop_logger());
        timer.join().unwrap();

        assert!(stats.live_frames >= 1);
        let finals: Vec<_> = sink
            .presented
            .iter()
            .filter(|(_, _, c)| c == IDLE_CAPTION)
            .collect();
        assert_eq!(finals.len(), 1, "exactly one final hand-off");
        let (_, _, last_caption) = sink.presented.last().unwrap();
        assert_eq!(last_caption, IDLE_CAPTION);
    }

    #[test]
    fn starved_stream_yields_placeholders_not_failures() {
        let backend = SyntheticBackend::new();
        let controls = backend.controls();
        let mut session = CameraSession::new(Box::new(backend), noop_logger());
        session.connect(None).unwrap();
        session.start_stream().unwrap();
        controls.set_starved(true);

        let flag = StreamFlag::new();
        flag.set();
        let stopper = flag.clone();
        let timer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stopper.clear();
        });

        let mut sink = RecordingSink::new();
        let config = test_config();
        let stats = run_display_loop(&mut session, &flag, &mut sink, &config, &noop_logger());
        timer.join().unwrap();

        assert_eq!(stats.live_frames, 0);
        assert!(stats.placeholder_frames >= 1);
        let (w, h, caption) = &sink.presented[0];
        assert_eq!((*w, *h), (config.placeholder_width, config.placeholder_height));
        assert_eq!(caption, NO_FEED_CAPTION);
    }

    #[test]
    fn disconnected_session_still_runs_to_completion() {
        let mut session = CameraSession::new(
            Box::new(SyntheticBackend::without_devices()),
            noop_logger(),
        );

        let flag = StreamFlag::new();
        flag.set();
        let stopper = flag.clone();
        let timer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            stopper.clear();
        });

        let mut sink = RecordingSink::new();
        let stats =
            run_display_loop(&mut session, &flag, &mut sink, &test_config(), &noop_logger());
        timer.join().unwrap();

        assert_eq!(stats.live_frames, 0);
        assert!(stats.placeholder_frames >= 1);
    }

    #[test]
    fn cleared_flag_skips_straight_to_the_final_placeholder() {
        let mut session = CameraSession::new(
            Box::new(SyntheticBackend::new()),
            noop_logger(),
        );
        session.connect(None).unwrap();

        let flag = StreamFlag::new(); // never set

        let mut sink = RecordingSink::new();
        let stats =
            run_display_loop(&mut session, &flag, &mut sink, &test_config(), &noop_logger());

        assert_eq!(stats.live_frames, 0);
        assert_eq!(stats.placeholder_frames, 1);
        assert_eq!(sink.presented.len(), 1);
        assert_eq!(sink.presented[0].2, IDLE_CAPTION);
    }
}
