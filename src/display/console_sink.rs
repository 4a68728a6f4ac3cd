use std::sync::Arc;

use crate::{
    display::display_sink::DisplaySink, frame::video_frame::VideoFrame, log::log_sink::LogSink,
    sink_debug, sink_info,
};

/// Headless sink that records what was presented and reports it through
/// the logger.
///
/// Stands in for a real renderer in the demo binary and anywhere else
/// no window exists.
pub struct ConsoleSink {
    logger: Arc<dyn LogSink>,
    frames_presented: u64,
    last_geometry: (u32, u32),
    last_caption: String,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(logger: Arc<dyn LogSink>) -> Self {
        Self {
            logger,
            frames_presented: 0,
            last_geometry: (0, 0),
            last_caption: String::new(),
        }
    }

    #[must_use]
    pub const fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Dimensions of the most recently presented frame.
    #[must_use]
    pub const fn last_geometry(&self) -> (u32, u32) {
        self.last_geometry
    }

    /// Caption of the most recently presented frame.
    #[must_use]
    pub fn last_caption(&self) -> &str {
        &self.last_caption
    }
}

impl DisplaySink for ConsoleSink {
    fn present(&mut self, frame: &VideoFrame, caption: &str) {
        self.frames_presented += 1;
        self.last_geometry = (frame.width, frame.height);
        if self.last_caption != caption {
            self.last_caption = caption.to_string();
            // Report feed state transitions, not every frame.
            sink_info!(
                self.logger,
                "display: \"{}\" at {}x{}",
                self.last_caption,
                frame.width,
                frame.height
            );
        }
        sink_debug!(
            self.logger,
            "present #{}: {}x{} {:?} \"{}\"",
            self.frames_presented,
            frame.width,
            frame.height,
            frame.format,
            self.last_caption
        );
    }
}
