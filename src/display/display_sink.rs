use crate::frame::video_frame::VideoFrame;

/// Boundary to whatever renders frames.
///
/// The contract is deliberately thin: take a pixel buffer plus a
/// caption and show it. Sinks never fail; a sink that cannot render
/// simply drops the frame.
pub trait DisplaySink {
    fn present(&mut self, frame: &VideoFrame, caption: &str);
}
