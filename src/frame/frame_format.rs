/// Pixel layout of a [`VideoFrame`](crate::frame::video_frame::VideoFrame).
///
/// Industrial cameras deliver either a single luminance plane or packed
/// RGB; both use fixed-width 8-bit samples here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameFormat {
    /// One byte per pixel, grayscale.
    Mono8,
    /// Three bytes per pixel, packed R-G-B.
    Rgb8,
}

impl FrameFormat {
    /// Number of interleaved channels per pixel.
    #[must_use]
    pub const fn channels(self) -> u32 {
        match self {
            FrameFormat::Mono8 => 1,
            FrameFormat::Rgb8 => 3,
        }
    }

    /// Bytes needed for a tightly packed `width` x `height` buffer.
    #[must_use]
    pub const fn buffer_len(self, width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * (self.channels() as usize)
    }
}
