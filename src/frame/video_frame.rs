use std::sync::Arc;

use crate::frame::{frame_format::FrameFormat, utils::now_millis};

/// Neutral gray sample value used for placeholder frames.
pub const PLACEHOLDER_LUMA: u8 = 122;

/// An immutable captured image: dimensions, pixel layout, capture
/// timestamp, and the packed sample buffer.
///
/// The buffer is reference counted so a frame can be handed to a display
/// sink and kept by the capturer without copying pixels.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
    pub timestamp_ms: u128,
    pub bytes: Arc<Vec<u8>>,
}

impl VideoFrame {
    /// Wraps a packed sample buffer, timestamping it with the current
    /// wall-clock time.
    ///
    /// Returns `None` when `bytes` does not match the tight buffer size
    /// implied by the dimensions and format.
    #[must_use]
    pub fn from_bytes(width: u32, height: u32, format: FrameFormat, bytes: Vec<u8>) -> Option<Self> {
        if bytes.len() != format.buffer_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            format,
            timestamp_ms: now_millis(),
            bytes: Arc::new(bytes),
        })
    }

    /// A uniformly neutral-gray RGB frame, shown whenever no live frame
    /// is available.
    #[must_use]
    pub fn placeholder(width: u32, height: u32) -> Self {
        let len = FrameFormat::Rgb8.buffer_len(width, height);
        Self {
            width,
            height,
            format: FrameFormat::Rgb8,
            timestamp_ms: now_millis(),
            bytes: Arc::new(vec![PLACEHOLDER_LUMA; len]),
        }
    }

    /// Deterministic RGB test pattern, varied per `tick` so consecutive
    /// frames are visibly distinct.
    #[must_use]
    pub fn synthetic(width: u32, height: u32, tick: u8) -> Self {
        let mut data = Vec::with_capacity(FrameFormat::Rgb8.buffer_len(width, height));
        for y in 0..height {
            for x in 0..width {
                let r = x as u8 ^ tick;
                let g = y as u8 ^ tick;
                let b = (x.wrapping_add(y)) as u8 ^ tick;
                data.push(r);
                data.push(g);
                data.push(b);
            }
        }
        Self {
            width,
            height,
            format: FrameFormat::Rgb8,
            timestamp_ms: now_millis(),
            bytes: Arc::new(data),
        }
    }

    /// Length in bytes of the tightly packed sample buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert!(VideoFrame::from_bytes(4, 4, FrameFormat::Rgb8, vec![0; 47]).is_none());
        assert!(VideoFrame::from_bytes(4, 4, FrameFormat::Rgb8, vec![0; 48]).is_some());
        assert!(VideoFrame::from_bytes(4, 4, FrameFormat::Mono8, vec![0; 16]).is_some());
    }

    #[test]
    fn placeholder_is_uniform_gray() {
        let frame = VideoFrame::placeholder(8, 4);
        assert_eq!(frame.len(), 8 * 4 * 3);
        assert!(frame.bytes.iter().all(|&b| b == PLACEHOLDER_LUMA));
    }

    #[test]
    fn synthetic_frames_differ_per_tick() {
        let a = VideoFrame::synthetic(16, 16, 0);
        let b = VideoFrame::synthetic(16, 16, 1);
        assert_eq!(a.len(), b.len());
        assert_ne!(a.bytes, b.bytes);
    }
}
