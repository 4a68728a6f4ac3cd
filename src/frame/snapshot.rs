//! Encoding captured frames to still-image files.

use std::{fmt, fs::File, io::BufWriter, path::Path};

use image::{ExtendedColorType, ImageEncoder, ImageFormat, codecs::jpeg::JpegEncoder};

use crate::frame::{frame_format::FrameFormat, video_frame::VideoFrame};

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug)]
pub enum SnapshotError {
    Io(String),
    Encode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(e) => write!(f, "Snapshot io error: {e}"),
            SnapshotError::Encode(e) => write!(f, "Snapshot encode error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {}

const fn color_type(format: FrameFormat) -> ExtendedColorType {
    match format {
        FrameFormat::Mono8 => ExtendedColorType::L8,
        FrameFormat::Rgb8 => ExtendedColorType::Rgb8,
    }
}

/// Writes `frame` to `path` as PNG.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if the encoder rejects the buffer.
pub fn save_png(frame: &VideoFrame, path: &Path) -> Result<()> {
    image::save_buffer_with_format(
        path,
        &frame.bytes,
        frame.width,
        frame.height,
        color_type(frame.format),
        ImageFormat::Png,
    )
    .map_err(|e| SnapshotError::Encode(e.to_string()))
}

/// Writes `frame` to `path` as JPEG with the given quality (1-100).
///
/// # Errors
///
/// Returns [`SnapshotError::Io`] if the file cannot be created and
/// [`SnapshotError::Encode`] if encoding fails.
pub fn save_jpeg(frame: &VideoFrame, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path).map_err(|e| SnapshotError::Io(e.to_string()))?;
    let writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(writer, quality.clamp(1, 100));
    encoder
        .write_image(&frame.bytes, frame.width, frame.height, color_type(frame.format))
        .map_err(|e| SnapshotError::Encode(e.to_string()))
}
