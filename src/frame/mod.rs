//! Pixel-buffer types shared between the hardware backends, the camera
//! session, and the display loop.
pub mod frame_format;
pub mod snapshot;
pub mod utils;
pub mod video_frame;
