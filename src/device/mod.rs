//! The hardware boundary: device enumeration, open/close, acquisition
//! control, timed frame grabs, and typed property access.
pub mod backend;
pub mod backend_error;
pub mod descriptor;
#[cfg(feature = "opencv-capture")]
pub mod opencv_backend;
pub mod property;
pub mod synthetic_backend;
