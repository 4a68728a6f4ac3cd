//! Camstream is a control facade for industrial-style cameras with a
//! live display loop.
//!
//! The crate separates three concerns:
//! - a narrow hardware boundary (`device`) with a synthetic backend for
//!   development and testing and an optional OpenCV-backed one,
//! - a session facade (`camera_session`) that owns the device lifecycle
//!   and turns every hardware failure into a typed result,
//! - a cooperative display loop (`display`) that feeds frames, or a
//!   neutral placeholder, to a display sink while an external stream
//!   flag stays set.

/// The camera session facade: lifecycle, stream control, capture, and
/// typed property access.
pub mod camera_session;
/// Handles configuration loading and management.
pub mod config;
/// Hardware boundary: backends, device descriptors, and the property table.
pub mod device;
/// Display boundary and the cooperative video display loop.
pub mod display;
/// Pixel-buffer types and still-image snapshots.
pub mod frame;
/// Logging utilities for the application.
pub mod log;
