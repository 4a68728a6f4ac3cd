use std::fmt;

use crate::device::property::PropertyKey;

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Failures surfaced by `CameraSession` operations.
///
/// Acquisition timeout is deliberately absent: `capture_frame` reports
/// it as `Ok(None)`, leaving the caller to decide whether a missing
/// frame is fatal.
#[derive(Debug)]
pub enum SessionError {
    /// A serial was requested but no enumerated device carries it.
    DeviceNotFound(String),
    /// Connect without a serial found nothing attached at all.
    NoDeviceAvailable,
    /// The operation requires an open device.
    NotConnected,
    /// The property name is outside the recognized set.
    UnknownProperty(String),
    /// The hardware refused the written value.
    WriteRejected { key: PropertyKey, reason: String },
    /// A hardware call failed while connected; the session has already
    /// been force-disconnected.
    ConnectionLost(String),
    /// Enumeration or open failed before a connection existed.
    Hardware(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SessionError::{
            ConnectionLost, DeviceNotFound, Hardware, NoDeviceAvailable, NotConnected,
            UnknownProperty, WriteRejected,
        };
        match self {
            DeviceNotFound(serial) => write!(f, "No camera with serial {serial}"),
            NoDeviceAvailable => write!(f, "No camera available"),
            NotConnected => write!(f, "Camera not connected"),
            UnknownProperty(name) => write!(f, "Unknown property: {name}"),
            WriteRejected { key, reason } => write!(f, "Write to {key} rejected: {reason}"),
            ConnectionLost(detail) => write!(f, "Camera connection lost: {detail}"),
            Hardware(msg) => write!(f, "Hardware error: {msg}"),
        }
    }
}

impl std::error::Error for SessionError {}
