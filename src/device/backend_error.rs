use std::fmt;

use crate::device::property::PropertyKey;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failures reported by a hardware backend.
///
/// The session layer translates these into its own taxonomy; nothing
/// here escapes to callers of `CameraSession`.
#[derive(Debug)]
pub enum BackendError {
    /// Device enumeration itself failed (driver or transport error).
    Enumerate(String),
    /// The selected device could not be opened.
    Open(String),
    /// The device vanished: unplugged, powered off, or access revoked.
    Disconnected(String),
    /// No frame arrived within the requested wait.
    Timeout,
    /// The device does not expose this property.
    Unsupported(PropertyKey),
    /// The device refused the written value.
    Rejected { key: PropertyKey, reason: String },
    /// Any other transient hardware failure.
    Io(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BackendError::{Disconnected, Enumerate, Io, Open, Rejected, Timeout, Unsupported};
        match self {
            Enumerate(msg) => write!(f, "Device enumeration failed: {msg}"),
            Open(msg) => write!(f, "Failed to open device: {msg}"),
            Disconnected(msg) => write!(f, "Device disconnected: {msg}"),
            Timeout => write!(f, "No frame within timeout"),
            Unsupported(key) => write!(f, "Property not supported by device: {key}"),
            Rejected { key, reason } => write!(f, "Device rejected write to {key}: {reason}"),
            Io(msg) => write!(f, "Hardware io error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
