use std::time::Duration;

use crate::{
    device::{
        backend_error::BackendResult,
        descriptor::DeviceDescriptor,
        property::{PropertyKey, PropertyNode, PropertyValue},
    },
    frame::video_frame::VideoFrame,
};

/// Capability set of the camera hardware layer.
///
/// One backend instance drives at most one open device at a time. The
/// trait is deliberately narrow: enumeration, open/close, acquisition
/// start/stop, a single-timeout grab, and typed property read/write with
/// range metadata. Everything else (state invariants, error taxonomy,
/// pause/resume around geometry writes) lives in the session layer.
///
/// Implementations are not expected to be reentrant; the session owns
/// the backend and serializes access.
pub trait CameraBackend: Send {
    /// Lists attached devices. An empty list is a normal outcome, not an
    /// error.
    fn enumerate(&mut self) -> BackendResult<Vec<DeviceDescriptor>>;

    /// Opens the described device. Implementations must release any
    /// partially acquired resources on failure.
    fn open(&mut self, descriptor: &DeviceDescriptor) -> BackendResult<()>;

    /// Releases the open device. Must be safe to call at any time,
    /// including when nothing is open.
    fn close(&mut self);

    /// Begins continuous acquisition on the open device.
    fn start_acquisition(&mut self) -> BackendResult<()>;

    /// Ends continuous acquisition. No-op when not acquiring.
    fn stop_acquisition(&mut self) -> BackendResult<()>;

    /// Waits up to `timeout` for the next frame. The timeout bounds only
    /// the wait for a frame; `Err(Timeout)` means no frame arrived.
    fn grab(&mut self, timeout: Duration) -> BackendResult<VideoFrame>;

    /// Reads one property's current value and, for numeric keys, its
    /// range.
    fn read_property(&mut self, key: PropertyKey) -> BackendResult<PropertyNode>;

    /// Writes one property. The value has already been coerced to the
    /// key's declared type by the session layer.
    fn write_property(&mut self, key: PropertyKey, value: &PropertyValue) -> BackendResult<()>;
}
