//! Camera session component.
//!
//! Owns at most one open hardware handle through a boxed
//! [`CameraBackend`] and enforces the lifecycle invariants on top of
//! it: `streaming` implies `connected`, disconnect always lands in a
//! fully closed state, and every hardware failure is converted into a
//! typed [`SessionError`](crate::camera_session::session_error::SessionError)
//! instead of escaping.
//!
//! The session is not internally synchronized; callers serialize access
//! (a single mutex around the session is sufficient).

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use crate::{
    camera_session::session_error::{SessionError, SessionResult},
    device::{
        backend::CameraBackend,
        backend_error::{BackendError, BackendResult},
        descriptor::DeviceDescriptor,
        property::{PropertyKey, PropertyNode, PropertyValue},
    },
    frame::video_frame::VideoFrame,
    log::log_sink::LogSink,
    sink_error, sink_info, sink_warn,
};

pub struct CameraSession {
    backend: Box<dyn CameraBackend>,
    connected: Option<DeviceDescriptor>,
    streaming: bool,
    logger: Arc<dyn LogSink>,
}

impl CameraSession {
    #[must_use]
    pub fn new(backend: Box<dyn CameraBackend>, logger: Arc<dyn LogSink>) -> Self {
        Self {
            backend,
            connected: None,
            streaming: false,
            logger,
        }
    }

    /// Enumerates attached devices. An empty list means nothing is
    /// plugged in; that is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Hardware`] when the enumeration call
    /// itself fails at the driver level.
    pub fn list_devices(&mut self) -> SessionResult<Vec<DeviceDescriptor>> {
        self.backend
            .enumerate()
            .map_err(|e| SessionError::Hardware(e.to_string()))
    }

    /// Opens a device: the one matching `serial`, or the first
    /// enumerated device when no serial is given. No-op success when
    /// already connected.
    ///
    /// On any lower-level failure the session reverts to disconnected
    /// with the handle cleared; it is never left half-open.
    ///
    /// # Errors
    ///
    /// * [`SessionError::DeviceNotFound`] - a serial was given and no device matches it.
    /// * [`SessionError::NoDeviceAvailable`] - no serial given and nothing is attached.
    /// * [`SessionError::Hardware`] - enumeration or open failed at the driver level.
    pub fn connect(&mut self, serial: Option<&str>) -> SessionResult<()> {
        if self.connected.is_some() {
            return Ok(());
        }

        let devices = self
            .backend
            .enumerate()
            .map_err(|e| SessionError::Hardware(e.to_string()))?;

        let descriptor = match serial {
            Some(s) => devices
                .iter()
                .find(|d| d.serial_id == s)
                .cloned()
                .ok_or_else(|| SessionError::DeviceNotFound(s.to_string()))?,
            None => devices
                .first()
                .cloned()
                .ok_or(SessionError::NoDeviceAvailable)?,
        };

        if let Err(e) = self.backend.open(&descriptor) {
            self.backend.close();
            return Err(SessionError::Hardware(e.to_string()));
        }

        sink_info!(self.logger, "Connected: {descriptor}");
        self.connected = Some(descriptor);
        Ok(())
    }

    /// Releases the device. Idempotent; stops streaming first when
    /// active. Never fails: close problems are logged and cleanup
    /// proceeds regardless.
    pub fn disconnect(&mut self) {
        if self.streaming {
            if let Err(e) = self.backend.stop_acquisition() {
                sink_warn!(self.logger, "Stopping stream during disconnect failed: {e}");
            }
            self.streaming = false;
        }
        if let Some(descriptor) = self.connected.take() {
            sink_info!(self.logger, "Disconnected: {descriptor}");
        }
        self.backend.close();
    }

    /// Begins continuous acquisition. Idempotent when already streaming.
    ///
    /// Before the first grab the session attempts to force free-run
    /// acquisition by switching the hardware trigger off; devices
    /// without that capability simply skip the step.
    ///
    /// # Errors
    ///
    /// * [`SessionError::NotConnected`] - no device is open.
    /// * [`SessionError::ConnectionLost`] - the device vanished; the session is now disconnected.
    /// * [`SessionError::Hardware`] - acquisition start rejected; session stays connected, not streaming.
    pub fn start_stream(&mut self) -> SessionResult<()> {
        if self.connected.is_none() {
            return Err(SessionError::NotConnected);
        }
        if self.streaming {
            return Ok(());
        }

        let trigger_off = self
            .backend
            .write_property(PropertyKey::TriggerMode, &PropertyValue::Text("Off".into()));
        match trigger_off {
            Ok(()) => {}
            Err(BackendError::Disconnected(detail)) => return Err(self.lost(detail)),
            Err(e) => sink_warn!(self.logger, "Trigger-off not applied: {e}"),
        }

        match self.backend.start_acquisition() {
            Ok(()) => {
                self.streaming = true;
                sink_info!(self.logger, "Stream started");
                Ok(())
            }
            Err(BackendError::Disconnected(detail)) => Err(self.lost(detail)),
            Err(e) => Err(SessionError::Hardware(e.to_string())),
        }
    }

    /// Ends continuous acquisition. Idempotent; no-op when not
    /// streaming or not connected.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ConnectionLost`] when the device vanished
    /// during the stop; `streaming` is cleared either way.
    pub fn stop_stream(&mut self) -> SessionResult<()> {
        if self.connected.is_none() || !self.streaming {
            return Ok(());
        }
        self.streaming = false;
        match self.backend.stop_acquisition() {
            Ok(()) => {
                sink_info!(self.logger, "Stream stopped");
                Ok(())
            }
            Err(BackendError::Disconnected(detail)) => Err(self.lost(detail)),
            Err(e) => {
                sink_warn!(self.logger, "Stream stop reported: {e}");
                Ok(())
            }
        }
    }

    /// Retrieves one frame, waiting up to `timeout` for it.
    ///
    /// When streaming, this pulls the next buffered frame. When not
    /// streaming, a single bounded acquisition is performed around the
    /// grab. A timeout or transient acquisition failure yields
    /// `Ok(None)`; the caller decides whether a missing frame is
    /// fatal. The timeout bounds only the wait for a frame, not the
    /// whole call.
    ///
    /// # Errors
    ///
    /// * [`SessionError::NotConnected`] - no device is open.
    /// * [`SessionError::ConnectionLost`] - the device vanished; the session is now disconnected.
    pub fn capture_frame(&mut self, timeout: Duration) -> SessionResult<Option<VideoFrame>> {
        if self.connected.is_none() {
            return Err(SessionError::NotConnected);
        }

        if self.streaming {
            let grabbed = self.backend.grab(timeout);
            return self.map_grab(grabbed);
        }

        if let Err(e) = self.backend.start_acquisition() {
            return match e {
                BackendError::Disconnected(detail) => Err(self.lost(detail)),
                other => {
                    sink_warn!(self.logger, "One-shot acquisition failed: {other}");
                    Ok(None)
                }
            };
        }
        let grabbed = self.backend.grab(timeout);
        match self.backend.stop_acquisition() {
            Ok(()) => {}
            Err(BackendError::Disconnected(detail)) => return Err(self.lost(detail)),
            Err(e) => sink_warn!(self.logger, "One-shot acquisition stop reported: {e}"),
        }
        self.map_grab(grabbed)
    }

    /// Reads the recognized property set from the device.
    ///
    /// Properties the device does not support (or cannot read right
    /// now) are omitted rather than failing the whole call. Returns an
    /// empty map when not connected.
    pub fn get_properties(&mut self) -> BTreeMap<PropertyKey, PropertyNode> {
        let mut nodes = BTreeMap::new();
        if self.connected.is_none() {
            sink_warn!(self.logger, "Property read requested without a connection");
            return nodes;
        }
        for key in PropertyKey::ALL {
            match self.backend.read_property(key) {
                Ok(node) => {
                    nodes.insert(key, node);
                }
                Err(BackendError::Disconnected(detail)) => {
                    let _ = self.lost(detail);
                    break;
                }
                Err(_) => {}
            }
        }
        nodes
    }

    /// Writes one property by name, coercing `value` to the property's
    /// declared type.
    ///
    /// Writes to the sensor-region keys (Width, Height, OffsetX,
    /// OffsetY) while streaming pause acquisition for the duration of
    /// the write and resume it automatically; `streaming` remains true
    /// throughout.
    ///
    /// # Errors
    ///
    /// * [`SessionError::NotConnected`] - no device is open.
    /// * [`SessionError::UnknownProperty`] - `name` is outside the recognized set.
    /// * [`SessionError::WriteRejected`] - the value cannot be coerced or the hardware refused it.
    /// * [`SessionError::ConnectionLost`] - the device vanished; the session is now disconnected.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> SessionResult<()> {
        if self.connected.is_none() {
            return Err(SessionError::NotConnected);
        }
        let key = PropertyKey::parse(name)
            .ok_or_else(|| SessionError::UnknownProperty(name.to_string()))?;
        let coerced = value.coerce_to(key.value_type()).ok_or_else(|| {
            SessionError::WriteRejected {
                key,
                reason: format!("cannot coerce '{value}' to {:?}", key.value_type()),
            }
        })?;

        let pause = key.is_geometry() && self.streaming;
        if pause {
            match self.backend.stop_acquisition() {
                Ok(()) => {}
                Err(BackendError::Disconnected(detail)) => return Err(self.lost(detail)),
                Err(e) => {
                    return Err(SessionError::WriteRejected {
                        key,
                        reason: format!("failed to pause stream: {e}"),
                    });
                }
            }
        }

        let written = self.backend.write_property(key, &coerced);

        if pause {
            // Resume regardless of the write outcome; streaming stays true.
            match self.backend.start_acquisition() {
                Ok(()) => {}
                Err(BackendError::Disconnected(detail)) => return Err(self.lost(detail)),
                Err(e) => sink_warn!(self.logger, "Failed to resume stream after {key} write: {e}"),
            }
        }

        match written {
            Ok(()) => {
                sink_info!(self.logger, "Set {key} = {coerced}");
                Ok(())
            }
            Err(BackendError::Disconnected(detail)) => Err(self.lost(detail)),
            Err(BackendError::Unsupported(key)) => Err(SessionError::WriteRejected {
                key,
                reason: "not supported by device".to_string(),
            }),
            Err(BackendError::Rejected { key, reason }) => {
                Err(SessionError::WriteRejected { key, reason })
            }
            Err(other) => Err(SessionError::WriteRejected {
                key,
                reason: other.to_string(),
            }),
        }
    }

    /// Applies each name/value pair in order via
    /// [`set_property`](Self::set_property), continuing past individual
    /// failures. Partial application is expected: every non-failing
    /// write takes effect.
    ///
    /// # Errors
    ///
    /// Returns the first individual failure when any pair was refused.
    pub fn set_properties(&mut self, pairs: &[(&str, PropertyValue)]) -> SessionResult<()> {
        let mut first_err = None;
        for (name, value) in pairs {
            if let Err(e) = self.set_property(name, value.clone()) {
                sink_warn!(self.logger, "Set {name} failed: {e}");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected.is_some()
    }

    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// The descriptor of the currently open device, if any.
    #[must_use]
    pub const fn connected_device(&self) -> Option<&DeviceDescriptor> {
        self.connected.as_ref()
    }

    /// Forced cleanup after a hardware call failed while connected:
    /// clears streaming, releases the handle, and reports the loss.
    fn lost(&mut self, detail: String) -> SessionError {
        sink_error!(self.logger, "Connection lost: {detail}");
        self.streaming = false;
        self.backend.close();
        self.connected = None;
        SessionError::ConnectionLost(detail)
    }

    fn map_grab(&mut self, grabbed: BackendResult<VideoFrame>) -> SessionResult<Option<VideoFrame>> {
        match grabbed {
            Ok(frame) => Ok(Some(frame)),
            Err(BackendError::Timeout) => Ok(None),
            Err(BackendError::Disconnected(detail)) => Err(self.lost(detail)),
            Err(other) => {
                sink_warn!(self.logger, "Frame acquisition failed: {other}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::{device::synthetic_backend::SyntheticBackend, log::NoopLogSink};

    fn session() -> CameraSession {
        CameraSession::new(Box::new(SyntheticBackend::new()), Arc::new(NoopLogSink))
    }

    #[test]
    fn connect_is_idempotent() {
        let mut s = session();
        s.connect(None).unwrap();
        assert!(s.is_connected());
        s.connect(None).unwrap();
        assert!(s.is_connected());
    }

    #[test]
    fn connect_by_unknown_serial_fails() {
        let mut s = session();
        match s.connect(Some("99999999")) {
            Err(SessionError::DeviceNotFound(serial)) => assert_eq!(serial, "99999999"),
            other => panic!("expected DeviceNotFound, got {other:?}"),
        }
        assert!(!s.is_connected());
    }

    #[test]
    fn start_stream_without_connection_fails() {
        let mut s = session();
        assert!(matches!(s.start_stream(), Err(SessionError::NotConnected)));
        assert!(!s.is_streaming());
    }

    #[test]
    fn stream_start_and_stop_are_idempotent() {
        let mut s = session();
        s.connect(None).unwrap();
        s.start_stream().unwrap();
        s.start_stream().unwrap();
        assert!(s.is_streaming());
        s.stop_stream().unwrap();
        s.stop_stream().unwrap();
        assert!(!s.is_streaming());
    }

    #[test]
    fn geometry_write_while_streaming_keeps_streaming_true() {
        let mut s = session();
        s.connect(None).unwrap();
        s.start_stream().unwrap();

        s.set_property("Width", PropertyValue::Int(640)).unwrap();

        assert!(s.is_streaming());
        let frame = s
            .capture_frame(Duration::from_millis(50))
            .unwrap()
            .expect("frame after resume");
        assert_eq!(frame.width, 640);
    }

    #[test]
    fn unknown_property_is_rejected_explicitly() {
        let mut s = session();
        s.connect(None).unwrap();
        match s.set_property("UnknownThing", PropertyValue::Int(1)) {
            Err(SessionError::UnknownProperty(name)) => assert_eq!(name, "UnknownThing"),
            other => panic!("expected UnknownProperty, got {other:?}"),
        }
    }

    #[test]
    fn set_properties_applies_the_good_writes() {
        let mut s = session();
        s.connect(None).unwrap();

        let result = s.set_properties(&[
            ("Gain", PropertyValue::Int(5)),
            ("UnknownThing", PropertyValue::Int(1)),
        ]);
        assert!(result.is_err());

        let nodes = s.get_properties();
        let gain = nodes.get(&PropertyKey::Gain).expect("gain present");
        assert_eq!(gain.value, PropertyValue::Float(5.0));
    }

    #[test]
    fn unplug_during_capture_forces_disconnect() {
        let backend = SyntheticBackend::new();
        let controls = backend.controls();
        let mut s = CameraSession::new(Box::new(backend), Arc::new(NoopLogSink));
        s.connect(None).unwrap();
        s.start_stream().unwrap();

        controls.unplug();

        match s.capture_frame(Duration::from_millis(20)) {
            Err(SessionError::ConnectionLost(_)) => {}
            other => panic!("expected ConnectionLost, got {other:?}"),
        }
        assert!(!s.is_connected());
        assert!(!s.is_streaming());
    }
}
