//! A fully in-memory camera backend.
//!
//! Serves as the test double for the session layer and as the demo
//! default on machines without real hardware. Produces a moving test
//! pattern with per-frame sensor noise, carries the complete property
//! table with ranges, and supports failure injection (frame starvation,
//! surprise unplug) through a cloneable control handle.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use rand::Rng;

use crate::{
    device::{
        backend::CameraBackend,
        backend_error::{BackendError, BackendResult},
        descriptor::DeviceDescriptor,
        property::{PropertyKey, PropertyNode, PropertyType, PropertyValue},
    },
    frame::{frame_format::FrameFormat, utils::now_millis, video_frame::VideoFrame},
};

/// Failure-injection handle, cloneable before the backend is boxed into
/// a session.
#[derive(Clone, Default)]
pub struct SyntheticControls {
    starved: Arc<AtomicBool>,
    unplugged: Arc<AtomicBool>,
}

impl SyntheticControls {
    /// When set, grabs block for the full timeout and produce no frame.
    pub fn set_starved(&self, on: bool) {
        self.starved.store(on, Ordering::SeqCst);
    }

    /// Simulates pulling the cable: every subsequent hardware call fails
    /// and enumeration no longer lists the device.
    pub fn unplug(&self) {
        self.unplugged.store(true, Ordering::SeqCst);
    }

    /// Plugs the device back in (enumeration sees it again).
    pub fn replug(&self) {
        self.unplugged.store(false, Ordering::SeqCst);
    }
}

pub struct SyntheticBackend {
    devices: Vec<DeviceDescriptor>,
    open_serial: Option<String>,
    acquiring: bool,
    properties: BTreeMap<PropertyKey, PropertyNode>,
    tick: u8,
    controls: SyntheticControls,
}

impl SyntheticBackend {
    /// One virtual device with the default property table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_devices(1)
    }

    /// `count` virtual devices with consecutive serials.
    #[must_use]
    pub fn with_devices(count: usize) -> Self {
        let devices = (0..count)
            .map(|i| DeviceDescriptor {
                display_name: format!("Synthetic Camera {i}"),
                serial_id: format!("{}", 40_010_001 + i),
                raw_info: "synthetic test-pattern device".to_string(),
            })
            .collect();
        Self {
            devices,
            open_serial: None,
            acquiring: false,
            properties: default_property_table(),
            tick: 0,
            controls: SyntheticControls::default(),
        }
    }

    /// A backend with nothing attached, for exercising empty enumeration.
    #[must_use]
    pub fn without_devices() -> Self {
        Self::with_devices(0)
    }

    /// Clones the failure-injection handle.
    #[must_use]
    pub fn controls(&self) -> SyntheticControls {
        self.controls.clone()
    }

    fn ensure_plugged(&self) -> BackendResult<()> {
        if self.controls.unplugged.load(Ordering::SeqCst) {
            return Err(BackendError::Disconnected("device unplugged".to_string()));
        }
        Ok(())
    }

    fn ensure_open(&self) -> BackendResult<()> {
        self.ensure_plugged()?;
        if self.open_serial.is_none() {
            return Err(BackendError::Io("no device open".to_string()));
        }
        Ok(())
    }

    fn int_property(&self, key: PropertyKey, default: i64) -> i64 {
        match self.properties.get(&key).map(|n| &n.value) {
            Some(PropertyValue::Int(i)) => *i,
            _ => default,
        }
    }

    fn bool_property(&self, key: PropertyKey) -> bool {
        matches!(
            self.properties.get(&key).map(|n| &n.value),
            Some(PropertyValue::Bool(true))
        )
    }

    fn render_frame(&mut self) -> VideoFrame {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let width = self.int_property(PropertyKey::Width, 1280).max(1) as u32;
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        let height = self.int_property(PropertyKey::Height, 720).max(1) as u32;
        let reverse_x = self.bool_property(PropertyKey::ReverseX);
        let reverse_y = self.bool_property(PropertyKey::ReverseY);

        let tick = self.tick;
        self.tick = self.tick.wrapping_add(1);

        let mut rng = rand::thread_rng();
        let mut data = Vec::with_capacity(FrameFormat::Rgb8.buffer_len(width, height));
        for row in 0..height {
            let y = if reverse_y { height - 1 - row } else { row };
            for col in 0..width {
                let x = if reverse_x { width - 1 - col } else { col };
                let noise: u8 = rng.gen_range(0..8);
                data.push((x as u8 ^ tick).wrapping_add(noise));
                data.push((y as u8 ^ tick).wrapping_add(noise));
                data.push(((x.wrapping_add(y)) as u8 ^ tick).wrapping_add(noise));
            }
        }
        VideoFrame {
            width,
            height,
            format: FrameFormat::Rgb8,
            timestamp_ms: now_millis(),
            bytes: Arc::new(data),
        }
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for SyntheticBackend {
    fn enumerate(&mut self) -> BackendResult<Vec<DeviceDescriptor>> {
        if self.controls.unplugged.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(self.devices.clone())
    }

    fn open(&mut self, descriptor: &DeviceDescriptor) -> BackendResult<()> {
        self.ensure_plugged()?;
        if !self.devices.iter().any(|d| d.serial_id == descriptor.serial_id) {
            return Err(BackendError::Open(format!(
                "no such device: {}",
                descriptor.serial_id
            )));
        }
        self.open_serial = Some(descriptor.serial_id.clone());
        self.acquiring = false;
        self.properties = default_property_table();
        Ok(())
    }

    fn close(&mut self) {
        self.open_serial = None;
        self.acquiring = false;
    }

    fn start_acquisition(&mut self) -> BackendResult<()> {
        self.ensure_open()?;
        self.acquiring = true;
        Ok(())
    }

    fn stop_acquisition(&mut self) -> BackendResult<()> {
        self.ensure_open()?;
        self.acquiring = false;
        Ok(())
    }

    fn grab(&mut self, timeout: Duration) -> BackendResult<VideoFrame> {
        self.ensure_open()?;
        if !self.acquiring {
            return Err(BackendError::Io("acquisition not active".to_string()));
        }
        if self.controls.starved.load(Ordering::SeqCst) {
            thread::sleep(timeout);
            return Err(BackendError::Timeout);
        }
        Ok(self.render_frame())
    }

    fn read_property(&mut self, key: PropertyKey) -> BackendResult<PropertyNode> {
        self.ensure_open()?;
        self.properties
            .get(&key)
            .cloned()
            .ok_or(BackendError::Unsupported(key))
    }

    fn write_property(&mut self, key: PropertyKey, value: &PropertyValue) -> BackendResult<()> {
        self.ensure_open()?;
        let node = self
            .properties
            .get_mut(&key)
            .ok_or(BackendError::Unsupported(key))?;

        let matches_declared = match key.value_type() {
            PropertyType::Bool => matches!(value, PropertyValue::Bool(_)),
            PropertyType::Int => matches!(value, PropertyValue::Int(_)),
            PropertyType::Float => matches!(value, PropertyValue::Float(_)),
            PropertyType::Text => matches!(value, PropertyValue::Text(_)),
        };
        if !matches_declared {
            return Err(BackendError::Rejected {
                key,
                reason: "value type does not match property type".to_string(),
            });
        }

        if let (Some(min), Some(max), Some(v)) = (node.min, node.max, value.as_f64()) {
            if v < min || v > max {
                return Err(BackendError::Rejected {
                    key,
                    reason: format!("value {v} outside range [{min}, {max}]"),
                });
            }
        }

        if let PropertyValue::Text(text) = value {
            let accepted: &[&str] = match key {
                PropertyKey::TriggerMode => &["Off", "On"],
                PropertyKey::BalanceWhiteAuto => &["Off", "Once", "Continuous"],
                _ => &[],
            };
            if !accepted.contains(&text.as_str()) {
                return Err(BackendError::Rejected {
                    key,
                    reason: format!("unsupported enumeration value: {text}"),
                });
            }
        }

        node.value = value.clone();
        Ok(())
    }
}

fn default_property_table() -> BTreeMap<PropertyKey, PropertyNode> {
    let mut table = BTreeMap::new();
    table.insert(
        PropertyKey::ExposureTime,
        PropertyNode::with_range(
            PropertyKey::ExposureTime,
            PropertyValue::Float(10_000.0),
            20.0,
            10_000_000.0,
        ),
    );
    table.insert(
        PropertyKey::Gain,
        PropertyNode::with_range(PropertyKey::Gain, PropertyValue::Float(0.0), 0.0, 24.0),
    );
    table.insert(
        PropertyKey::Width,
        PropertyNode::with_range(PropertyKey::Width, PropertyValue::Int(1280), 64.0, 1920.0),
    );
    table.insert(
        PropertyKey::Height,
        PropertyNode::with_range(PropertyKey::Height, PropertyValue::Int(720), 48.0, 1080.0),
    );
    table.insert(
        PropertyKey::OffsetX,
        PropertyNode::with_range(PropertyKey::OffsetX, PropertyValue::Int(0), 0.0, 1856.0),
    );
    table.insert(
        PropertyKey::OffsetY,
        PropertyNode::with_range(PropertyKey::OffsetY, PropertyValue::Int(0), 0.0, 1032.0),
    );
    table.insert(
        PropertyKey::ReverseX,
        PropertyNode::new(PropertyKey::ReverseX, PropertyValue::Bool(false)),
    );
    table.insert(
        PropertyKey::ReverseY,
        PropertyNode::new(PropertyKey::ReverseY, PropertyValue::Bool(false)),
    );
    table.insert(
        PropertyKey::TriggerMode,
        PropertyNode::new(PropertyKey::TriggerMode, PropertyValue::Text("Off".into())),
    );
    table.insert(
        PropertyKey::BalanceWhiteAuto,
        PropertyNode::new(
            PropertyKey::BalanceWhiteAuto,
            PropertyValue::Text("Continuous".into()),
        ),
    );
    table.insert(
        PropertyKey::AcquisitionFrameRate,
        PropertyNode::with_range(
            PropertyKey::AcquisitionFrameRate,
            PropertyValue::Float(30.0),
            1.0,
            120.0,
        ),
    );
    table
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn open_backend() -> SyntheticBackend {
        let mut backend = SyntheticBackend::new();
        let device = backend.enumerate().unwrap().remove(0);
        backend.open(&device).unwrap();
        backend
    }

    #[test]
    fn enumerate_lists_configured_devices() {
        let mut backend = SyntheticBackend::with_devices(3);
        let devices = backend.enumerate().unwrap();
        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].serial_id, "40010001");
        assert_eq!(devices[2].serial_id, "40010003");
    }

    #[test]
    fn grab_respects_configured_geometry() {
        let mut backend = open_backend();
        backend
            .write_property(PropertyKey::Width, &PropertyValue::Int(320))
            .unwrap();
        backend
            .write_property(PropertyKey::Height, &PropertyValue::Int(240))
            .unwrap();
        backend.start_acquisition().unwrap();

        let frame = backend.grab(Duration::from_millis(50)).unwrap();
        assert_eq!(frame.width, 320);
        assert_eq!(frame.height, 240);
        assert_eq!(frame.len(), 320 * 240 * 3);
    }

    #[test]
    fn write_out_of_range_is_rejected_and_leaves_value() {
        let mut backend = open_backend();
        let err = backend
            .write_property(PropertyKey::Gain, &PropertyValue::Float(99.0))
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { key: PropertyKey::Gain, .. }));

        let node = backend.read_property(PropertyKey::Gain).unwrap();
        assert_eq!(node.value, PropertyValue::Float(0.0));
    }

    #[test]
    fn starved_grab_times_out_after_roughly_the_timeout() {
        let mut backend = open_backend();
        backend.controls().set_starved(true);
        backend.start_acquisition().unwrap();

        let started = std::time::Instant::now();
        let err = backend.grab(Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, BackendError::Timeout));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn unplug_fails_calls_and_hides_device() {
        let mut backend = open_backend();
        backend.controls().unplug();

        assert!(matches!(
            backend.start_acquisition(),
            Err(BackendError::Disconnected(_))
        ));
        assert!(backend.enumerate().unwrap().is_empty());
    }
}
