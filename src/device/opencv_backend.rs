//! Camera backend over `OpenCV`'s `VideoCapture`.
//!
//! Maps the recognized property keys onto the `CAP_PROP_*` ids that
//! `VideoCapture` actually exposes; the rest report `Unsupported` and
//! are omitted from property listings. Range metadata is unavailable
//! through this API, so nodes carry no min/max.

use std::time::Duration;

use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture, VideoCaptureTrait, VideoCaptureTraitConst},
};

use crate::{
    device::{
        backend::CameraBackend,
        backend_error::{BackendError, BackendResult},
        descriptor::DeviceDescriptor,
        property::{PropertyKey, PropertyNode, PropertyType, PropertyValue},
    },
    frame::{frame_format::FrameFormat, video_frame::VideoFrame},
};

/// Highest device index probed during enumeration.
const MAX_PROBE_INDEX: i32 = 4;

pub struct OpenCvBackend {
    cam: Option<VideoCapture>,
    width: u32,
    height: u32,
}

impl OpenCvBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cam: None,
            width: 0,
            height: 0,
        }
    }

    fn cam_mut(&mut self) -> BackendResult<&mut VideoCapture> {
        self.cam
            .as_mut()
            .ok_or_else(|| BackendError::Io("no device open".to_string()))
    }

    const fn cap_prop(key: PropertyKey) -> Option<i32> {
        match key {
            PropertyKey::ExposureTime => Some(videoio::CAP_PROP_EXPOSURE),
            PropertyKey::Gain => Some(videoio::CAP_PROP_GAIN),
            PropertyKey::Width => Some(videoio::CAP_PROP_FRAME_WIDTH),
            PropertyKey::Height => Some(videoio::CAP_PROP_FRAME_HEIGHT),
            PropertyKey::BalanceWhiteAuto => Some(videoio::CAP_PROP_AUTO_WB),
            PropertyKey::AcquisitionFrameRate => Some(videoio::CAP_PROP_FPS),
            PropertyKey::OffsetX
            | PropertyKey::OffsetY
            | PropertyKey::ReverseX
            | PropertyKey::ReverseY
            | PropertyKey::TriggerMode => None,
        }
    }

    fn raw_to_value(key: PropertyKey, raw: f64) -> PropertyValue {
        match key.value_type() {
            PropertyType::Float => PropertyValue::Float(raw),
            #[allow(clippy::cast_possible_truncation)]
            PropertyType::Int => PropertyValue::Int(raw.round() as i64),
            PropertyType::Bool => PropertyValue::Bool(raw != 0.0),
            PropertyType::Text => {
                // Only BalanceWhiteAuto lands here: the auto-WB toggle.
                if raw == 0.0 {
                    PropertyValue::Text("Off".to_string())
                } else {
                    PropertyValue::Text("Continuous".to_string())
                }
            }
        }
    }

    fn value_to_raw(key: PropertyKey, value: &PropertyValue) -> BackendResult<f64> {
        match value {
            PropertyValue::Float(x) => Ok(*x),
            #[allow(clippy::cast_precision_loss)]
            PropertyValue::Int(i) => Ok(*i as f64),
            PropertyValue::Bool(b) => Ok(f64::from(u8::from(*b))),
            PropertyValue::Text(s) => match s.as_str() {
                "Off" => Ok(0.0),
                "Once" | "Continuous" => Ok(1.0),
                other => Err(BackendError::Rejected {
                    key,
                    reason: format!("unsupported enumeration value: {other}"),
                }),
            },
        }
    }
}

impl Default for OpenCvBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for OpenCvBackend {
    fn enumerate(&mut self) -> BackendResult<Vec<DeviceDescriptor>> {
        // VideoCapture has no enumeration API; probing low indices is
        // the conventional substitute.
        let mut devices = Vec::new();
        for index in 0..=MAX_PROBE_INDEX {
            let Ok(cam) = VideoCapture::new(index, videoio::CAP_ANY) else {
                continue;
            };
            if cam.is_opened().unwrap_or(false) {
                devices.push(DeviceDescriptor {
                    display_name: format!("OpenCV Camera {index}"),
                    serial_id: index.to_string(),
                    raw_info: format!("VideoCapture index {index}"),
                });
            }
            drop(cam);
        }
        Ok(devices)
    }

    fn open(&mut self, descriptor: &DeviceDescriptor) -> BackendResult<()> {
        let index: i32 = descriptor
            .serial_id
            .parse()
            .map_err(|_| BackendError::Open(format!("invalid device index: {}", descriptor.serial_id)))?;

        let cam = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|e| BackendError::Open(e.to_string()))?;
        if !cam.is_opened().unwrap_or(false) {
            return Err(BackendError::Open(format!(
                "failed to open device index {index}"
            )));
        }

        let width_f64 = cam
            .get(videoio::CAP_PROP_FRAME_WIDTH)
            .map_err(|e| BackendError::Open(e.to_string()))?
            .clamp(1.0, 8192.0);
        let height_f64 = cam
            .get(videoio::CAP_PROP_FRAME_HEIGHT)
            .map_err(|e| BackendError::Open(e.to_string()))?
            .clamp(1.0, 8192.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.width = width_f64.round() as u32;
            self.height = height_f64.round() as u32;
        }
        self.cam = Some(cam);
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut cam) = self.cam.take() {
            let _ = cam.release();
        }
    }

    fn start_acquisition(&mut self) -> BackendResult<()> {
        // VideoCapture streams implicitly once opened; opening is the
        // acquisition start as far as this driver is concerned.
        self.cam_mut().map(|_| ())
    }

    fn stop_acquisition(&mut self) -> BackendResult<()> {
        self.cam_mut().map(|_| ())
    }

    fn grab(&mut self, _timeout: Duration) -> BackendResult<VideoFrame> {
        // The driver enforces its own internal read wait; a failed or
        // empty read is reported as a timeout rather than a fault.
        let width = self.width;
        let height = self.height;
        let cam = self.cam_mut()?;

        let mut frame = Mat::default();
        if !cam.read(&mut frame).unwrap_or(false) || frame.empty() {
            return Err(BackendError::Timeout);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(
            &frame,
            &mut rgb,
            imgproc::COLOR_BGR2RGB,
            0,
            core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| BackendError::Io(format!("cvtColor: {e}")))?;

        let bytes = tight_rgb_bytes(&rgb, width, height)
            .map_err(|e| BackendError::Io(format!("pack RGB: {e}")))?;

        VideoFrame::from_bytes(width, height, FrameFormat::Rgb8, bytes)
            .ok_or_else(|| BackendError::Io("frame buffer size mismatch".to_string()))
    }

    fn read_property(&mut self, key: PropertyKey) -> BackendResult<PropertyNode> {
        let prop = Self::cap_prop(key).ok_or(BackendError::Unsupported(key))?;
        let cam = self.cam_mut()?;
        let raw = cam
            .get(prop)
            .map_err(|e| BackendError::Io(e.to_string()))?;
        Ok(PropertyNode::new(key, Self::raw_to_value(key, raw)))
    }

    fn write_property(&mut self, key: PropertyKey, value: &PropertyValue) -> BackendResult<()> {
        let prop = Self::cap_prop(key).ok_or(BackendError::Unsupported(key))?;
        let raw = Self::value_to_raw(key, value)?;
        let cam = self.cam_mut()?;
        let accepted = cam
            .set(prop, raw)
            .map_err(|e| BackendError::Io(e.to_string()))?;
        if !accepted {
            return Err(BackendError::Rejected {
                key,
                reason: format!("driver refused value {raw}"),
            });
        }
        if key == PropertyKey::Width || key == PropertyKey::Height {
            // Keep the cached frame geometry in sync with the driver.
            if let Ok(w) = cam.get(videoio::CAP_PROP_FRAME_WIDTH) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    self.width = w.clamp(1.0, 8192.0).round() as u32;
                }
            }
            if let Ok(h) = cam.get(videoio::CAP_PROP_FRAME_HEIGHT) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    self.height = h.clamp(1.0, 8192.0).round() as u32;
                }
            }
        }
        Ok(())
    }
}

impl Drop for OpenCvBackend {
    fn drop(&mut self) {
        self.close();
    }
}

/// Always returns tightly packed RGB (len = width*height*3), regardless of stride/continuity.
fn tight_rgb_bytes(mat: &Mat, width: u32, height: u32) -> opencv::Result<Vec<u8>> {
    let m = if mat.is_continuous() {
        mat.try_clone()?
    } else {
        mat.clone()
    };

    let w = width as usize;
    let h = height as usize;
    let ch = m.channels() as usize;
    let expected = w * h * ch;

    let data = m.data_bytes()?;

    // Fast path: already tight
    if data.len() == expected {
        return Ok(data.to_vec());
    }

    // Row-copy using actual step
    let step_elems = m.step1(0)?;
    let elem_size = m.elem_size()?;
    let step_bytes = step_elems * elem_size;

    let cols = m.cols() as usize;
    let rows = m.rows() as usize;
    let row_bytes = cols * ch;

    let mut out = vec![0u8; rows * row_bytes];
    for r in 0..rows {
        let src = &data[r * step_bytes..r * step_bytes + row_bytes];
        let dst = &mut out[r * row_bytes..(r + 1) * row_bytes];
        dst.copy_from_slice(src);
    }
    Ok(out)
}
