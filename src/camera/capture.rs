//! Camera capture handle and public API.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;

use super::device::list_devices;
use super::frame_utils::convert_to_rgb;
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Anything that can hand out frames one blocking read at a time.
pub trait FrameSource {
    /// Block until the next frame is available and return it.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;
}

/// Camera capture handle.
///
/// Wraps a nokhwa Camera with its stream already open. Frames are read
/// synchronously on the caller's thread; there is no background buffer, so
/// a read returns whatever the driver queue holds next.
///
/// The stream is stopped when the handle is dropped.
pub struct CameraCapture {
    camera: Camera,
    settings: CameraSettings,
    actual_resolution: Resolution,
    actual_fps: u32,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("actual_resolution", &self.actual_resolution)
            .field("actual_fps", &self.actual_fps)
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Open a camera and start its stream.
    ///
    /// # Errors
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    /// * `CameraError::PermissionDenied` - If the device node is not accessible
    /// * `CameraError::OpenFailed` - If no requested format could be negotiated
    /// * `CameraError::StreamFailed` - If the stream fails to start
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        let index = CameraIndex::Index(settings.device_index);
        let mut camera = open_camera_with_fallback(&index, &settings)?;

        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let res = camera.resolution();
        let actual_resolution = Resolution {
            width: res.width(),
            height: res.height(),
        };
        let actual_fps = camera.frame_rate();

        log::info!(
            "Camera {} streaming at {}x{} @ {} fps",
            settings.device_index,
            actual_resolution.width,
            actual_resolution.height,
            actual_fps
        );
        if actual_resolution != settings.resolution {
            log::warn!(
                "Camera does not support {}x{}, using {}x{}",
                settings.resolution.width,
                settings.resolution.height,
                actual_resolution.width,
                actual_resolution.height
            );
        }
        // nokhwa sizes the driver queue itself
        log::debug!(
            "Requested buffer depth {}; stale frames are flushed by discarding reads",
            settings.buffer_size
        );

        Ok(Self {
            camera,
            settings,
            actual_resolution,
            actual_fps,
        })
    }

    /// Get the resolution the camera negotiated.
    pub fn actual_resolution(&self) -> Resolution {
        self.actual_resolution
    }

    /// Get the frame rate the camera negotiated.
    pub fn actual_fps(&self) -> u32 {
        self.actual_fps
    }
}

impl FrameSource for CameraCapture {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let raw = self
            .camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
        convert_to_rgb(&raw)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {}", e);
        }
        log::debug!("Camera {} released", self.settings.device_index);
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);

    // 1. MJPEG (cheap on USB bandwidth, most UVC webcams)
    // 2. YUYV (uncompressed, universally supported by UVC)
    // 3. Whatever frame rate the camera offers at the requested size
    let format_attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::YUYV,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::HighestResolution(resolution)),
    ];

    let mut last_error = None;

    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no format could be negotiated".to_string());
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("access") {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(message))
    }
}
