//! Frame conversion and persistence.

use image::{ColorType, ImageFormat};
use nokhwa::pixel_format::RgbFormat;
use std::path::Path;

use super::types::{CameraError, Frame, FrameFormat};

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Handles the camera's native format (MJPEG, YUYV, ...) through nokhwa's
/// `decode_image`.
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Result<Frame, CameraError> {
    let decoded = buffer
        .decode_image::<RgbFormat>()
        .map_err(|e| CameraError::DecodeFailed(e.to_string()))?;
    let resolution = buffer.resolution();

    Ok(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        format: FrameFormat::Rgb,
    })
}

/// Encode `frame` as JPEG at `path`, straight from the frame's buffer.
pub fn save_jpeg(frame: &Frame, path: &Path) -> Result<(), CameraError> {
    let expected = frame.width as usize * frame.height as usize * frame.bytes_per_pixel();
    if frame.data.len() != expected {
        return Err(CameraError::DecodeFailed(format!(
            "frame is {}x{} but holds {} bytes (expected {})",
            frame.width,
            frame.height,
            frame.data.len(),
            expected
        )));
    }

    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        ColorType::Rgb8,
        ImageFormat::Jpeg,
    )
    .map_err(|source| CameraError::SaveFailed {
        path: path.to_path_buf(),
        source,
    })
}
