//! Camera capture module for webcam access and still frames.
//!
//! This module provides:
//! - Device enumeration via [`list_devices`]
//! - Blocking frame reads via [`CameraCapture`] and the [`FrameSource`] seam
//! - JPEG persistence via [`save_jpeg`]

mod capture;
mod device;
mod frame_utils;
mod types;

pub use capture::{CameraCapture, FrameSource};
pub use device::list_devices;
pub use frame_utils::save_jpeg;
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, FrameFormat, Resolution};
