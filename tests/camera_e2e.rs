//! Hardware tests for camera capture.
//!
//! These tests verify:
//! - Device enumeration works (or fails cleanly) on this machine
//! - A real camera delivers frames that encode to JPEG
//! - A missing camera is reported with the device index
//!
//! Tests that need a webcam print SKIP and pass when none is attached.

use capture_offsets::camera::{
    list_devices, save_jpeg, CameraCapture, CameraError, CameraSettings, FrameSource,
};
use capture_offsets::session::capture_frame;

fn first_camera() -> Option<u32> {
    match list_devices() {
        Ok(devices) => devices.first().map(|d| d.index),
        Err(e) => {
            println!("SKIP: camera enumeration unavailable: {}", e);
            None
        }
    }
}

/// Enumeration returns devices (or an empty list) and prints them.
#[test]
fn test_list_devices() {
    match list_devices() {
        Ok(devices) => {
            println!("Found {} camera device(s)", devices.len());
            for device in &devices {
                println!("  {}", device);
            }
        }
        Err(e) => println!("SKIP: camera enumeration unavailable: {}", e),
    }
}

/// A real camera opens at the capture settings and yields a full frame.
#[test]
fn test_camera_reads_frame() {
    let Some(index) = first_camera() else {
        println!("SKIP: No cameras available for this test");
        return;
    };

    let mut camera =
        CameraCapture::open(CameraSettings::for_device(index)).expect("Should open camera");
    println!("  Actual resolution: {:?}", camera.actual_resolution());
    println!("  Actual FPS: {}", camera.actual_fps());

    let frame = camera.read_frame().expect("Should read a frame");
    assert_eq!(
        frame.data.len(),
        frame.width as usize * frame.height as usize * frame.bytes_per_pixel()
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.jpg");
    save_jpeg(&frame, &path).expect("Should encode JPEG");
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

/// The discard-then-save sequence works against real hardware.
#[test]
fn test_capture_frame_with_discards() {
    let Some(index) = first_camera() else {
        println!("SKIP: No cameras available for this test");
        return;
    };

    let mut camera =
        CameraCapture::open(CameraSettings::for_device(index)).expect("Should open camera");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture_0.025_001.jpg");

    capture_frame(&mut camera, 4, &path).expect("Should capture");
    assert!(path.exists());
}

/// Missing camera is reported with its index.
#[test]
fn test_handles_missing_camera() {
    let result = CameraCapture::open(CameraSettings::for_device(999));

    match result {
        Err(CameraError::DeviceNotFound(idx)) => assert_eq!(idx, 999),
        Err(CameraError::QueryFailed(e)) => println!("SKIP: enumeration unavailable: {}", e),
        Err(other) => panic!("Expected DeviceNotFound error, got: {:?}", other),
        Ok(_) => panic!("Device 999 should not exist"),
    }
}
