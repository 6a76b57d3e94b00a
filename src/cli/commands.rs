//! Subcommand handlers.

use std::process::ExitCode;

use crate::camera;

/// List available cameras and print them to stdout.
pub fn list_cameras() -> ExitCode {
    match camera::list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and this user can open /dev/video*.");
            } else {
                println!("Available cameras:");
                for device in devices {
                    println!("  {}", device);
                }
                println!();
                println!("Use -camera <index> to select a camera.");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
