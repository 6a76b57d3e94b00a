//! Top-level error type and process exit statuses.

use std::io;

use crate::archive::ArchiveError;
use crate::camera::CameraError;
use crate::config::ConfigError;
use crate::printer::PrinterError;

/// Process exit statuses, one per fatal condition.
///
/// The values are the 8-bit statuses earlier capture scripts produced, so
/// wrappers that check for them keep working.
pub mod exit_code {
    /// The HTTP client stack could not be initialised.
    pub const MISSING_HTTP_STACK: u8 = 102;
    /// Started from an SSH session instead of the graphics console.
    pub const REMOTE_SESSION: u8 = 136;
    /// Printer did not answer or is not a Duet 2/3.
    pub const PRINTER_UNREACHABLE: u8 = 34;
    /// Webcam could not be opened.
    pub const WEBCAM: u8 = 255;
    /// Temporary capture directory could not be created.
    pub const TEMP_DIR: u8 = 254;
    /// Archive could not be written.
    pub const ARCHIVE: u8 = 253;
    /// Printer command, idle wait or frame capture failed mid-run.
    pub const RUN_FAILED: u8 = 1;
    /// Invalid configuration file or values.
    pub const CONFIG: u8 = 2;
}

/// Errors that abort a capture run.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("This program MUST run on the graphics console, not an SSH session.")]
    RemoteSession,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Printer(#[from] PrinterError),

    #[error("Failed to open webcam stream: {0}")]
    CameraOpen(#[source] CameraError),

    #[error("Failed to create capture directory: {0}")]
    TempDir(#[source] io::Error),

    #[error("Frame capture failed: {0}")]
    Capture(#[source] CameraError),

    #[error("Cannot create tarfile: {0}")]
    Archive(#[from] ArchiveError),
}

impl CaptureError {
    /// Exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            CaptureError::RemoteSession => exit_code::REMOTE_SESSION,
            CaptureError::Config(_) => exit_code::CONFIG,
            CaptureError::Printer(PrinterError::ClientInit(_)) => exit_code::MISSING_HTTP_STACK,
            CaptureError::Printer(PrinterError::NotDetected { .. }) => {
                exit_code::PRINTER_UNREACHABLE
            }
            CaptureError::Printer(_) => exit_code::RUN_FAILED,
            CaptureError::CameraOpen(_) => exit_code::WEBCAM,
            CaptureError::TempDir(_) => exit_code::TEMP_DIR,
            CaptureError::Capture(_) => exit_code::RUN_FAILED,
            CaptureError::Archive(_) => exit_code::ARCHIVE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_fatal_conditions_have_distinct_codes() {
        let codes = [
            exit_code::MISSING_HTTP_STACK,
            exit_code::REMOTE_SESSION,
            exit_code::PRINTER_UNREACHABLE,
            exit_code::WEBCAM,
            exit_code::TEMP_DIR,
            exit_code::ARCHIVE,
            exit_code::RUN_FAILED,
            exit_code::CONFIG,
        ];
        let unique: HashSet<u8> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len());
        assert!(!unique.contains(&0));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(CaptureError::RemoteSession.exit_code(), 136);
        assert_eq!(
            CaptureError::from(PrinterError::NotDetected {
                address: "http://x".to_string()
            })
            .exit_code(),
            34
        );
        assert_eq!(
            CaptureError::from(PrinterError::IdleTimeout {
                waited: Duration::from_secs(1),
                last_status: crate::printer::PrinterStatus::Busy,
            })
            .exit_code(),
            1
        );
        assert_eq!(
            CaptureError::CameraOpen(CameraError::DeviceNotFound(1)).exit_code(),
            255
        );
        assert_eq!(
            CaptureError::TempDir(io::Error::new(io::ErrorKind::Other, "full")).exit_code(),
            254
        );
        assert_eq!(
            CaptureError::from(ArchiveError::Finish(io::Error::new(
                io::ErrorKind::Other,
                "disk full"
            )))
            .exit_code(),
            253
        );
        assert_eq!(
            CaptureError::from(ConfigError::Invalid("repeat must be at least 1".to_string()))
                .exit_code(),
            2
        );
        assert_eq!(
            CaptureError::Capture(CameraError::SaveFailed {
                path: PathBuf::from("x.jpg"),
                source: image::ImageError::IoError(io::Error::new(io::ErrorKind::Other, "x")),
            })
            .exit_code(),
            1
        );
    }

    #[test]
    fn test_remote_session_message() {
        assert_eq!(
            CaptureError::RemoteSession.to_string(),
            "This program MUST run on the graphics console, not an SSH session."
        );
    }
}
