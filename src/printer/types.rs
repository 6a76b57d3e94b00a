//! Printer types: controller generation, status and errors.

use std::fmt;
use std::time::Duration;

/// Which Duet firmware API the controller speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterGeneration {
    /// Duet 2 / standalone RepRapFirmware (`rr_*` endpoints)
    Duet2,
    /// Duet 3 with DuetSoftwareFramework (`machine/*` endpoints)
    Duet3,
}

impl fmt::Display for PrinterGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterGeneration::Duet2 => write!(f, "Duet 2"),
            PrinterGeneration::Duet3 => write!(f, "Duet 3"),
        }
    }
}

/// Machine state as reported by the controller.
///
/// Only [`PrinterStatus::Idle`] means no motion is pending. Anything the
/// firmware reports that is not recognised ends up in `Unknown` and is
/// treated as busy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterStatus {
    Idle,
    Busy,
    Processing,
    Paused,
    Pausing,
    Resuming,
    Cancelling,
    ChangingTool,
    Simulating,
    Halted,
    Off,
    Starting,
    Updating,
    Unknown(String),
}

impl PrinterStatus {
    /// Map an object-model status string (`state.status` on Duet 3).
    ///
    /// Matching is exact apart from ASCII case; `"idle"` is idle, `"idler"`
    /// is not.
    pub fn from_object_model(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "idle" => PrinterStatus::Idle,
            "busy" => PrinterStatus::Busy,
            "processing" => PrinterStatus::Processing,
            "paused" => PrinterStatus::Paused,
            "pausing" => PrinterStatus::Pausing,
            "resuming" => PrinterStatus::Resuming,
            "cancelling" | "canceling" => PrinterStatus::Cancelling,
            "changingtool" => PrinterStatus::ChangingTool,
            "simulating" => PrinterStatus::Simulating,
            "halted" => PrinterStatus::Halted,
            "off" => PrinterStatus::Off,
            "starting" => PrinterStatus::Starting,
            "updating" => PrinterStatus::Updating,
            _ => PrinterStatus::Unknown(value.to_string()),
        }
    }

    /// Map a RepRapFirmware single-letter status code (`rr_status` on Duet 2).
    pub fn from_status_code(code: &str) -> Self {
        match code.trim() {
            "I" => PrinterStatus::Idle,
            "B" => PrinterStatus::Busy,
            "P" => PrinterStatus::Processing,
            "S" => PrinterStatus::Paused,
            "D" => PrinterStatus::Pausing,
            "R" => PrinterStatus::Resuming,
            "T" => PrinterStatus::ChangingTool,
            "M" => PrinterStatus::Simulating,
            "H" => PrinterStatus::Halted,
            "O" => PrinterStatus::Off,
            "C" => PrinterStatus::Starting,
            "F" => PrinterStatus::Updating,
            other => PrinterStatus::Unknown(other.to_string()),
        }
    }

    /// Whether it is safe to issue the next motion command.
    pub fn is_idle(&self) -> bool {
        matches!(self, PrinterStatus::Idle)
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrinterStatus::Idle => "idle",
            PrinterStatus::Busy => "busy",
            PrinterStatus::Processing => "processing",
            PrinterStatus::Paused => "paused",
            PrinterStatus::Pausing => "pausing",
            PrinterStatus::Resuming => "resuming",
            PrinterStatus::Cancelling => "cancelling",
            PrinterStatus::ChangingTool => "changingTool",
            PrinterStatus::Simulating => "simulating",
            PrinterStatus::Halted => "halted",
            PrinterStatus::Off => "off",
            PrinterStatus::Starting => "starting",
            PrinterStatus::Updating => "updating",
            PrinterStatus::Unknown(raw) => return write!(f, "unknown ({raw})"),
        };
        f.write_str(name)
    }
}

/// Errors that can occur while talking to the printer.
#[derive(Debug, thiserror::Error)]
pub enum PrinterError {
    #[error(
        "Duet Web API client could not be initialised: {0}\n\
         The HTTP stack (reqwest with a TLS backend) is required.\n\
         Obtain a working build from https://github.com/seanmonstar/reqwest"
    )]
    ClientInit(#[source] reqwest::Error),

    #[error("Device at {address} either did not respond or is not a Duet V2 or V3 printer.")]
    NotDetected {
        /// Address the probe was sent to
        address: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Printer rejected {command:?} with HTTP {status}")]
    CommandRejected {
        /// The G-code that was sent
        command: String,
        /// HTTP status code returned by the controller
        status: u16,
    },

    #[error("Malformed status response: {0}")]
    MalformedStatus(String),

    #[error("Printer did not become idle within {waited:?} (last status: {last_status})")]
    IdleTimeout {
        /// How long we polled for
        waited: Duration,
        /// The status seen on the final poll
        last_status: PrinterStatus,
    },
}
