//! Printer control over the Duet HTTP API.
//!
//! This module provides:
//! - The [`PrinterControl`] seam the capture workflow drives
//! - A Duet 2 / Duet 3 implementation via [`DuetClient`]
//! - G-code builders in [`gcode`] and bounded idle polling via [`wait_for_idle`]

mod client;
pub mod gcode;
mod types;
mod wait;

pub use client::{base_url_for, DuetClient};
pub use types::{PrinterError, PrinterGeneration, PrinterStatus};
pub use wait::{wait_for_idle, PollPolicy, DEFAULT_IDLE_TIMEOUT, DEFAULT_POLL_INTERVAL};

/// A printer that accepts G-code and reports its state.
pub trait PrinterControl {
    /// Send one line of G-code. Completion of any motion is not awaited.
    fn send_gcode(&self, command: &str) -> Result<(), PrinterError>;

    /// Fetch the current machine status.
    fn status(&self) -> Result<PrinterStatus, PrinterError>;
}
