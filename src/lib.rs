//! capture-offsets library crate.
//!
//! Drives a Duet-controlled carriage to a control point above a webcam,
//! captures frames while jittering it by 0.025mm and 0.05mm, and packs the
//! frames into `capture_offsets.tar.gz`.
//!
//! The modules are public so the workflow can be driven from integration
//! tests with fake printers and cameras.

pub mod archive;
pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod preflight;
pub mod printer;
pub mod session;

pub use error::CaptureError;
