//! Command-line interface definitions and helpers.

mod args;
mod commands;

pub use args::{normalize_args, Args, Command, DEFAULT_DUET};
pub use commands::list_cameras;
