//! Capture session: park the carriage, jitter it, photograph it, archive.

mod offsets;
mod workflow;

pub use offsets::{capture_file_name, random_sign, Jitter, JITTER_OFFSETS_MM};
pub use workflow::{
    capture_frame, capture_pass, execute, move_to_control_point, CapturePlan, ControlPoint,
    DEFAULT_DISCARD_FRAMES, DEFAULT_REPEAT,
};
