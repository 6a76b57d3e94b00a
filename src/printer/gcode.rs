//! G-code commands issued during a capture run.

/// Deselect every tool so the carriage is free to move.
pub const UNLOAD_TOOL: &str = "T-1";

/// Block the motion queue until all queued moves have finished.
pub const MOTION_COMPLETE: &str = "M400";

/// Feed rate for jitter moves, in mm/min.
pub const JITTER_FEED_RATE: u32 = 12000;

/// Absolute move to an X/Y position.
pub fn absolute_move(x: f64, y: f64) -> String {
    format!("G90 G1 X{} Y{}", x, y)
}

/// Relative move by `(dx, dy)` that switches back to absolute positioning.
pub fn relative_jitter(dx: f64, dy: f64) -> String {
    format!("G91 G1 X{} Y{} F{} G90", dx, dy, JITTER_FEED_RATE)
}
