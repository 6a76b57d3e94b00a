//! The jitter-and-capture run, from tool unload to finished archive.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::Rng;

use super::offsets::{capture_file_name, Jitter, JITTER_OFFSETS_MM};
use crate::archive::{self, ArchiveSummary};
use crate::camera::{save_jpeg, CameraError, FrameSource};
use crate::error::CaptureError;
use crate::printer::{gcode, wait_for_idle, PollPolicy, PrinterControl, PrinterError};

/// Frames read and thrown away before each saved frame.
pub const DEFAULT_DISCARD_FRAMES: u32 = 4;

/// Default number of captures per offset.
pub const DEFAULT_REPEAT: u32 = 10;

/// X/Y position that puts the carriage over the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

/// Everything a capture run needs besides its devices.
#[derive(Debug, Clone)]
pub struct CapturePlan {
    pub control_point: ControlPoint,
    /// Captures per offset magnitude
    pub repeat: u32,
    pub discard_frames: u32,
    pub poll: PollPolicy,
    /// Where the finished archive is written
    pub output: PathBuf,
    /// Parent of the temporary capture directory; the system temp dir if unset
    pub scratch_dir: Option<PathBuf>,
}

/// Absolute move to the control point, then wait for the move to finish.
pub fn move_to_control_point<P>(
    printer: &P,
    point: ControlPoint,
    poll: &PollPolicy,
) -> Result<(), PrinterError>
where
    P: PrinterControl + ?Sized,
{
    printer.send_gcode(&gcode::absolute_move(point.x, point.y))?;
    wait_for_idle(printer, poll)
}

/// Flush `discard` stale frames, then save the next one as JPEG at `path`.
///
/// Failures while discarding are logged and ignored; only the saved frame
/// has to be readable.
pub fn capture_frame<C>(camera: &mut C, discard: u32, path: &Path) -> Result<(), CameraError>
where
    C: FrameSource + ?Sized,
{
    for n in 0..discard {
        if let Err(e) = camera.read_frame() {
            log::debug!("Discard read {} failed: {}", n + 1, e);
        }
    }
    let frame = camera.read_frame()?;
    save_jpeg(&frame, path)
}

/// One pass of `plan.repeat` jittered captures at `offset` mm.
///
/// Returns the paths of the saved frames in capture order.
pub fn capture_pass<P, C, R>(
    printer: &P,
    camera: &mut C,
    rng: &mut R,
    offset: f64,
    plan: &CapturePlan,
    dir: &Path,
) -> Result<Vec<PathBuf>, CaptureError>
where
    P: PrinterControl + ?Sized,
    C: FrameSource + ?Sized,
    R: Rng + ?Sized,
{
    let mut saved = Vec::with_capacity(plan.repeat as usize);

    for sequence in 1..=plan.repeat {
        let jitter = Jitter::random(offset, rng);
        let command = gcode::relative_jitter(jitter.dx, jitter.dy);

        print!("\rMove #{}: {} ", sequence, command);
        let _ = io::stdout().flush();

        printer.send_gcode(&command)?;
        printer.send_gcode(gcode::MOTION_COMPLETE)?;
        wait_for_idle(printer, &plan.poll)?;

        let path = dir.join(capture_file_name(offset, sequence));
        capture_frame(camera, plan.discard_frames, &path).map_err(CaptureError::Capture)?;
        log::debug!("Saved {}", path.display());
        saved.push(path);
    }
    println!();

    Ok(saved)
}

/// Run the whole capture sequence and write the archive.
///
/// The camera is opened only once the printer is parked at the control
/// point, so a camera failure happens before any jitter move. The camera
/// handle and the temporary capture directory live in this scope and are
/// released on every return path.
///
/// # Errors
/// * `CaptureError::Printer` - a command failed or the printer never went idle
/// * `CaptureError::CameraOpen` - `open_camera` failed
/// * `CaptureError::TempDir` - the capture directory could not be created
/// * `CaptureError::Capture` - a frame could not be read or saved
/// * `CaptureError::Archive` - the tarball could not be written
pub fn execute<P, C, O, R>(
    printer: &P,
    open_camera: O,
    rng: &mut R,
    plan: &CapturePlan,
) -> Result<ArchiveSummary, CaptureError>
where
    P: PrinterControl + ?Sized,
    C: FrameSource,
    O: FnOnce() -> Result<C, CameraError>,
    R: Rng + ?Sized,
{
    println!("Unloading tools.");
    printer.send_gcode(gcode::UNLOAD_TOOL)?;
    wait_for_idle(printer, &plan.poll)?;

    println!(
        "Moving to control point and running with 1st offset of {}mm",
        JITTER_OFFSETS_MM[0]
    );
    move_to_control_point(printer, plan.control_point, &plan.poll)?;

    println!("Setting up webcam for capture..");
    let mut camera = open_camera().map_err(CaptureError::CameraOpen)?;

    println!("Setting up temporary directory for captures..");
    let mut builder = tempfile::Builder::new();
    builder.prefix("capture-offsets-");
    let workdir = match &plan.scratch_dir {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    }
    .map_err(CaptureError::TempDir)?;
    log::debug!("Capturing into {}", workdir.path().display());

    for (pass, offset) in JITTER_OFFSETS_MM.iter().copied().enumerate() {
        if pass > 0 {
            println!(
                "Returning to control point and running with offset of {}mm",
                offset
            );
            move_to_control_point(printer, plan.control_point, &plan.poll)?;
        }
        let saved = capture_pass(printer, &mut camera, rng, offset, plan, workdir.path())?;
        log::info!("Pass {} at {}mm: {} frames", pass + 1, offset, saved.len());
    }

    println!("Returning to control point.");
    move_to_control_point(printer, plan.control_point, &plan.poll)?;

    println!("Compressing images into archive.");
    let summary = archive::write_archive(workdir.path(), &plan.output)?;

    Ok(summary)
}
