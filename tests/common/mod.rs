//! In-memory printer and camera used by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use capture_offsets::camera::{CameraError, Frame, FrameFormat, FrameSource};
use capture_offsets::printer::{PollPolicy, PrinterControl, PrinterError, PrinterStatus};
use capture_offsets::session::{CapturePlan, ControlPoint};

/// Records every G-code line and reports busy for a few polls after motion.
pub struct FakePrinter {
    pub commands: RefCell<Vec<String>>,
    busy_polls: Cell<u32>,
    polls_per_move: u32,
    never_idle: bool,
    reject: Option<String>,
}

impl FakePrinter {
    pub fn new() -> Self {
        Self {
            commands: RefCell::new(Vec::new()),
            busy_polls: Cell::new(0),
            polls_per_move: 1,
            never_idle: false,
            reject: None,
        }
    }

    /// Never reports idle.
    pub fn stuck() -> Self {
        Self {
            never_idle: true,
            ..Self::new()
        }
    }

    /// Rejects the first command that starts with `prefix`.
    pub fn rejecting(prefix: &str) -> Self {
        Self {
            reject: Some(prefix.to_string()),
            ..Self::new()
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn commands_starting_with(&self, prefix: &str) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl PrinterControl for FakePrinter {
    fn send_gcode(&self, command: &str) -> Result<(), PrinterError> {
        if let Some(prefix) = &self.reject {
            if command.starts_with(prefix.as_str()) {
                return Err(PrinterError::CommandRejected {
                    command: command.to_string(),
                    status: 500,
                });
            }
        }
        self.commands.borrow_mut().push(command.to_string());
        self.busy_polls.set(self.polls_per_move);
        Ok(())
    }

    fn status(&self) -> Result<PrinterStatus, PrinterError> {
        if self.never_idle {
            return Ok(PrinterStatus::Processing);
        }
        let remaining = self.busy_polls.get();
        if remaining > 0 {
            self.busy_polls.set(remaining - 1);
            Ok(PrinterStatus::Busy)
        } else {
            Ok(PrinterStatus::Idle)
        }
    }
}

/// Counters shared between a test and the camera it hands out.
#[derive(Clone, Default)]
pub struct CameraProbe {
    pub reads: Rc<Cell<u32>>,
    pub releases: Rc<Cell<u32>>,
    pub opened: Rc<Cell<bool>>,
}

/// Produces small gradient frames; optionally fails every read from a
/// given read number on.
pub struct FakeCamera {
    probe: CameraProbe,
    fail_from_read: Option<u32>,
}

impl FakeCamera {
    pub fn new(probe: &CameraProbe) -> Self {
        probe.opened.set(true);
        Self {
            probe: probe.clone(),
            fail_from_read: None,
        }
    }

    pub fn failing_from(probe: &CameraProbe, read: u32) -> Self {
        let mut camera = Self::new(probe);
        camera.fail_from_read = Some(read);
        camera
    }
}

impl FrameSource for FakeCamera {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let n = self.probe.reads.get() + 1;
        self.probe.reads.set(n);

        if self.fail_from_read.is_some_and(|from| n >= from) {
            return Err(CameraError::ReadFailed("device unplugged".to_string()));
        }

        let (width, height) = (8u32, 6u32);
        let data = (0..width * height)
            .flat_map(|i| {
                let v = (i * 5 + n) as u8;
                [v, v.wrapping_mul(3), 255 - v]
            })
            .collect();
        Ok(Frame {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
        })
    }
}

impl Drop for FakeCamera {
    fn drop(&mut self) {
        self.probe.releases.set(self.probe.releases.get() + 1);
    }
}

/// A plan with fast polling that writes its archive to `output`.
pub fn fast_plan(x: f64, y: f64, repeat: u32, output: std::path::PathBuf) -> CapturePlan {
    CapturePlan {
        control_point: ControlPoint { x, y },
        repeat,
        discard_frames: 4,
        poll: PollPolicy {
            interval: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        },
        output,
        scratch_dir: None,
    }
}

/// Entry names of a gzip tarball.
pub fn archive_entries(path: &std::path::Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}
