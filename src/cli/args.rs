//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::archive::ARCHIVE_FILE_NAME;
use crate::camera::CameraSettings;
use crate::config::{Config, ConfigError, RunConfig};
use crate::printer::{PollPolicy, DEFAULT_IDLE_TIMEOUT, DEFAULT_POLL_INTERVAL};
use crate::session::{CapturePlan, ControlPoint, DEFAULT_DISCARD_FRAMES, DEFAULT_REPEAT};

/// Long flags that may also be spelled with a single dash (`-duet`).
const SINGLE_DASH_FLAGS: &[&str] = &[
    "duet",
    "camera",
    "cp",
    "repeat",
    "output",
    "idle-timeout",
    "config",
    "verbose",
];

/// Default printer address.
pub const DEFAULT_DUET: &str = "localhost";

/// Capture images of the carriage moving 0.025mm or 0.05mm per frame
#[derive(Parser, Debug)]
#[command(name = "capture-offsets")]
#[command(version, about = "Capture endstop images at 0.025mm and 0.05mm jitter offsets")]
#[command(long_about = "Capture images of the carriage control point moving 0.025mm or \
    0.05mm per frame. Output is saved to the working directory as \
    capture_offsets.tar.gz.")]
#[command(after_help = "EXAMPLES:
    capture-offsets -cp 50 50
    capture-offsets -duet 192.168.1.20 -camera 1 -cp 120.5 -3 -repeat 20
    capture-offsets list-cameras")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Name or IP address of the Duet printer [default: localhost]
    #[arg(long, value_name = "HOST")]
    pub duet: Option<String>,

    /// Index of the /dev/videoN device to use [default: 0]
    #[arg(long, value_name = "INDEX")]
    pub camera: Option<u32>,

    /// X Y that put the control point on the carriage over the camera
    #[arg(
        long,
        num_args = 2,
        value_names = ["X", "Y"],
        required = true,
        allow_negative_numbers = true
    )]
    pub cp: Vec<f64>,

    /// Number of captures per offset [default: 10]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: Option<u32>,

    /// Archive path [default: ./capture_offsets.tar.gz]
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Seconds to wait for the printer to become idle [default: 120]
    #[arg(long, value_name = "SECS")]
    pub idle_timeout: Option<u64>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List available cameras
    ListCameras,
}

/// Rewrite single-dash long flags (`-duet`, `-cp=...`) to their `--` form.
///
/// Anything else, including negative numbers and real short flags, passes
/// through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg: OsString| match arg.to_str() {
            Some(s) if is_single_dash_flag(s) => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

fn is_single_dash_flag(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split('=').next().unwrap_or(rest);
    SINGLE_DASH_FLAGS.contains(&name)
}

impl Args {
    /// The `-cp` pair, if exactly two values were given.
    pub fn control_point(&self) -> Option<ControlPoint> {
        match self.cp.as_slice() {
            [x, y] => Some(ControlPoint { x: *x, y: *y }),
            _ => None,
        }
    }

    /// Merge flags over `file` over built-in defaults.
    pub fn resolve(&self, file: &Config) -> Result<RunConfig, ConfigError> {
        let control_point = self.control_point().ok_or_else(|| {
            ConfigError::Invalid("-cp requires exactly two values: X Y".to_string())
        })?;
        if !control_point.x.is_finite() || !control_point.y.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "control point must be finite, got {} {}",
                control_point.x, control_point.y
            )));
        }

        let repeat = self
            .repeat
            .or(file.capture.repeat)
            .unwrap_or(DEFAULT_REPEAT);
        if repeat == 0 {
            return Err(ConfigError::Invalid("repeat must be at least 1".to_string()));
        }

        let interval = file
            .printer
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        if interval.is_zero() {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        let timeout = self
            .idle_timeout
            .or(file.printer.idle_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);

        let duet = self
            .duet
            .clone()
            .or_else(|| file.printer.host.clone())
            .unwrap_or_else(|| DEFAULT_DUET.to_string());
        let device = self.camera.or(file.camera.device).unwrap_or(0);

        Ok(RunConfig {
            duet,
            camera: CameraSettings::for_device(device),
            plan: CapturePlan {
                control_point,
                repeat,
                discard_frames: file.camera.discard_frames.unwrap_or(DEFAULT_DISCARD_FRAMES),
                poll: PollPolicy { interval, timeout },
                output: self
                    .output
                    .clone()
                    .or_else(|| file.capture.output.clone())
                    .unwrap_or_else(|| PathBuf::from(ARCHIVE_FILE_NAME)),
                scratch_dir: file.capture.scratch_dir.clone(),
            },
        })
    }
}
