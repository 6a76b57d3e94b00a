use std::process::ExitCode;

use clap::Parser;

use capture_offsets::archive::ArchiveSummary;
use capture_offsets::camera::CameraCapture;
use capture_offsets::cli::{self, Args, Command};
use capture_offsets::config::Config;
use capture_offsets::preflight;
use capture_offsets::printer::DuetClient;
use capture_offsets::session;
use capture_offsets::CaptureError;

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Everything between argument parsing and the exit status.
///
/// Resources acquired here (printer session, camera, temp dir) are dropped
/// before `main` returns, on success and failure alike.
fn run(args: &Args) -> Result<ArchiveSummary, CaptureError> {
    let file = Config::load(args.config.as_deref())?;
    let config = args.resolve(&file)?;
    log::debug!("Resolved configuration: {:?}", config);

    let printer = DuetClient::connect(&config.duet)?;

    let camera_settings = config.camera.clone();
    let mut rng = rand::thread_rng();
    session::execute(
        &printer,
        move || CameraCapture::open(camera_settings),
        &mut rng,
        &config.plan,
    )
}

fn main() -> ExitCode {
    let raw_args = cli::normalize_args(std::env::args_os());
    if !preflight::allowed_remotely(&raw_args) {
        if let Err(e) = preflight::ensure_local_session(|key| std::env::var(key).ok()) {
            eprintln!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    }

    let args = Args::parse_from(raw_args);
    init_logging(args.verbose);

    if let Some(Command::ListCameras) = args.command {
        return cli::list_cameras();
    }

    match run(&args) {
        Ok(summary) => {
            println!();
            println!(
                "Capture done. Compressed archive of {} captures has been created at {}",
                summary.entries.len(),
                summary.path.display()
            );
            println!(" and temp folder and files have been deleted.");
            println!();
            println!("Thanks for helping out!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            log::debug!("{:?}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
