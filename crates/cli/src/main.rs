use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use blinkcam_core::capture::domain::capture_device::DevicePosition;
use blinkcam_core::capture::infrastructure::replay_capture_framework::ReplayCaptureFramework;
use blinkcam_core::display::domain::display_sink::DisplaySink;
use blinkcam_core::display::domain::readout_surface::ReadoutSurface;
use blinkcam_core::display::infrastructure::discarding_display_sink::DiscardingDisplaySink;
use blinkcam_core::display::infrastructure::image_sequence_sink::ImageSequenceSink;
use blinkcam_core::display::infrastructure::readouts::LogReadout;
use blinkcam_core::processing::infrastructure::logging_frame_processor::LoggingFrameProcessor;
use blinkcam_core::session::session_config::{RejectionPolicy, SessionConfig};
use blinkcam_core::session::session_coordinator::{SessionCoordinator, SessionReport};
use blinkcam_core::session::session_logger::SummarySessionLogger;
use blinkcam_core::shared::pixel_format::PixelFormat;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Replays a recorded capture through the blink counting session.
#[derive(Parser)]
#[command(name = "blinkcam")]
struct Cli {
    /// Replay manifest (JSON) describing frames and face metadata.
    manifest: PathBuf,

    /// Save displayed frames as PNG files to this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Save every Nth displayed frame (1 = every frame).
    #[arg(long, default_value = "1")]
    save_every: u64,

    /// Session config file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Camera position to select: front or back.
    #[arg(long)]
    position: Option<DevicePosition>,

    /// Frame pixel format: bgra32 or rgb24.
    #[arg(long)]
    pixel_format: Option<PixelFormat>,

    /// Frames buffered between capture and processing before dropping.
    #[arg(long)]
    frame_queue: Option<usize>,

    /// How to treat inputs or outputs the session rejects: warn, ignore, fail.
    #[arg(long)]
    rejection_policy: Option<RejectionPolicy>,

    /// Stop after this many seconds even if frames remain.
    #[arg(long)]
    max_seconds: Option<f64>,
}

/// Writes the blink count on a single, continuously rewritten terminal line.
struct TerminalReadout;

impl ReadoutSurface for TerminalReadout {
    fn set_text(&mut self, text: &str) {
        eprint!("\rBlinks: {text}");
        std::io::stderr().flush().ok();
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    let framework = ReplayCaptureFramework::from_path(&cli.manifest)?;
    let display = build_display(&cli);

    let mut coordinator = SessionCoordinator::new(
        Box::new(framework),
        Box::new(LoggingFrameProcessor::new()),
        display,
        config,
    )
    .with_logger(Box::new(SummarySessionLogger::default()));
    if std::io::stderr().is_terminal() {
        coordinator.set_readout(Box::new(TerminalReadout));
    } else {
        coordinator.set_readout(Box::new(LogReadout::new()));
    }

    let running = coordinator.open()?;
    let report = match cli.max_seconds {
        Some(seconds) => {
            let deadline = Instant::now() + Duration::from_secs_f64(seconds);
            while !running.is_finished() && Instant::now() < deadline {
                thread::sleep(POLL_INTERVAL);
            }
            running.stop()?
        }
        None => running.wait()?,
    };
    eprintln!();
    print_report(&report);
    Ok(())
}

fn build_config(cli: &Cli) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load_from(path)?,
        None => SessionConfig::load(),
    };
    if let Some(position) = cli.position {
        config.device_position = position;
    }
    if let Some(format) = cli.pixel_format {
        config.pixel_format = format;
    }
    if let Some(capacity) = cli.frame_queue {
        config.frame_queue_capacity = capacity;
    }
    if let Some(policy) = cli.rejection_policy {
        config.rejection_policy = policy;
    }
    config.validate()?;
    Ok(config)
}

fn build_display(cli: &Cli) -> Box<dyn DisplaySink> {
    match &cli.output_dir {
        Some(dir) => Box::new(ImageSequenceSink::new(dir, cli.save_every)),
        None => Box::new(DiscardingDisplaySink::new()),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.manifest.exists() {
        return Err(format!("Manifest not found: {}", cli.manifest.display()).into());
    }
    if cli.save_every == 0 {
        return Err("--save-every must be at least 1".into());
    }
    if cli.frame_queue == Some(0) {
        return Err("--frame-queue must be at least 1".into());
    }
    if let Some(seconds) = cli.max_seconds {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(format!("--max-seconds must be positive, got {seconds}").into());
        }
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    let stats = &report.stats;
    log::info!(
        "Replayed in {:.1}s: {} delivered, {} displayed, {} processed, {} dropped",
        report.elapsed.as_secs_f64(),
        stats.frames_delivered,
        stats.frames_displayed,
        stats.frames_processed,
        stats.frames_dropped,
    );
    println!("Blinks: {}", stats.blink_count);
    if stats.processor_errors > 0 {
        log::warn!("{} frames failed processing", stats.processor_errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(extra: &[&str]) -> Cli {
        let mut args = vec!["blinkcam", env!("CARGO_MANIFEST_DIR")];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_terminal_readout_ignores_write_failures() {
        let mut readout = TerminalReadout;
        readout.set_text("3");
        readout.set_text("4");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(validate(&cli(&[])).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_flags() {
        assert!(validate(&cli(&["--save-every", "0"])).is_err());
        assert!(validate(&cli(&["--frame-queue", "0"])).is_err());
        assert!(validate(&cli(&["--max-seconds=-1"])).is_err());
    }
}
