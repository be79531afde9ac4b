//! # Pad Bridge
//!
//! Drive a motor controller from a gamepad over SPI or UART.
//!
//! The left stick moves the platform in the horizontal plane and the right
//! stick sets vertical thrust with the default layout; see `config/` for
//! the other presets.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use pad_bridge::config::Config;
use pad_bridge::controller::gamepad::GamepadSource;
use pad_bridge::controller::{check_axes, AxisSource};
use pad_bridge::error::PadBridgeError;
use pad_bridge::session::{ControlLoop, ExitStatus, LoopSettings, Shutdown};
use pad_bridge::transport::diagnostic::DiagnosticSink;
use pad_bridge::transport::{self, CommandSink, WireSink};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "pad-bridge", version, about = "Stream gamepad axes to a motor controller")]
struct Cli {
    /// Configuration file (built-in three channel layout if omitted)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print channel values instead of driving the bus
    #[arg(long)]
    observe: bool,

    /// With --observe, also print the encoded frame bytes
    #[arg(long, requires = "observe")]
    hex: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Main entry point for Pad Bridge
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load and validate configuration
///    - Open the gamepad and check every channel's axis exists
///    - Open the transport (or the diagnostic sink with `--observe`)
///
/// 2. **Main Loop**
///    - Sample, clamp and send one frame every cycle interval
///    - Back off after transient failures, give up after the threshold
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Shutdown**
///    - Close the transport
///    - Exit with a status describing why the session ended
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("Pad Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    match run(&cli) {
        Ok(shutdown) => {
            info!("Session ended: {:?}", shutdown);
            ExitStatus::from(&shutdown).into()
        }
        Err(e) => {
            error!("{:#}", e);
            exit_status(&e).into()
        }
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level(verbose).into()),
        )
        .init();
}

fn log_level(verbose: u8) -> tracing::Level {
    match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn exit_status(err: &anyhow::Error) -> ExitStatus {
    err.downcast_ref::<PadBridgeError>()
        .map_or(ExitStatus::Startup, ExitStatus::from_error)
}

fn run(cli: &Cli) -> Result<Shutdown> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    let channels = config.channel_set()?;

    let source = GamepadSource::open(config.controller.gamepad_index)?;
    info!(
        "Using {} ({} axes, {} buttons)",
        source.name(),
        source.axis_count(),
        source.button_count()
    );
    check_axes(&channels, &source)?;

    let sink: Box<dyn CommandSink> = if cli.observe {
        info!("Observe mode: frames are printed, not sent");
        Box::new(DiagnosticSink::stdout(cli.hex))
    } else {
        let link = transport::open(&config.transport)?;
        info!("Transport ready: {}", link.describe());
        Box::new(WireSink::new(link))
    };

    let control = ControlLoop::new(source, sink, channels, LoopSettings::from(&config.control));

    let stop = control.stop_handle();
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
        .context("installing Ctrl+C handler")?;
    info!("Press Ctrl+C to exit");

    Ok(control.run()?)
}
