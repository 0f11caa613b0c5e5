//! # HelicMax Link
//!
//! Fly a HelicMax toy quadcopter with a PS5 DualSense controller over the
//! drone's own Wi-Fi access point.
//!
//! # Control Flow
//!
//! 1. **Establish**
//!    - Scan for a `HelicMax-<digits>` network and join it
//!    - Open the UDP control channel (192.168.0.1:40000 by default)
//!
//! 2. **Fly**
//!    - Send the wake packet and a rest-state baseline frame
//!    - Stream a control frame every 50ms from the latest gamepad state
//!
//! 3. **Disarm**
//!    - Ctrl+C or the PS button sends one zero-throttle frame
//!    - Wait 1s for it to reach the drone, then exit
//!
//! Any failure before the first datagram is fatal and exits with status 1.
//!
//! ```bash
//! cargo run --release -- config/default.toml
//! ```

use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use helicmax_link::config::{Config, ControllerConfig, LoggingConfig};
use helicmax_link::input::calibration::AxisCalibration;
use helicmax_link::input::gamepad::{self, DualSenseController, GamepadMapper};
use helicmax_link::input::{axis_channel, AxisPublisher};
use helicmax_link::link::{establish, session_options};
use helicmax_link::session::{ControlSession, ShutdownHandle};
use helicmax_link::wifi::NmcliBackend;

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Status line timestamp format
const LOG_TIME_FORMAT: &str = "%H:%M:%S";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = load_config(std::env::args().nth(1).as_deref())?;
    let _log_guard = init_logging(&config.logging).context("Failed to set up logging")?;

    info!("HelicMax Link v{} starting...", env!("CARGO_PKG_VERSION"));

    Ok(ExitCode::from(exit_status(fly(&config).await)))
}

/// Log a fatal flight error once and turn the outcome into a process status
fn exit_status(outcome: helicmax_link::error::Result<()>) -> u8 {
    match outcome {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

async fn fly(config: &Config) -> helicmax_link::error::Result<()> {
    let backend = NmcliBackend::new(config.wifi.interface());
    establish(&backend, config).await?;

    let shutdown = ShutdownHandle::new();
    let session = ControlSession::open(
        config.drone.control_addr(),
        session_options(config)?,
        shutdown.clone(),
    )
    .await?;

    let (publisher, feed) = axis_channel();
    start_gamepad(&config.controller, publisher, shutdown.clone());

    tokio::spawn(shutdown_on_signal(tokio::signal::ctrl_c(), shutdown.clone()));

    info!("Press Ctrl+C or the PS button to land");
    let report = session.run(&feed).await?;

    info!(
        "Flight started {} ended: {} frames sent, {} failed",
        report.started_at.format(LOG_TIME_FORMAT),
        report.frames_sent,
        report.transmit_failures
    );
    Ok(())
}

/// Request shutdown when `signal` fires
///
/// If the handler cannot be installed the flight goes on; the PS button can
/// still land it.
async fn shutdown_on_signal<F>(signal: F, shutdown: ShutdownHandle)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Received Ctrl+C");
            shutdown.request_shutdown();
        }
        Err(e) => warn!("Ctrl+C handler failed: {}; use the PS button to land", e),
    }
}

/// Start reading the gamepad, or leave the feed at rest if there is none
fn start_gamepad(config: &ControllerConfig, publisher: AxisPublisher, shutdown: ShutdownHandle) {
    if !config.enabled {
        info!("Controller disabled, streaming rest state");
        return;
    }

    let controller = if config.device_path.is_empty() {
        DualSenseController::open()
    } else {
        DualSenseController::open_path(&config.device_path)
    };

    let controller = match controller {
        Ok(controller) => controller,
        Err(e) => {
            warn!("{}; streaming rest state until Ctrl+C", e);
            return;
        }
    };

    let mapper = GamepadMapper::new(AxisCalibration::from_config(config));
    if let Err(e) = gamepad::spawn_reader(controller, mapper, publisher, shutdown) {
        warn!("Could not start gamepad reader: {}", e);
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(path).with_context(|| format!("Failed to load config from {}", path))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::load(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Console logging, plus a daily rolling file when `log_dir` is set
///
/// The returned guard flushes the file writer on drop.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let console = tracing_subscriber::fmt::layer()
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()));

    if config.log_dir.is_empty() {
        tracing_subscriber::registry().with(filter).with(console).try_init()?;
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, "helicmax-link.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(Some(guard))
}
