// src/main.rs

#[cfg(feature = "desktop")]
mod actions;
mod capture;
mod config;
mod decision;
mod detection;
mod error;
mod geometry;
mod interface;
mod overlay;
mod pipeline;
mod preprocessing;
mod types;

use anyhow::Result;
use clap::Parser;
use config::Overrides;
use pipeline::MetricsSummary;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use types::Config;

#[derive(Debug, Parser)]
#[command(name = "zigzag-autopilot", version, about = "Plays ZigZag in an emulator window")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Exact title of the window to capture
    #[arg(short, long)]
    window: Option<String>,

    /// Resize the window to this height before starting
    #[arg(long)]
    height: Option<u32>,

    /// Window alignment: left, center, right or none
    #[arg(long)]
    align: Option<String>,

    /// Run without the vision window
    #[arg(long)]
    no_vision: bool,

    #[arg(long)]
    startup_delay_ms: Option<u64>,

    /// Log level for this crate (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)?;
    config.apply(Overrides {
        window: args.window,
        height: args.height,
        align: args.align,
        no_vision: args.no_vision,
        startup_delay_ms: args.startup_delay_ms,
        log_level: args.log_level,
    })?;

    init_tracing(&config.logging.level);

    info!("🎮 ZigZag Autopilot starting");
    if args.config.exists() {
        info!("✓ Configuration loaded from {}", args.config.display());
    } else {
        warn!("Config {} not found, using defaults", args.config.display());
    }
    config.validate()?;

    info!(
        "Window '{}' | vision {} | band center {:.2} crop {:.2} | look-ahead {:.3}",
        config.window.title,
        if config.vision.enabled { "on" } else { "off" },
        config.detection.band.center_ratio,
        config.detection.band.crop_ratio,
        config.decision.distance_ratio
    );

    let summary = run(config)?;
    info!("Run summary: {}", serde_json::to_string(&summary)?);
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("zigzag_autopilot={level},opencv=warn")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "desktop")]
fn run(config: Config) -> Result<MetricsSummary> {
    use actions::EnigoActuator;
    use capture::{PlacementAdvisor, WindowCapture};
    use interface::{NoOverlay, WindowPlacement};
    use overlay::HighguiOverlay;

    if let Some(height) = config.window.height {
        let planned = PlacementAdvisor.set_geometry(&config.window.title, height, config.window.align)?;
        info!("Target window geometry {:?}", planned);
    }
    let capture = WindowCapture::open(&config.window)?;
    let actuator = EnigoActuator::new()?;
    info!("✓ Capture and input ready");

    if config.vision.enabled {
        let overlay = HighguiOverlay::new(&config.vision, config.detection.band.clone())?;
        run_until_stopped(pipeline::Autopilot::new(config, capture, actuator, overlay))
    } else {
        run_until_stopped(pipeline::Autopilot::new(config, capture, actuator, NoOverlay))
    }
}

/// Ctrl-C raises the stop flag; the loop exits after its current iteration.
#[cfg(feature = "desktop")]
fn run_until_stopped<O: interface::Overlay>(
    autopilot: pipeline::Autopilot<capture::WindowCapture, actions::EnigoActuator, O>,
) -> Result<MetricsSummary> {
    use anyhow::Context;

    let stop = autopilot.stop_handle();
    ctrlc::set_handler(move || {
        info!("🛑 Ctrl-C received, stopping");
        stop.stop();
    })
    .context("failed to install Ctrl-C handler")?;
    autopilot.run()
}

#[cfg(not(feature = "desktop"))]
fn run(_config: Config) -> Result<MetricsSummary> {
    anyhow::bail!("built without the `desktop` feature; window capture and input are unavailable")
}
