//! drishti-node daemon
//!
//! Replays recorded camera frames and lidar scans through the fusion
//! pipeline and governs vehicle speed from the fused obstacles.
//!
//! # Usage
//!
//! ```bash
//! # With default config
//! cargo run --bin drishti-node
//!
//! # With custom config file
//! cargo run --bin drishti-node -- /path/to/drishti.toml
//! ```

mod config;
mod error;
mod governor;
mod sources;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use drishti_fusion::{
    CalibrationContext, CalibrationFixture, DetectionEngine, ExtrinsicSolver, FusionAssociator,
    FusionLoop, ScanPreprocessor, SensorHub, UndistortMap,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::governor::{LogDriveSink, SpeedGovernor};
use crate::sources::{FrameSource, ScanSource};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run() {
        error!("Fatal: {e}");
        std::process::exit(1);
    }
}

fn config_path() -> Option<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Some(PathBuf::from(arg));
    }
    let default = Path::new("drishti.toml");
    default.exists().then(|| default.to_path_buf())
}

fn load_config() -> Result<NodeConfig> {
    match config_path() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            NodeConfig::load(&path)
        }
        None => {
            info!("No configuration file, using defaults");
            Ok(NodeConfig::default())
        }
    }
}

fn run() -> Result<()> {
    let config = load_config()?;

    let intrinsics = config.intrinsics()?;
    let undistort = UndistortMap::build(&intrinsics);
    info!(
        "Camera model ready: {}x{} px",
        undistort.width(),
        undistort.height()
    );

    let fixture = CalibrationFixture::load(&config.calibration.fixture_path)?;
    let solver = ExtrinsicSolver::default();
    let scanner = solver.solve(&intrinsics, &fixture.scanner_set())?;
    info!(
        "Scanner pose solved: RMS {:.3} px in {} iterations",
        scanner.rms_error, scanner.iterations
    );
    let vehicle = solver.solve(&intrinsics, &fixture.vehicle_set())?;
    info!(
        "Vehicle pose solved: RMS {:.3} px in {} iterations",
        vehicle.rms_error, vehicle.iterations
    );
    if !scanner.converged || !vehicle.converged {
        warn!("Pose refinement did not converge, continuing with best estimate");
    }
    let context = CalibrationContext::new(intrinsics, scanner.pose, vehicle.pose);

    let engine = DetectionEngine::from_files(
        &config.detector.model_path,
        &config.detector.labels_path,
        config.detector_config(),
    )?;
    info!("Detector ready: {} classes", engine.labels().len());

    let frames = FrameSource::new(&config.source.frame_dir, config.source.frame_rate_hz)?;
    let scans = ScanSource::new(&config.source.scan_log, config.source.scan_rate_hz)?;
    info!(
        "Replay sources ready: {} frames, {} scans",
        frames.frame_count(),
        scans.scan_count()
    );

    let hub = Arc::new(SensorHub::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown requested");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| NodeError::Config(format!("cannot install signal handler: {e}")))?;

    let frame_handle = frames.spawn(hub.clone(), shutdown.clone());
    let scan_handle = scans.spawn(hub.clone(), shutdown.clone());

    let mut governor = SpeedGovernor::new(config.governor.clone());
    let mut sink = LogDriveSink::default();

    let mut fusion_loop = FusionLoop::new(
        hub,
        context,
        undistort,
        engine,
        ScanPreprocessor::new(config.scan_config()),
        FusionAssociator::new(config.mounting()),
        config.loop_config(),
    );

    let result = fusion_loop.run(&shutdown, |report| {
        governor.update(&report.fusion.obstacles, report.scan_timestamp_us, &mut sink);
    });

    shutdown.store(true, Ordering::SeqCst);
    let _ = frame_handle.join();
    let _ = scan_handle.join();
    result?;

    info!("Node stopped cleanly");
    Ok(())
}
