//! Fixed-rate loop driving the full perception pipeline.
//!
//! Each tick takes the pending scan, reads the newest camera frame,
//! undistorts, detects, and associates. Missing sensor data skips the tick
//! instead of failing; inference errors abort the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::calibration::{CalibrationContext, UndistortMap};
use crate::core::types::Detection;
use crate::detection::DetectionEngine;
use crate::error::Result;
use crate::fusion::{FusionAssociator, FusionOutput};
use crate::runtime::hub::SensorHub;
use crate::sensors::ScanPreprocessor;

/// Loop timing parameters.
#[derive(Debug, Clone)]
pub struct FusionLoopConfig {
    pub rate_hz: f32,
}

impl Default for FusionLoopConfig {
    fn default() -> Self {
        Self { rate_hz: 10.0 }
    }
}

/// Why a tick produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoScan,
    NoFrame,
}

/// Everything one completed tick produced.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub detections: Vec<Detection>,
    pub fusion: FusionOutput,
    pub scan_timestamp_us: u64,
    pub frame_timestamp_us: u64,
}

/// Result of a single tick.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    Completed(TickReport),
    Skipped(SkipReason),
}

/// Counters accumulated over the life of the loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopStats {
    pub ticks: u64,
    pub completed: u64,
    pub skipped: u64,
    pub detections: u64,
    pub matches: u64,
}

/// Owns the pipeline stages and drives them at a fixed rate.
pub struct FusionLoop {
    hub: Arc<SensorHub>,
    context: CalibrationContext,
    undistort: UndistortMap,
    engine: DetectionEngine,
    preprocessor: ScanPreprocessor,
    associator: FusionAssociator,
    config: FusionLoopConfig,
    stats: LoopStats,
}

impl FusionLoop {
    pub fn new(
        hub: Arc<SensorHub>,
        context: CalibrationContext,
        undistort: UndistortMap,
        engine: DetectionEngine,
        preprocessor: ScanPreprocessor,
        associator: FusionAssociator,
        config: FusionLoopConfig,
    ) -> Self {
        Self {
            hub,
            context,
            undistort,
            engine,
            preprocessor,
            associator,
            config,
            stats: LoopStats::default(),
        }
    }

    /// Run one pipeline pass over the freshest sensor data.
    ///
    /// The scan is consumed; the frame stays published and may serve the
    /// next tick too. When the frame is missing the scan is left in place.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let frame = match self.hub.latest_frame() {
            Some(frame) => frame,
            None => return Ok(TickOutcome::Skipped(SkipReason::NoFrame)),
        };
        let scan = match self.hub.take_scan() {
            Some(scan) => scan,
            None => return Ok(TickOutcome::Skipped(SkipReason::NoScan)),
        };

        let undistorted = self.undistort.apply(&frame.data);
        let detections = self.engine.infer(&undistorted)?;
        let points = self.preprocessor.process(&scan.data);
        let fusion = self.associator.associate(&self.context, &points, &detections);

        Ok(TickOutcome::Completed(TickReport {
            detections,
            fusion,
            scan_timestamp_us: scan.timestamp_us,
            frame_timestamp_us: frame.timestamp_us,
        }))
    }

    /// Tick at the configured rate until the shutdown flag is raised.
    ///
    /// `on_report` runs after every completed tick. A summary line is
    /// logged every few seconds.
    pub fn run(
        &mut self,
        shutdown: &Arc<AtomicBool>,
        mut on_report: impl FnMut(&TickReport),
    ) -> Result<()> {
        let period = Duration::from_secs_f32(1.0 / self.config.rate_hz.max(0.1));
        let mut last_summary = Instant::now();

        info!("Fusion loop started at {:.1} Hz", self.config.rate_hz);
        while !shutdown.load(Ordering::SeqCst) {
            let started = Instant::now();

            match self.tick()? {
                TickOutcome::Completed(report) => {
                    self.stats.ticks += 1;
                    self.stats.completed += 1;
                    self.stats.detections += report.detections.len() as u64;
                    self.stats.matches += report.fusion.matches.len() as u64;
                    on_report(&report);
                }
                TickOutcome::Skipped(reason) => {
                    self.stats.ticks += 1;
                    self.stats.skipped += 1;
                    debug!("Tick skipped: {:?}", reason);
                }
            }

            if last_summary.elapsed() >= Duration::from_secs(5) {
                info!(
                    "Loop: {} ticks ({} completed, {} skipped), {} detections, {} matches, dropped {} scans / {} frames",
                    self.stats.ticks,
                    self.stats.completed,
                    self.stats.skipped,
                    self.stats.detections,
                    self.stats.matches,
                    self.hub.scans_dropped(),
                    self.hub.frames_dropped(),
                );
                last_summary = Instant::now();
            }

            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
        info!(
            "Fusion loop stopped after {} ticks ({} completed)",
            self.stats.ticks, self.stats.completed
        );
        Ok(())
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::{CameraIntrinsics, DistortionCoeffs};
    use crate::core::types::{CameraFrame, ExtrinsicPose, LaserScan, Timestamped};
    use crate::detection::{DetectorConfig, InferenceBackend, CLASS_SCORE_OFFSET};
    use crate::fusion::MountingConfig;
    use crate::sensors::{ScanPreprocessorConfig, SectorWindow};
    use nalgebra::Matrix3;

    struct StubBackend {
        layer: Vec<f32>,
    }

    impl InferenceBackend for StubBackend {
        fn run(&mut self, _input: &[f32], _shape: [usize; 4]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![self.layer.clone()])
        }
    }

    fn full_frame_detection_layer() -> Vec<f32> {
        // One row covering the whole frame with a hot accepted class.
        let mut row = vec![0.5, 0.5, 1.0, 1.0, 1.0];
        row.extend(std::iter::repeat_n(0.0, 5));
        row[CLASS_SCORE_OFFSET + 4] = 0.9;
        row
    }

    fn test_loop(hub: Arc<SensorHub>, layer: Vec<f32>) -> FusionLoop {
        let m = Matrix3::new(500.0, 0.0, 320.0, 0.0, 500.0, 240.0, 0.0, 0.0, 1.0);
        let intrinsics = CameraIntrinsics::new(m, DistortionCoeffs::zero(), 640, 480).unwrap();
        let undistort = UndistortMap::build(&intrinsics);
        let context = CalibrationContext::new(
            intrinsics,
            ExtrinsicPose::identity(),
            ExtrinsicPose::identity(),
        );
        let labels = vec!["a", "b", "c", "d", "obstacle"]
            .into_iter()
            .map(String::from)
            .collect();
        let engine = DetectionEngine::new(
            Box::new(StubBackend { layer }),
            labels,
            DetectorConfig::default(),
        )
        .unwrap();
        let preprocessor = ScanPreprocessor::new(ScanPreprocessorConfig {
            sectors: vec![SectorWindow::new(0, 8)],
        });

        FusionLoop::new(
            hub,
            context,
            undistort,
            engine,
            preprocessor,
            FusionAssociator::new(MountingConfig::default()),
            FusionLoopConfig { rate_hz: 200.0 },
        )
    }

    fn forward_scan() -> LaserScan {
        // Eight beams near pi, pointing down the scanner's backward x axis
        // so points land ahead of the camera after lifting.
        LaserScan::new(std::f32::consts::PI - 0.02, 0.005, vec![2.0; 8])
    }

    #[test]
    fn test_tick_without_frame_keeps_scan() {
        let hub = Arc::new(SensorHub::new());
        hub.publish_scan(Timestamped::new(forward_scan(), 100));
        let mut fusion_loop = test_loop(Arc::clone(&hub), full_frame_detection_layer());

        let outcome = fusion_loop.tick().unwrap();
        assert!(matches!(outcome, TickOutcome::Skipped(SkipReason::NoFrame)));

        // The scan survives the skip and feeds the next tick.
        hub.publish_frame(Timestamped::new(CameraFrame::black(640, 480), 200));
        let outcome = fusion_loop.tick().unwrap();
        assert!(matches!(outcome, TickOutcome::Completed(_)));
    }

    #[test]
    fn test_tick_consumes_scan_but_reuses_frame() {
        let hub = Arc::new(SensorHub::new());
        hub.publish_frame(Timestamped::new(CameraFrame::black(640, 480), 100));
        hub.publish_scan(Timestamped::new(forward_scan(), 110));
        let mut fusion_loop = test_loop(Arc::clone(&hub), full_frame_detection_layer());

        assert!(matches!(fusion_loop.tick().unwrap(), TickOutcome::Completed(_)));
        // Scan is gone, frame is still there.
        assert!(matches!(fusion_loop.tick().unwrap(), TickOutcome::Skipped(SkipReason::NoScan)));
    }

    #[test]
    fn test_completed_tick_carries_fusion_output() {
        let hub = Arc::new(SensorHub::new());
        hub.publish_frame(Timestamped::new(CameraFrame::black(640, 480), 100));
        hub.publish_scan(Timestamped::new(forward_scan(), 110));
        let mut fusion_loop = test_loop(Arc::clone(&hub), full_frame_detection_layer());

        let report = match fusion_loop.tick().unwrap() {
            TickOutcome::Completed(report) => report,
            other => panic!("expected completed tick, got {other:?}"),
        };

        assert_eq!(report.detections.len(), 1);
        assert_eq!(report.frame_timestamp_us, 100);
        assert_eq!(report.scan_timestamp_us, 110);
        assert_eq!(report.fusion.projected.len(), 8);
        assert_eq!(report.fusion.matches.len(), 8);
        assert_eq!(report.fusion.obstacles.len(), 8);
    }

    #[test]
    fn test_run_stops_on_shutdown_flag() {
        let hub = Arc::new(SensorHub::new());
        hub.publish_frame(Timestamped::new(CameraFrame::black(640, 480), 100));
        hub.publish_scan(Timestamped::new(forward_scan(), 110));
        let mut fusion_loop = test_loop(Arc::clone(&hub), full_frame_detection_layer());

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let feeder_hub = Arc::clone(&hub);
        let mut reports = 0u32;

        fusion_loop
            .run(&shutdown, |_report| {
                reports += 1;
                if reports >= 3 {
                    flag.store(true, Ordering::SeqCst);
                } else {
                    feeder_hub.publish_scan(Timestamped::new(forward_scan(), 200));
                }
            })
            .unwrap();

        assert_eq!(reports, 3);
        assert!(fusion_loop.stats().completed >= 3);
    }
}
