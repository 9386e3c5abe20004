//! Lidar scan source replaying a JSON-lines recording.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use drishti_fusion::{LaserScan, SensorHub, Timestamped};
use tracing::info;

use crate::error::{NodeError, Result};
use crate::sources::epoch_micros;

/// Replays a scan log as a lidar stream.
///
/// The log holds one JSON-encoded [`LaserScan`] per line. The whole file
/// is parsed up front so malformed lines fail at startup, not mid-run.
#[derive(Debug)]
pub struct ScanSource {
    scans: Vec<LaserScan>,
    period: Duration,
}

impl ScanSource {
    pub fn new(path: &Path, rate_hz: f32) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;

        let mut scans = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let scan: LaserScan = serde_json::from_str(line).map_err(|e| {
                NodeError::Config(format!("{}:{}: {}", path.display(), number + 1, e))
            })?;
            scans.push(scan);
        }

        if scans.is_empty() {
            return Err(NodeError::Config(format!(
                "no scans in {}",
                path.display()
            )));
        }

        Ok(Self {
            scans,
            period: Duration::from_secs_f32(1.0 / rate_hz.max(0.1)),
        })
    }

    pub fn scan_count(&self) -> usize {
        self.scans.len()
    }

    /// Starts the replay thread. Runs until `shutdown` is set.
    pub fn spawn(self, hub: Arc<SensorHub>, shutdown: Arc<AtomicBool>) -> JoinHandle<()> {
        std::thread::spawn(move || {
            info!(
                "Scan source started: {} scans at {:.1} Hz",
                self.scans.len(),
                1.0 / self.period.as_secs_f32()
            );

            let mut index = 0;
            while !shutdown.load(Ordering::Relaxed) {
                let scan = self.scans[index % self.scans.len()].clone();
                index += 1;

                hub.publish_scan(Timestamped::new(scan, epoch_micros()));
                std::thread::sleep(self.period);
            }

            info!("Scan source stopped");
        })
    }
}
