//! Shared mailbox pair between sensor sources and the fusion loop.

use crate::core::types::{CameraFrame, LaserScan, Timestamped};
use crate::runtime::slot::LatestSlot;

/// Hand-off point for camera frames and range scans.
///
/// Sources publish from their own threads; the fusion loop consumes scans
/// one at a time and reads the newest frame, which may serve several ticks
/// when the camera runs slower than the loop.
#[derive(Default)]
pub struct SensorHub {
    frames: LatestSlot<CameraFrame>,
    scans: LatestSlot<LaserScan>,
}

impl SensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish_frame(&self, frame: Timestamped<CameraFrame>) -> bool {
        self.frames.publish(frame)
    }

    pub fn publish_scan(&self, scan: Timestamped<LaserScan>) -> bool {
        self.scans.publish(scan)
    }

    /// Consume the pending scan, if any.
    pub fn take_scan(&self) -> Option<Timestamped<LaserScan>> {
        self.scans.take()
    }

    /// Read the newest frame without consuming it.
    pub fn latest_frame(&self) -> Option<Timestamped<CameraFrame>> {
        self.frames.latest()
    }

    pub fn frames_dropped(&self) -> u64 {
        self.frames.dropped()
    }

    pub fn scans_dropped(&self) -> u64 {
        self.scans.dropped()
    }
}
