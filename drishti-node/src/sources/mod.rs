//! Sensor sources feeding the fusion hub.
//!
//! Each source owns a background thread that replays recorded data at a
//! fixed rate and publishes it into the shared [`SensorHub`]. Replay wraps
//! around at the end of the recording so the node can run indefinitely.
//!
//! [`SensorHub`]: drishti_fusion::SensorHub

mod frames;
mod scans;

pub use frames::FrameSource;
pub use scans::ScanSource;

use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock timestamp in microseconds since the Unix epoch.
pub(crate) fn epoch_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
