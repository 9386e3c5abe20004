//! Timestamp wrapper for sensor samples.

use serde::{Deserialize, Serialize};

/// Sensor sample tagged with its capture time.
///
/// Timestamps are microseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub data: T,
    pub timestamp_us: u64,
}

impl<T> Timestamped<T> {
    #[inline]
    pub fn new(data: T, timestamp_us: u64) -> Self {
        Self { data, timestamp_us }
    }

    /// Transform the payload, keeping the capture time.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Timestamped<U> {
        Timestamped {
            data: f(self.data),
            timestamp_us: self.timestamp_us,
        }
    }
}
