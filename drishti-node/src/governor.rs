//! Speed governor reacting to fused obstacle positions.
//!
//! Each fusion tick reports obstacles in vehicle coordinates. The governor
//! tracks the nearest one ahead of the vehicle, smooths that distance over
//! a short window, and ramps the commanded speed down when the smoothed
//! distance falls inside the slow radius and back up when the path clears.

use std::collections::VecDeque;

use drishti_fusion::VcsPoint;
use tracing::info;

use crate::config::GovernorSection;

/// Windowed moving average over recent distance samples.
pub struct MovingAverage {
    window: usize,
    values: VecDeque<f32>,
    sum: f64,
}

impl MovingAverage {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            values: VecDeque::new(),
            sum: 0.0,
        }
    }

    /// Adds a sample, evicting the oldest when the window is full, and
    /// returns the current average.
    pub fn push(&mut self, value: f32) -> f32 {
        self.values.push_back(value);
        self.sum += value as f64;
        if self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old as f64;
            }
        }
        self.average()
    }

    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            0.0
        } else {
            (self.sum / self.values.len() as f64) as f32
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Speed command produced once per fusion tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    /// Commanded speed in m/s.
    pub speed: f32,
    /// Timestamp of the scan the command reacts to.
    pub timestamp_us: u64,
}

/// Consumer of drive commands.
pub trait DriveSink: Send {
    fn send(&mut self, command: DriveCommand);
}

/// Sink that logs speed changes instead of driving hardware.
#[derive(Default)]
pub struct LogDriveSink {
    last_logged: Option<f32>,
}

impl DriveSink for LogDriveSink {
    fn send(&mut self, command: DriveCommand) {
        let changed = self
            .last_logged
            .is_none_or(|previous| (previous - command.speed).abs() > 0.01);
        if changed {
            info!("Drive speed {:.2} m/s", command.speed);
            self.last_logged = Some(command.speed);
        }
    }
}

/// Ramps commanded speed based on the nearest obstacle ahead.
pub struct SpeedGovernor {
    config: GovernorSection,
    filter: MovingAverage,
    speed: f32,
}

impl SpeedGovernor {
    pub fn new(config: GovernorSection) -> Self {
        let filter = MovingAverage::new(config.filter_window);
        let speed = config.min_speed;
        Self {
            config,
            filter,
            speed,
        }
    }

    /// Processes one tick of obstacles and emits a command to `sink`.
    ///
    /// Only obstacles strictly ahead of the vehicle count. The smoothing
    /// filter runs over ticks that see an obstacle, so a clear tick does
    /// not dilute the distance estimate.
    pub fn update(
        &mut self,
        obstacles: &[VcsPoint],
        timestamp_us: u64,
        sink: &mut dyn DriveSink,
    ) -> f32 {
        let nearest = obstacles
            .iter()
            .map(|o| o.forward)
            .filter(|f| *f > 0.0)
            .fold(f32::INFINITY, f32::min);

        let obstructed = if nearest.is_finite() {
            self.filter.push(nearest) < self.config.slow_radius
        } else {
            false
        };

        self.speed = if obstructed {
            (self.speed - self.config.decel_step).max(self.config.min_speed)
        } else {
            (self.speed + self.config.accel_step).min(self.config.max_speed)
        };

        sink.send(DriveCommand {
            speed: self.speed,
            timestamp_us,
        });
        self.speed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}
