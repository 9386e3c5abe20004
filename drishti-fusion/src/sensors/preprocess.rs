//! Range scan windowing and polar to Cartesian conversion.

use serde::{Deserialize, Serialize};

use crate::core::types::{LaserScan, Point2D};

/// Half-open index window `[start, end)` into a scan's range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorWindow {
    pub start: usize,
    pub end: usize,
}

impl SectorWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Which parts of the scan the fusion pipeline consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanPreprocessorConfig {
    /// Windows selecting the beams that point across the camera's field of
    /// view. Windows past the end of a scan are clamped.
    pub sectors: Vec<SectorWindow>,
}

impl Default for ScanPreprocessorConfig {
    fn default() -> Self {
        Self {
            sectors: vec![SectorWindow::new(0, 127), SectorWindow::new(378, 505)],
        }
    }
}

/// Converts configured scan sectors into scanner-frame Cartesian points.
#[derive(Debug, Clone, Default)]
pub struct ScanPreprocessor {
    config: ScanPreprocessorConfig,
}

impl ScanPreprocessor {
    pub fn new(config: ScanPreprocessorConfig) -> Self {
        Self { config }
    }

    /// Extract the configured sectors as Cartesian points.
    ///
    /// Non-finite and non-positive ranges are dropped, so the output
    /// usually has fewer points than the windows have beams. Output order
    /// follows beam order within each window, windows in config order.
    pub fn process(&self, scan: &LaserScan) -> Vec<Point2D> {
        let mut points = Vec::new();
        for sector in &self.config.sectors {
            let end = sector.end.min(scan.ranges.len());
            for i in sector.start..end {
                let range = scan.ranges[i];
                if !range.is_finite() || range <= 0.0 {
                    continue;
                }
                let (sin_a, cos_a) = scan.angle_at(i).sin_cos();
                points.push(Point2D::new(range * cos_a, range * sin_a));
            }
        }
        points
    }
}
