//! Range scanner sample type.

use serde::{Deserialize, Serialize};

/// One revolution (or arc) of 2D scanner ranges in polar form.
///
/// Angles are radians, uniformly spaced; ranges are meters. Invalid returns
/// are carried as-is (zero, negative, NaN or infinity) and filtered by the
/// preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Angle of `ranges[0]`.
    pub angle_min: f32,
    /// Angular step between consecutive ranges.
    pub angle_increment: f32,
    /// Range measurements in meters.
    pub ranges: Vec<f32>,
}

impl LaserScan {
    pub fn new(angle_min: f32, angle_increment: f32, ranges: Vec<f32>) -> Self {
        Self {
            angle_min,
            angle_increment,
            ranges,
        }
    }

    /// Beam angle for a sample index.
    #[inline]
    pub fn angle_at(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_angle_at() {
        let scan = LaserScan::new(-FRAC_PI_2, PI / 504.0, vec![1.0; 505]);

        assert_relative_eq!(scan.angle_at(0), -FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(scan.angle_at(252), 0.0, epsilon = 1e-4);
        assert_relative_eq!(scan.angle_at(504), FRAC_PI_2, epsilon = 1e-4);
    }

    #[test]
    fn test_empty_scan() {
        let scan = LaserScan::new(0.0, 0.1, Vec::new());
        assert!(scan.is_empty());
        assert_eq!(scan.len(), 0);
    }

    #[test]
    fn test_serde_roundtrip() {
        // Replay logs encode invalid returns as 0.0; NaN is not JSON.
        let scan = LaserScan::new(-PI, 0.0125, vec![1.5, 2.0, 0.0]);
        let json = serde_json::to_string(&scan).unwrap();
        let back: LaserScan = serde_json::from_str(&json).unwrap();

        assert_relative_eq!(back.angle_min, scan.angle_min);
        assert_eq!(back.ranges, scan.ranges);
    }
}
