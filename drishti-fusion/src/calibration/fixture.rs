//! Extrinsic calibration fixture loading.
//!
//! A fixture file records one captured view of the calibration target: pixel
//! observations paired with target coordinates surveyed in both the scanner
//! frame and the vehicle frame. The same pixels serve both pose solves.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibration::pnp::MIN_CORRESPONDENCES;
use crate::core::types::{ImagePoint, Point3D};
use crate::error::{DrishtiError, Result};

/// Supported fixture schema version.
pub const FIXTURE_VERSION: u32 = 1;

/// Paired 2D/3D observations feeding one pose solve.
#[derive(Debug, Clone)]
pub struct CorrespondenceSet {
    pub image: Vec<ImagePoint>,
    pub object: Vec<Point3D>,
}

impl CorrespondenceSet {
    pub fn new(image: Vec<ImagePoint>, object: Vec<Point3D>) -> Self {
        Self { image, object }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.image.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

/// On-disk calibration target observations, versioned.
///
/// Object coordinates use the camera axis convention of their frame: x
/// right, y down, z forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationFixture {
    pub version: u32,
    pub image_points: Vec<[f32; 2]>,
    pub scanner_points: Vec<[f32; 3]>,
    pub vehicle_points: Vec<[f32; 3]>,
}

impl CalibrationFixture {
    /// Load and validate a fixture file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let fixture: CalibrationFixture = serde_json::from_str(&text).map_err(|e| {
            DrishtiError::Configuration(format!("fixture {}: {e}", path.display()))
        })?;
        fixture.validate()?;
        Ok(fixture)
    }

    fn validate(&self) -> Result<()> {
        if self.version != FIXTURE_VERSION {
            return Err(DrishtiError::Configuration(format!(
                "unsupported fixture version {} (expected {FIXTURE_VERSION})",
                self.version
            )));
        }
        let n = self.image_points.len();
        if self.scanner_points.len() != n || self.vehicle_points.len() != n {
            return Err(DrishtiError::Configuration(format!(
                "fixture point tables differ in length: {} image, {} scanner, {} vehicle",
                n,
                self.scanner_points.len(),
                self.vehicle_points.len()
            )));
        }
        if n < MIN_CORRESPONDENCES {
            return Err(DrishtiError::Configuration(format!(
                "fixture holds {n} correspondences, need at least {MIN_CORRESPONDENCES}"
            )));
        }
        Ok(())
    }

    /// Correspondences pairing pixels with scanner-frame target coordinates.
    pub fn scanner_set(&self) -> CorrespondenceSet {
        CorrespondenceSet::new(self.image(), to_points(&self.scanner_points))
    }

    /// Correspondences pairing pixels with vehicle-frame target coordinates.
    pub fn vehicle_set(&self) -> CorrespondenceSet {
        CorrespondenceSet::new(self.image(), to_points(&self.vehicle_points))
    }

    fn image(&self) -> Vec<ImagePoint> {
        self.image_points
            .iter()
            .map(|p| ImagePoint::new(p[0], p[1]))
            .collect()
    }
}

fn to_points(raw: &[[f32; 3]]) -> Vec<Point3D> {
    raw.iter().map(|p| Point3D::new(p[0], p[1], p[2])).collect()
}
