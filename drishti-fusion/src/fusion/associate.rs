//! Association of scanner points with camera detections.
//!
//! Scanner points are lifted into camera-oriented axes, projected into the
//! image, and tested against detection rectangles. A contained point yields
//! an obstacle in vehicle coordinates.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationContext;
use crate::core::types::{Detection, FusionMatch, ImagePoint, Point2D, Point3D, VcsPoint};
use crate::projection::project_point;

/// Physical placement of the scanner relative to the camera.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MountingConfig {
    /// Vertical offset of the scan plane in camera axes, metres. Negative
    /// is above the camera center (camera y points down).
    pub mount_height: f32,
}

impl Default for MountingConfig {
    fn default() -> Self {
        Self {
            mount_height: -0.058,
        }
    }
}

/// Everything one association pass produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionOutput {
    /// Pixel position of every input point, index-aligned with the input.
    /// Points behind the camera hold [`ImagePoint::OUT_OF_FRAME`].
    pub projected: Vec<ImagePoint>,
    /// Point/detection pairs where the projection landed inside a
    /// rectangle.
    pub matches: Vec<FusionMatch>,
    /// One obstacle per match, in vehicle coordinates.
    pub obstacles: Vec<VcsPoint>,
}

/// Matches scanner returns to camera detections.
#[derive(Debug, Clone, Default)]
pub struct FusionAssociator {
    mounting: MountingConfig,
}

impl FusionAssociator {
    pub fn new(mounting: MountingConfig) -> Self {
        Self { mounting }
    }

    /// Lift a scan-plane point into camera-oriented axes.
    ///
    /// The scanner x axis points backward along the camera view and its y
    /// axis runs lateral, so forward range becomes camera depth and the
    /// configured mount height fills the vertical.
    #[inline]
    fn camera_axes(&self, point: &Point2D) -> Point3D {
        Point3D::new(point.y, self.mounting.mount_height, -point.x)
    }

    /// Associate one scan's points with one frame's detections.
    ///
    /// Each point matches at most one detection, the first in detection
    /// order whose rectangle contains it. Containment is half-open, so
    /// touching rectangles cannot both claim a point.
    pub fn associate(
        &self,
        context: &CalibrationContext,
        points: &[Point2D],
        detections: &[Detection],
    ) -> FusionOutput {
        let width = context.intrinsics().width() as f32;
        let height = context.intrinsics().height() as f32;

        let mut projected = Vec::with_capacity(points.len());
        let mut matches = Vec::new();
        let mut obstacles = Vec::new();

        for (point_index, point) in points.iter().enumerate() {
            let lifted = self.camera_axes(point);
            let pixel = project_point(context.intrinsics(), context.scanner_pose(), &lifted);
            projected.push(pixel);

            if !pixel.in_frame(width, height) {
                continue;
            }

            for (detection_index, detection) in detections.iter().enumerate() {
                if !detection.rect.contains(&pixel) {
                    continue;
                }
                matches.push(FusionMatch {
                    point_index,
                    detection_index,
                });
                let vehicle = context.vehicle_pose().inverse_transform(&lifted);
                obstacles.push(VcsPoint {
                    forward: vehicle.z,
                    lateral: -vehicle.x,
                    height: -vehicle.y,
                    class_id: detection.class_id,
                    confidence: detection.confidence,
                });
                break;
            }
        }

        FusionOutput {
            projected,
            matches,
            obstacles,
        }
    }
}
