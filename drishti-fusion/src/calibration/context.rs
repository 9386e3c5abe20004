//! Solved calibration state shared by the projection and fusion stages.

use crate::calibration::intrinsics::CameraIntrinsics;
use crate::core::types::ExtrinsicPose;

/// Immutable bundle of camera intrinsics and the two solved extrinsic poses.
///
/// The scanner pose maps scanner-frame points into the camera frame, the
/// vehicle pose maps vehicle-frame points into the camera frame. Both come
/// out of [`ExtrinsicSolver`](crate::calibration::ExtrinsicSolver) against
/// the same image observations.
#[derive(Debug, Clone)]
pub struct CalibrationContext {
    intrinsics: CameraIntrinsics,
    scanner_pose: ExtrinsicPose,
    vehicle_pose: ExtrinsicPose,
}

impl CalibrationContext {
    pub fn new(
        intrinsics: CameraIntrinsics,
        scanner_pose: ExtrinsicPose,
        vehicle_pose: ExtrinsicPose,
    ) -> Self {
        Self {
            intrinsics,
            scanner_pose,
            vehicle_pose,
        }
    }

    pub fn intrinsics(&self) -> &CameraIntrinsics {
        &self.intrinsics
    }

    pub fn scanner_pose(&self) -> &ExtrinsicPose {
        &self.scanner_pose
    }

    pub fn vehicle_pose(&self) -> &ExtrinsicPose {
        &self.vehicle_pose
    }
}
