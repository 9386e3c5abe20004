//! Pinhole projection of 3D camera-frame points into pixel coordinates.

use crate::calibration::{CalibrationContext, CameraIntrinsics};
use crate::core::types::{ExtrinsicPose, ImagePoint, Point3D};

/// Depth at or below which a point counts as behind the camera.
const MIN_DEPTH: f32 = 1e-6;

/// Project one point through a pose and the pinhole model.
///
/// Points on or behind the camera plane map to
/// [`ImagePoint::OUT_OF_FRAME`]; callers filter with
/// [`ImagePoint::in_frame`]. Lens distortion is not applied here, frames
/// are undistorted before detection so the pinhole model matches them.
pub fn project_point(
    intrinsics: &CameraIntrinsics,
    pose: &ExtrinsicPose,
    point: &Point3D,
) -> ImagePoint {
    let q = pose.transform(point);
    if q.z <= MIN_DEPTH {
        return ImagePoint::OUT_OF_FRAME;
    }
    let (u, v) = intrinsics.denormalize(q.x / q.z, q.y / q.z);
    ImagePoint::new(u, v)
}

/// Project a batch of points with the scanner pose from a calibration
/// context.
pub fn project_points(context: &CalibrationContext, points: &[Point3D]) -> Vec<ImagePoint> {
    points
        .iter()
        .map(|p| project_point(context.intrinsics(), context.scanner_pose(), p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::DistortionCoeffs;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};

    fn test_intrinsics() -> CameraIntrinsics {
        let m = Matrix3::new(500.0, 0.0, 320.0, 0.0, 500.0, 240.0, 0.0, 0.0, 1.0);
        CameraIntrinsics::new(m, DistortionCoeffs::zero(), 640, 480).unwrap()
    }

    #[test]
    fn test_point_on_axis_hits_principal_point() {
        let pixel = project_point(
            &test_intrinsics(),
            &ExtrinsicPose::identity(),
            &Point3D::new(0.0, 0.0, 5.0),
        );

        assert_relative_eq!(pixel.u, 320.0, epsilon = 1e-4);
        assert_relative_eq!(pixel.v, 240.0, epsilon = 1e-4);
    }

    #[test]
    fn test_off_axis_point() {
        // x/z = 0.2 shifts by fx * 0.2 = 100 pixels.
        let pixel = project_point(
            &test_intrinsics(),
            &ExtrinsicPose::identity(),
            &Point3D::new(1.0, -0.5, 5.0),
        );

        assert_relative_eq!(pixel.u, 420.0, epsilon = 1e-4);
        assert_relative_eq!(pixel.v, 190.0, epsilon = 1e-4);
    }

    #[test]
    fn test_behind_camera_is_sentinel() {
        let pixel = project_point(
            &test_intrinsics(),
            &ExtrinsicPose::identity(),
            &Point3D::new(0.0, 0.0, -1.0),
        );

        assert_eq!(pixel, ImagePoint::OUT_OF_FRAME);
        assert!(!pixel.in_frame(640.0, 480.0));
    }

    #[test]
    fn test_point_on_camera_plane_is_sentinel() {
        let pixel = project_point(
            &test_intrinsics(),
            &ExtrinsicPose::identity(),
            &Point3D::new(0.3, 0.1, 0.0),
        );
        assert_eq!(pixel, ImagePoint::OUT_OF_FRAME);
    }

    #[test]
    fn test_pose_translation_applies() {
        let pose = ExtrinsicPose::new(Matrix3::identity(), Vector3::new(0.0, 0.0, 2.0));
        let pixel = project_point(&test_intrinsics(), &pose, &Point3D::new(0.0, 0.0, 3.0));

        assert_relative_eq!(pixel.u, 320.0, epsilon = 1e-4);
        assert_relative_eq!(pixel.v, 240.0, epsilon = 1e-4);
    }

    #[test]
    fn test_batch_projection_keeps_order() {
        let context = CalibrationContext::new(
            test_intrinsics(),
            ExtrinsicPose::identity(),
            ExtrinsicPose::identity(),
        );
        let points = vec![
            Point3D::new(0.0, 0.0, 5.0),
            Point3D::new(0.0, 0.0, -5.0),
            Point3D::new(1.0, 0.0, 5.0),
        ];

        let pixels = project_points(&context, &points);

        assert_eq!(pixels.len(), 3);
        assert_relative_eq!(pixels[0].u, 320.0, epsilon = 1e-4);
        assert_eq!(pixels[1], ImagePoint::OUT_OF_FRAME);
        assert_relative_eq!(pixels[2].u, 420.0, epsilon = 1e-4);
    }
}
