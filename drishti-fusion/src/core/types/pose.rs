//! Rigid transform between a sensor frame and the camera frame.

use nalgebra::{Matrix3, Vector3};

use super::geometry::Point3D;

/// Rigid transform mapping points from a source frame into the camera frame.
///
/// Produced once by the extrinsic solver and treated as immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrinsicPose {
    pub rotation: Matrix3<f32>,
    pub translation: Vector3<f32>,
}

impl ExtrinsicPose {
    pub fn new(rotation: Matrix3<f32>, translation: Vector3<f32>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Identity transform (source and camera frames coincide).
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Map a source-frame point into the camera frame.
    #[inline]
    pub fn transform(&self, point: &Point3D) -> Point3D {
        let q = self.rotation * Vector3::new(point.x, point.y, point.z) + self.translation;
        Point3D::new(q.x, q.y, q.z)
    }

    /// Map a camera-frame point back into the source frame.
    #[inline]
    pub fn inverse_transform(&self, point: &Point3D) -> Point3D {
        let q = self.rotation.transpose()
            * (Vector3::new(point.x, point.y, point.z) - self.translation);
        Point3D::new(q.x, q.y, q.z)
    }
}

impl Default for ExtrinsicPose {
    fn default() -> Self {
        Self::identity()
    }
}
