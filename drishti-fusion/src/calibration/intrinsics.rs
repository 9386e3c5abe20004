//! Camera intrinsic parameters.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{DrishtiError, Result};

/// Determinant magnitude below which the camera matrix counts as singular.
const MIN_DETERMINANT: f32 = 1e-6;

/// Lens distortion coefficients, OpenCV ordering (k1, k2, p1, p2, k3).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistortionCoeffs {
    pub k1: f32,
    pub k2: f32,
    pub p1: f32,
    pub p2: f32,
    pub k3: f32,
}

impl DistortionCoeffs {
    pub fn new(k1: f32, k2: f32, p1: f32, p2: f32, k3: f32) -> Self {
        Self { k1, k2, p1, p2, k3 }
    }

    pub fn from_array(c: [f32; 5]) -> Self {
        Self::new(c[0], c[1], c[2], c[3], c[4])
    }

    /// Distortion-free lens.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Validated pinhole camera intrinsics.
///
/// The constructor rejects singular matrices and non-positive focal lengths,
/// so consumers may divide by these terms without further checks. The
/// inverse matrix is computed once up front.
#[derive(Debug, Clone)]
pub struct CameraIntrinsics {
    matrix: Matrix3<f32>,
    inverse: Matrix3<f32>,
    distortion: DistortionCoeffs,
    width: u32,
    height: u32,
}

impl CameraIntrinsics {
    pub fn new(
        matrix: Matrix3<f32>,
        distortion: DistortionCoeffs,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let fx = matrix[(0, 0)];
        let fy = matrix[(1, 1)];
        if fx <= 0.0 || fy <= 0.0 {
            return Err(DrishtiError::Configuration(format!(
                "focal lengths must be positive, got fx={fx}, fy={fy}"
            )));
        }
        if matrix.determinant().abs() < MIN_DETERMINANT {
            return Err(DrishtiError::Configuration(
                "camera matrix is singular".to_string(),
            ));
        }
        if width == 0 || height == 0 {
            return Err(DrishtiError::Configuration(format!(
                "image size must be non-zero, got {width}x{height}"
            )));
        }
        let inverse = matrix.try_inverse().ok_or_else(|| {
            DrishtiError::Configuration("camera matrix is not invertible".to_string())
        })?;
        Ok(Self {
            matrix,
            inverse,
            distortion,
            width,
            height,
        })
    }

    /// Build from a row-major 9-element matrix.
    pub fn from_row_major(
        values: [f32; 9],
        distortion: DistortionCoeffs,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        Self::new(Matrix3::from_row_slice(&values), distortion, width, height)
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix3<f32> {
        &self.matrix
    }

    #[inline]
    pub fn distortion(&self) -> &DistortionCoeffs {
        &self.distortion
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn fx(&self) -> f32 {
        self.matrix[(0, 0)]
    }

    #[inline]
    pub fn fy(&self) -> f32 {
        self.matrix[(1, 1)]
    }

    #[inline]
    pub fn cx(&self) -> f32 {
        self.matrix[(0, 2)]
    }

    #[inline]
    pub fn cy(&self) -> f32 {
        self.matrix[(1, 2)]
    }

    /// Pixel coordinates to normalized image-plane coordinates.
    #[inline]
    pub fn normalize_pixel(&self, u: f32, v: f32) -> (f32, f32) {
        let n = self.inverse * Vector3::new(u, v, 1.0);
        (n.x, n.y)
    }

    /// Normalized image-plane coordinates back to pixels.
    #[inline]
    pub fn denormalize(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self.matrix * Vector3::new(x, y, 1.0);
        (p.x, p.y)
    }
}
