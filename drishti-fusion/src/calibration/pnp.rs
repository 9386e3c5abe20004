//! Extrinsic pose estimation from 2D/3D correspondences.
//!
//! Gauss-Newton over SE(3) with adaptive Levenberg-Marquardt damping. The
//! pose maps object-frame points into the camera frame; the residual is the
//! pinhole reprojection error in pixels. Normal equations accumulate in f64,
//! the resulting pose is f32 like the rest of the pipeline.

use nalgebra::{Matrix2x3, Matrix2x6, Matrix3, Matrix6, Vector2, Vector3, Vector6};

use crate::calibration::fixture::CorrespondenceSet;
use crate::calibration::intrinsics::CameraIntrinsics;
use crate::core::types::ExtrinsicPose;
use crate::error::{DrishtiError, Result};

/// Minimum number of correspondences for a pose solve.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Scatter eigenvalue ratio below which the object points are collinear.
///
/// Planar targets are the normal calibration case and solve fine; only
/// rank-one point sets leave the pose unconstrained.
const COLLINEARITY_RATIO: f64 = 1e-8;

/// Depth clamp keeping the projection Jacobian finite.
const MIN_DEPTH: f64 = 1e-6;

/// Solver tuning parameters.
#[derive(Debug, Clone)]
pub struct PnpConfig {
    pub max_iterations: usize,
    /// Step norm below which the solve counts as converged.
    pub step_tolerance: f32,
}

impl Default for PnpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            step_tolerance: 1e-6,
        }
    }
}

/// Outcome of one extrinsic solve.
#[derive(Debug, Clone)]
pub struct PnpSolution {
    pub pose: ExtrinsicPose,
    /// Root-mean-square reprojection error in pixels.
    pub rms_error: f32,
    pub iterations: usize,
    pub converged: bool,
}

/// Iterative pose solver for one camera/target correspondence set.
#[derive(Debug, Clone, Default)]
pub struct ExtrinsicSolver {
    config: PnpConfig,
}

impl ExtrinsicSolver {
    pub fn new(config: PnpConfig) -> Self {
        Self { config }
    }

    /// Estimate the pose mapping object points onto their pixel observations.
    ///
    /// Fails with `InsufficientCorrespondences` when fewer than
    /// [`MIN_CORRESPONDENCES`] pairs are given or the object points are
    /// collinear.
    pub fn solve(
        &self,
        intrinsics: &CameraIntrinsics,
        set: &CorrespondenceSet,
    ) -> Result<PnpSolution> {
        if set.image.len() != set.object.len() {
            return Err(DrishtiError::Configuration(format!(
                "correspondence tables differ in length: {} image, {} object",
                set.image.len(),
                set.object.len()
            )));
        }
        let n = set.len();
        if n < MIN_CORRESPONDENCES {
            return Err(DrishtiError::InsufficientCorrespondences(format!(
                "need at least {MIN_CORRESPONDENCES} point pairs, got {n}"
            )));
        }

        let object: Vec<Vector3<f64>> = set
            .object
            .iter()
            .map(|p| Vector3::new(p.x as f64, p.y as f64, p.z as f64))
            .collect();
        let pixels: Vec<Vector2<f64>> = set
            .image
            .iter()
            .map(|p| Vector2::new(p.u as f64, p.v as f64))
            .collect();
        check_not_collinear(&object)?;

        let fx = intrinsics.fx() as f64;
        let fy = intrinsics.fy() as f64;
        let cx = intrinsics.cx() as f64;
        let cy = intrinsics.cy() as f64;

        let mut rotation = Matrix3::<f64>::identity();
        let mut translation = Vector3::<f64>::zeros();
        let mut damping = AdaptiveDamping::new();
        let mut current_cost =
            reprojection_cost(&object, &pixels, &rotation, &translation, fx, fy, cx, cy);
        let mut iterations = 0;
        let mut converged = false;

        for _ in 0..self.config.max_iterations {
            iterations += 1;

            // Accumulate normal equations H * delta = -g.
            let mut h = Matrix6::<f64>::zeros();
            let mut g = Vector6::<f64>::zeros();
            for (p, pixel) in object.iter().zip(&pixels) {
                let q = rotation * p + translation;
                let z = q.z.max(MIN_DEPTH);
                let residual = Vector2::new(
                    fx * q.x / z + cx - pixel.x,
                    fy * q.y / z + cy - pixel.y,
                );

                // d(pixel)/d(camera point)
                let a = Matrix2x3::new(
                    fx / z,
                    0.0,
                    -fx * q.x / (z * z),
                    0.0,
                    fy / z,
                    -fy * q.y / (z * z),
                );
                // Left-multiplicative update: d(camera point)/d(omega) = -[R p]x.
                let rp = rotation * p;
                let jw = -(a * skew(&rp));

                let mut j = Matrix2x6::<f64>::zeros();
                j.fixed_view_mut::<2, 3>(0, 0).copy_from(&jw);
                j.fixed_view_mut::<2, 3>(0, 3).copy_from(&a);

                h += j.transpose() * j;
                g += j.transpose() * residual;
            }

            if g.norm() < 1e-12 {
                converged = true;
                break;
            }

            let lambda = damping.value();
            let mut h_damped = h;
            for i in 0..6 {
                h_damped[(i, i)] += lambda * (1.0 + h_damped[(i, i)]);
            }

            let delta = match h_damped.lu().solve(&(-g)) {
                Some(d) => d,
                None => {
                    damping.reject_step();
                    if damping.is_stuck() {
                        break;
                    }
                    continue;
                }
            };
            if delta.iter().any(|d| !d.is_finite()) {
                break;
            }

            // Predicted reduction from the local quadratic model.
            let predicted = -delta.dot(&g) - 0.5 * delta.dot(&(h * delta));

            let omega = Vector3::new(delta[0], delta[1], delta[2]);
            let step = Vector3::new(delta[3], delta[4], delta[5]);
            let candidate_rotation = exp_so3(&omega) * rotation;
            let candidate_translation = translation + step;
            let candidate_cost = reprojection_cost(
                &object,
                &pixels,
                &candidate_rotation,
                &candidate_translation,
                fx,
                fy,
                cx,
                cy,
            );

            let actual = current_cost - candidate_cost;
            let rho = if predicted.abs() > 1e-12 {
                actual / predicted
            } else if actual > 0.0 {
                1.0
            } else {
                0.0
            };

            if actual > 0.0 {
                rotation = candidate_rotation;
                translation = candidate_translation;
                current_cost = candidate_cost;
                damping.update(rho);

                if delta.norm() < self.config.step_tolerance as f64 {
                    converged = true;
                    break;
                }
            } else {
                damping.reject_step();
                if damping.is_stuck() {
                    break;
                }
            }
        }

        let pose = ExtrinsicPose::new(rotation.map(|v| v as f32), translation.map(|v| v as f32));
        let rms_error = (current_cost / n as f64).sqrt() as f32;

        Ok(PnpSolution {
            pose,
            rms_error,
            iterations,
            converged,
        })
    }
}

/// Total squared reprojection error in pixels.
#[allow(clippy::too_many_arguments)]
fn reprojection_cost(
    object: &[Vector3<f64>],
    pixels: &[Vector2<f64>],
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
    fx: f64,
    fy: f64,
    cx: f64,
    cy: f64,
) -> f64 {
    object
        .iter()
        .zip(pixels)
        .map(|(p, pixel)| {
            let q = rotation * p + translation;
            let z = q.z.max(MIN_DEPTH);
            let du = fx * q.x / z + cx - pixel.x;
            let dv = fy * q.y / z + cy - pixel.y;
            du * du + dv * dv
        })
        .sum()
}

/// Reject point sets whose scatter collapses to a line (or a point).
fn check_not_collinear(object: &[Vector3<f64>]) -> Result<()> {
    let n = object.len() as f64;
    let centroid = object.iter().sum::<Vector3<f64>>() / n;

    let mut scatter = Matrix3::<f64>::zeros();
    for p in object {
        let d = p - centroid;
        scatter += d * d.transpose();
    }

    let mut eigenvalues: Vec<f64> = scatter.symmetric_eigenvalues().iter().copied().collect();
    eigenvalues.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

    let degenerate = eigenvalues[0] <= 0.0
        || eigenvalues[1].max(0.0) / eigenvalues[0] < COLLINEARITY_RATIO;
    if degenerate {
        return Err(DrishtiError::InsufficientCorrespondences(
            "object points are collinear, pose is unconstrained".to_string(),
        ));
    }
    Ok(())
}

/// Rodrigues exponential map so(3) -> SO(3).
fn exp_so3(omega: &Vector3<f64>) -> Matrix3<f64> {
    let theta = omega.norm();
    let k = skew(omega);
    if theta < 1e-12 {
        return Matrix3::identity() + k;
    }
    Matrix3::identity()
        + (theta.sin() / theta) * k
        + ((1.0 - theta.cos()) / (theta * theta)) * (k * k)
}

#[inline]
fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Adaptive damping schedule for the normal equations.
///
/// Good steps (actual reduction close to predicted) relax the damping
/// toward pure Gauss-Newton; bad steps raise it toward gradient descent.
#[derive(Debug, Clone)]
struct AdaptiveDamping {
    lambda: f64,
    factor: f64,
    min: f64,
    max: f64,
}

impl AdaptiveDamping {
    fn new() -> Self {
        Self {
            lambda: 1e-3,
            factor: 10.0,
            min: 1e-7,
            max: 1e7,
        }
    }

    fn value(&self) -> f64 {
        self.lambda
    }

    /// Adjust lambda from the step quality ratio rho.
    fn update(&mut self, rho: f64) {
        if rho > 0.75 {
            self.lambda = (self.lambda / self.factor).max(self.min);
        } else if rho > 0.25 {
            self.lambda = (self.lambda / self.factor.sqrt()).max(self.min);
        } else if rho < 0.0 {
            self.lambda = (self.lambda * self.factor).min(self.max);
        }
    }

    fn reject_step(&mut self) {
        self.lambda = (self.lambda * self.factor).min(self.max);
    }

    fn is_stuck(&self) -> bool {
        self.lambda >= self.max * 0.99
    }
}
