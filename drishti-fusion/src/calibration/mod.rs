//! Camera calibration: intrinsics, undistortion, and extrinsic pose solving.

mod context;
mod fixture;
mod intrinsics;
mod pnp;
mod undistort;

pub use context::CalibrationContext;
pub use fixture::{CalibrationFixture, CorrespondenceSet, FIXTURE_VERSION};
pub use intrinsics::{CameraIntrinsics, DistortionCoeffs};
pub use pnp::{ExtrinsicSolver, PnpConfig, PnpSolution, MIN_CORRESPONDENCES};
pub use undistort::UndistortMap;
