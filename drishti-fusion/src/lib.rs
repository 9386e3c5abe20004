//! drishti-fusion - Camera and range scanner fusion for obstacle localization
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    runtime/                         │  ← Orchestration
//! │            (sensor hub, fusion loop)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    fusion/                          │  ← Association
//! │        (projection matching, VCS obstacles)         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌───────────────────────────┬─────────────────────────┐
//! │        detection/         │       projection/       │  ← Perception
//! │   (ONNX inference, NMS)   │   (pinhole projection)  │
//! └───────────────────────────┴─────────────────────────┘
//!                          │
//! ┌───────────────────────────┬─────────────────────────┐
//! │        sensors/           │      calibration/       │  ← Geometry
//! │   (scan preprocessing)    │  (intrinsics, PnP)      │
//! └───────────────────────────┴─────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                    (types)                          │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipeline
//!
//! Sensor sources publish camera frames and range scans into a
//! [`SensorHub`]. Each tick of the [`FusionLoop`] undistorts the newest
//! frame, runs the object detector, converts the configured scan sectors
//! to Cartesian points, projects them into the image with the solved
//! scanner pose, and emits an obstacle in vehicle coordinates for every
//! point landing inside a detection rectangle.
//!
//! Calibration happens once at startup: a correspondence fixture is
//! solved twice against the same image observations, once for the scanner
//! mount and once for the vehicle frame.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Geometry (depends on core)
// ============================================================================
pub mod calibration;
pub mod sensors;

// ============================================================================
// Layer 3: Perception (depends on core, calibration)
// ============================================================================
pub mod detection;
pub mod projection;

// ============================================================================
// Layer 4: Association (depends on all lower layers)
// ============================================================================
pub mod fusion;

// ============================================================================
// Layer 5: Runtime orchestration
// ============================================================================
pub mod runtime;

pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

pub use error::{DrishtiError, Result};

// Core types
pub use core::types::{
    BoundingBox, CameraFrame, Detection, ExtrinsicPose, FusionMatch, ImagePoint, LaserScan,
    Point2D, Point3D, Timestamped, VcsPoint,
};

// Calibration
pub use calibration::{
    CalibrationContext, CalibrationFixture, CameraIntrinsics, CorrespondenceSet, DistortionCoeffs,
    ExtrinsicSolver, PnpConfig, PnpSolution, UndistortMap, FIXTURE_VERSION, MIN_CORRESPONDENCES,
};

// Sensors
pub use sensors::{ScanPreprocessor, ScanPreprocessorConfig, SectorWindow};

// Detection
pub use detection::{
    load_labels, non_max_suppression, DetectionEngine, DetectorConfig, InferenceBackend,
    OnnxBackend,
};

// Projection
pub use projection::{project_point, project_points};

// Fusion
pub use fusion::{FusionAssociator, FusionOutput, MountingConfig};

// Runtime
pub use runtime::{
    FusionLoop, FusionLoopConfig, LatestSlot, LoopStats, SensorHub, SkipReason, TickOutcome,
    TickReport,
};
