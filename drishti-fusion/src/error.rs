//! Error types for the fusion pipeline.

use thiserror::Error;

/// Errors produced by the fusion pipeline.
///
/// Calibration and model-load failures are fatal at startup; the runtime
/// loop only surfaces `Inference` errors. Missing sensor data is not an
/// error (see `runtime::TickOutcome`).
#[derive(Error, Debug)]
pub enum DrishtiError {
    /// Invalid intrinsics, fixture, or pipeline configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Detector model or label artifacts could not be loaded.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Extrinsic calibration input is unusable (too few or degenerate points).
    #[error("Insufficient correspondences: {0}")]
    InsufficientCorrespondences(String),

    /// The inference backend failed at runtime.
    #[error("Inference error: {0}")]
    Inference(String),

    /// I/O failure while reading calibration or model data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for fusion operations.
pub type Result<T> = std::result::Result<T, DrishtiError>;
