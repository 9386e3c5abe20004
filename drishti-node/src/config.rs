//! Configuration for the drishti node
//!
//! Loads configuration from a TOML file. Every field carries a default, so
//! a partial file (or none at all) yields a runnable configuration for the
//! reference vehicle.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use drishti_fusion::{
    CameraIntrinsics, DetectorConfig, DistortionCoeffs, FusionLoopConfig, MountingConfig,
    ScanPreprocessorConfig, SectorWindow,
};

use crate::error::Result;

/// Top-level node configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub scanner: ScannerSection,
    #[serde(default)]
    pub detector: DetectorSection,
    #[serde(default)]
    pub calibration: CalibrationSection,
    #[serde(default)]
    pub fusion: FusionSection,
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub governor: GovernorSection,
}

/// Camera sensor and lens model
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraSection {
    #[serde(default = "default_camera_width")]
    pub width: u32,

    #[serde(default = "default_camera_height")]
    pub height: u32,

    /// Row-major 3x3 camera matrix
    #[serde(default = "default_camera_matrix")]
    pub matrix: [f32; 9],

    /// Brown-Conrady coefficients (k1, k2, p1, p2, k3)
    #[serde(default = "default_distortion")]
    pub distortion: [f32; 5],
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            matrix: default_camera_matrix(),
            distortion: [0.0; 5],
        }
    }
}

/// Range scanner geometry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerSection {
    /// Half-open beam index windows facing the camera
    #[serde(default = "default_sectors")]
    pub sectors: Vec<[usize; 2]>,

    /// Scan plane height in camera axes, metres (negative is up)
    #[serde(default = "default_mount_height")]
    pub mount_height: f32,
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            sectors: default_sectors(),
            mount_height: default_mount_height(),
        }
    }
}

/// Object detector model and thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorSection {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// One class name per line
    #[serde(default = "default_labels_path")]
    pub labels_path: PathBuf,

    #[serde(default = "default_input_size")]
    pub input_size: u32,

    #[serde(default = "default_input_name")]
    pub input_name: String,

    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    #[serde(default = "default_nms_threshold")]
    pub nms_threshold: f32,

    /// Class ids forwarded to fusion
    #[serde(default = "default_accepted_classes")]
    pub accepted_classes: Vec<usize>,

    #[serde(default)]
    pub swap_channels: bool,
}

impl Default for DetectorSection {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("data/model.onnx"),
            labels_path: PathBuf::from("data/labels.txt"),
            input_size: 416,
            input_name: "images".to_string(),
            confidence_threshold: 0.5,
            nms_threshold: 0.4,
            accepted_classes: vec![4],
            swap_channels: false,
        }
    }
}

/// Extrinsic calibration input
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibrationSection {
    /// Correspondence fixture solved at startup
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
}

impl Default for CalibrationSection {
    fn default() -> Self {
        Self {
            fixture_path: PathBuf::from("data/calibration_fixture.json"),
        }
    }
}

/// Fusion loop timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FusionSection {
    #[serde(default = "default_fusion_rate")]
    pub rate_hz: f32,
}

impl Default for FusionSection {
    fn default() -> Self {
        Self { rate_hz: 10.0 }
    }
}

/// Recorded-data replay sources
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceSection {
    /// Directory of frames replayed as the camera feed
    #[serde(default = "default_frame_dir")]
    pub frame_dir: PathBuf,

    #[serde(default = "default_frame_rate")]
    pub frame_rate_hz: f32,

    /// JSON-lines file of recorded scans, replayed cyclically
    #[serde(default = "default_scan_log")]
    pub scan_log: PathBuf,

    #[serde(default = "default_scan_rate")]
    pub scan_rate_hz: f32,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            frame_dir: PathBuf::from("data/frames"),
            frame_rate_hz: 10.0,
            scan_log: PathBuf::from("data/scans.jsonl"),
            scan_rate_hz: 10.0,
        }
    }
}

/// Speed governor behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GovernorSection {
    /// Cruise speed with a clear path, m/s
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,

    /// Floor speed near obstacles, m/s
    #[serde(default = "default_min_speed")]
    pub min_speed: f32,

    /// Speed added per clear tick, m/s
    #[serde(default = "default_accel_step")]
    pub accel_step: f32,

    /// Speed removed per obstructed tick, m/s
    #[serde(default = "default_decel_step")]
    pub decel_step: f32,

    /// Obstacles nearer than this slow the vehicle, metres
    #[serde(default = "default_slow_radius")]
    pub slow_radius: f32,

    /// Moving-average window over nearest obstacle distance
    #[serde(default = "default_filter_window")]
    pub filter_window: usize,
}

impl Default for GovernorSection {
    fn default() -> Self {
        Self {
            max_speed: 1.0,
            min_speed: 0.3,
            accel_step: 0.05,
            decel_step: 0.1,
            slow_radius: 1.5,
            filter_window: 5,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: NodeConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Build the camera model from the configured matrix and distortion.
    pub fn intrinsics(&self) -> Result<CameraIntrinsics> {
        let intrinsics = CameraIntrinsics::from_row_major(
            self.camera.matrix,
            DistortionCoeffs::from_array(self.camera.distortion),
            self.camera.width,
            self.camera.height,
        )?;
        Ok(intrinsics)
    }

    pub fn scan_config(&self) -> ScanPreprocessorConfig {
        ScanPreprocessorConfig {
            sectors: self
                .scanner
                .sectors
                .iter()
                .map(|w| SectorWindow::new(w[0], w[1]))
                .collect(),
        }
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            input_size: self.detector.input_size,
            input_name: self.detector.input_name.clone(),
            confidence_threshold: self.detector.confidence_threshold,
            nms_threshold: self.detector.nms_threshold,
            accepted_classes: self.detector.accepted_classes.clone(),
            swap_channels: self.detector.swap_channels,
        }
    }

    pub fn mounting(&self) -> MountingConfig {
        MountingConfig {
            mount_height: self.scanner.mount_height,
        }
    }

    pub fn loop_config(&self) -> FusionLoopConfig {
        FusionLoopConfig {
            rate_hz: self.fusion.rate_hz,
        }
    }
}

fn default_camera_width() -> u32 {
    640
}

fn default_camera_height() -> u32 {
    480
}

fn default_camera_matrix() -> [f32; 9] {
    [
        340.120, 0.0, 319.986, 0.0, 324.714, 239.566, 0.0, 0.0, 1.0,
    ]
}

fn default_distortion() -> [f32; 5] {
    [0.0; 5]
}

fn default_frame_dir() -> PathBuf {
    PathBuf::from("data/frames")
}

fn default_frame_rate() -> f32 {
    10.0
}

fn default_scan_log() -> PathBuf {
    PathBuf::from("data/scans.jsonl")
}

fn default_scan_rate() -> f32 {
    10.0
}

fn default_sectors() -> Vec<[usize; 2]> {
    vec![[0, 127], [378, 505]]
}

fn default_mount_height() -> f32 {
    -0.058
}

fn default_model_path() -> PathBuf {
    PathBuf::from("data/model.onnx")
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("data/labels.txt")
}

fn default_input_size() -> u32 {
    416
}

fn default_input_name() -> String {
    "images".to_string()
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_nms_threshold() -> f32 {
    0.4
}

fn default_accepted_classes() -> Vec<usize> {
    vec![4]
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("data/calibration_fixture.json")
}

fn default_fusion_rate() -> f32 {
    10.0
}

fn default_max_speed() -> f32 {
    1.0
}

fn default_min_speed() -> f32 {
    0.3
}

fn default_accel_step() -> f32 {
    0.05
}

fn default_decel_step() -> f32 {
    0.1
}

fn default_slow_radius() -> f32 {
    1.5
}

fn default_filter_window() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();

        assert_eq!(config.camera.width, 640);
        assert_eq!(config.camera.height, 480);
        assert_eq!(config.scanner.sectors, vec![[0, 127], [378, 505]]);
        assert_eq!(config.detector.input_size, 416);
        assert_eq!(config.detector.accepted_classes, vec![4]);
        assert!(!config.detector.swap_channels);
        assert_eq!(config.fusion.rate_hz, 10.0);
        assert_eq!(config.governor.filter_window, 5);
    }

    #[test]
    fn test_default_intrinsics_are_valid() {
        let config = NodeConfig::default();
        let intrinsics = config.intrinsics().unwrap();

        assert_eq!(intrinsics.width(), 640);
        assert!((intrinsics.fx() - 340.120).abs() < 1e-3);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: NodeConfig = toml::from_str(
            r#"
[fusion]
rate_hz = 5.0

[scanner]
mount_height = -0.08
"#,
        )
        .unwrap();

        assert_eq!(config.fusion.rate_hz, 5.0);
        assert_eq!(config.scanner.mount_height, -0.08);
        // Everything else keeps its default.
        assert_eq!(config.source.scan_rate_hz, 10.0);
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.detector.confidence_threshold, 0.5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: NodeConfig = toml::from_str("").unwrap();
        assert_eq!(config.camera.width, 640);
        assert_eq!(config.governor.max_speed, 1.0);
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let config = NodeConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();

        assert!(text.contains("[camera]"));
        assert!(text.contains("[scanner]"));
        assert!(text.contains("[detector]"));
        assert!(text.contains("[calibration]"));
        assert!(text.contains("[fusion]"));
        assert!(text.contains("[source]"));
        assert!(text.contains("[governor]"));

        let parsed: NodeConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.camera.matrix, config.camera.matrix);
        assert_eq!(parsed.scanner.sectors, config.scanner.sectors);
    }

    #[test]
    fn test_scan_config_conversion() {
        let config = NodeConfig::default();
        let scan = config.scan_config();

        assert_eq!(scan.sectors.len(), 2);
        assert_eq!(scan.sectors[0], SectorWindow::new(0, 127));
        assert_eq!(scan.sectors[1], SectorWindow::new(378, 505));
    }

    #[test]
    fn test_bad_intrinsics_rejected() {
        let mut config = NodeConfig::default();
        config.camera.matrix = [0.0; 9];

        assert!(config.intrinsics().is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = NodeConfig::load("/nonexistent/drishti.toml").unwrap_err();
        assert!(matches!(err, crate::error::NodeError::Io(_)));
    }
}
