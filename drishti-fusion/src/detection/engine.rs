//! Detection engine: preprocessing, backend inference, and postprocessing.

use std::path::Path;

use crate::core::types::{CameraFrame, Detection};
use crate::detection::decode::{decode_layer, DecodeParams};
use crate::detection::nms::non_max_suppression;
use crate::detection::onnx::OnnxBackend;
use crate::error::{DrishtiError, Result};

/// Abstraction over the model runtime.
///
/// Input is a CHW-planar f32 tensor; the output is one flat tensor per
/// model output layer.
pub trait InferenceBackend: Send {
    fn run(&mut self, input: &[f32], shape: [usize; 4]) -> Result<Vec<Vec<f32>>>;
}

/// Detector tuning parameters.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Square model input edge in pixels.
    pub input_size: u32,
    /// Name of the model's input tensor.
    pub input_name: String,
    pub confidence_threshold: f32,
    pub nms_threshold: f32,
    /// Class ids forwarded to fusion; everything else is discarded.
    pub accepted_classes: Vec<usize>,
    /// Swap the red and blue planes during preprocessing. Off for models
    /// trained on RGB input.
    pub swap_channels: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 416,
            input_name: "images".to_string(),
            confidence_threshold: 0.5,
            nms_threshold: 0.4,
            accepted_classes: vec![4],
            swap_channels: false,
        }
    }
}

/// Object detector over camera frames.
pub struct DetectionEngine {
    backend: Box<dyn InferenceBackend>,
    labels: Vec<String>,
    config: DetectorConfig,
}

impl std::fmt::Debug for DetectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionEngine")
            .field("labels", &self.labels)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DetectionEngine {
    pub fn new(
        backend: Box<dyn InferenceBackend>,
        labels: Vec<String>,
        config: DetectorConfig,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(DrishtiError::ModelLoad("label table is empty".to_string()));
        }
        for &class_id in &config.accepted_classes {
            if class_id >= labels.len() {
                return Err(DrishtiError::Configuration(format!(
                    "accepted class {class_id} is outside the label table of {} entries",
                    labels.len()
                )));
            }
        }
        Ok(Self {
            backend,
            labels,
            config,
        })
    }

    /// Load the ONNX model and label table from disk.
    pub fn from_files(
        model_path: &Path,
        labels_path: &Path,
        config: DetectorConfig,
    ) -> Result<Self> {
        let backend = OnnxBackend::load(model_path, config.input_name.clone())?;
        let labels = load_labels(labels_path)?;
        Self::new(Box::new(backend), labels, config)
    }

    /// Run the detector on one frame.
    ///
    /// Returned rectangles are in the frame's pixel space, already filtered
    /// by confidence and accepted class and deduplicated by NMS.
    pub fn infer(&mut self, frame: &CameraFrame) -> Result<Vec<Detection>> {
        if frame.width == 0 || frame.height == 0 {
            return Err(DrishtiError::Inference(
                "camera frame has zero size".to_string(),
            ));
        }

        let size = self.config.input_size as usize;
        let input = self.preprocess(frame);
        let layers = self.backend.run(&input, [1, 3, size, size])?;

        let params = DecodeParams {
            num_classes: self.labels.len(),
            confidence_threshold: self.config.confidence_threshold,
            accepted_classes: &self.config.accepted_classes,
            frame_width: frame.width,
            frame_height: frame.height,
        };
        let mut detections = Vec::new();
        for layer in &layers {
            detections.extend(decode_layer(layer, &params)?);
        }
        Ok(non_max_suppression(detections, self.config.nms_threshold))
    }

    pub fn class_name(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Stretch-resize to the model input square, then scale to [0, 1]
    /// CHW planes with the optional red/blue swap.
    fn preprocess(&self, frame: &CameraFrame) -> Vec<f32> {
        let size = self.config.input_size as usize;
        let resized = resize_rgb(frame, self.config.input_size, self.config.input_size);

        let mut input = vec![0.0f32; 3 * size * size];
        for c in 0..3 {
            let src_c = if self.config.swap_channels { 2 - c } else { c };
            for y in 0..size {
                for x in 0..size {
                    let hwc = (y * size + x) * 3 + src_c;
                    let chw = c * size * size + y * size + x;
                    input[chw] = resized[hwc] as f32 / 255.0;
                }
            }
        }
        input
    }
}

/// Bilinear resize of an RGB8 frame.
pub(crate) fn resize_rgb(frame: &CameraFrame, dst_w: u32, dst_h: u32) -> Vec<u8> {
    let src_w = frame.width as usize;
    let src_h = frame.height as usize;
    let dst_w = dst_w as usize;
    let dst_h = dst_h as usize;
    let mut dst = vec![0u8; dst_h * dst_w * 3];

    let x_ratio = src_w as f32 / dst_w as f32;
    let y_ratio = src_h as f32 / dst_h as f32;

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let sx = dx as f32 * x_ratio;
            let sy = dy as f32 * y_ratio;
            let sx0 = sx.floor() as usize;
            let sy0 = sy.floor() as usize;
            let sx1 = (sx0 + 1).min(src_w - 1);
            let sy1 = (sy0 + 1).min(src_h - 1);
            let fx = sx - sx0 as f32;
            let fy = sy - sy0 as f32;

            for c in 0..3 {
                let p00 = frame.data[(sy0 * src_w + sx0) * 3 + c] as f32;
                let p10 = frame.data[(sy0 * src_w + sx1) * 3 + c] as f32;
                let p01 = frame.data[(sy1 * src_w + sx0) * 3 + c] as f32;
                let p11 = frame.data[(sy1 * src_w + sx1) * 3 + c] as f32;

                let value = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;
                dst[(dy * dst_w + dx) * 3 + c] = value.round() as u8;
            }
        }
    }
    dst
}

/// Read one label per line, skipping blanks.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        DrishtiError::ModelLoad(format!("cannot read label file {}: {e}", path.display()))
    })?;
    let labels: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if labels.is_empty() {
        return Err(DrishtiError::ModelLoad(format!(
            "label file {} has no entries",
            path.display()
        )));
    }
    Ok(labels)
}
