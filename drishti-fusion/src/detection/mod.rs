//! Camera object detection: ONNX inference, tensor decoding, and NMS.

mod decode;
mod engine;
mod nms;
mod onnx;

pub use decode::{decode_layer, DecodeParams, CLASS_SCORE_OFFSET};
pub use engine::{load_labels, DetectionEngine, DetectorConfig, InferenceBackend};
pub use nms::{iou, non_max_suppression};
pub use onnx::OnnxBackend;
