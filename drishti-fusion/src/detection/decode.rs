//! Raw output tensor decoding for single-stage detectors.
//!
//! Each output layer is a flat row-major tensor whose rows hold
//! `[cx, cy, w, h, objectness, class scores...]` with all box fields
//! normalized to the frame. Rows pass when their best class score clears
//! the confidence threshold and the class is in the accepted set.

use crate::core::types::{BoundingBox, Detection};
use crate::error::{DrishtiError, Result};

/// Offset of the first class score inside a detection row.
pub const CLASS_SCORE_OFFSET: usize = 5;

/// Decode controls for one output layer.
#[derive(Debug, Clone)]
pub struct DecodeParams<'a> {
    pub num_classes: usize,
    pub confidence_threshold: f32,
    pub accepted_classes: &'a [usize],
    pub frame_width: u32,
    pub frame_height: u32,
}

/// Decode one flat output layer into pixel-space detections.
///
/// Rectangles are clipped to the frame; rows whose clipped rectangle
/// collapses to zero area are dropped.
pub fn decode_layer(data: &[f32], params: &DecodeParams) -> Result<Vec<Detection>> {
    let stride = CLASS_SCORE_OFFSET + params.num_classes;
    if data.len() % stride != 0 {
        return Err(DrishtiError::ModelLoad(format!(
            "output tensor length {} is not a multiple of row stride {stride}",
            data.len()
        )));
    }

    let mut detections = Vec::new();
    for row in data.chunks_exact(stride) {
        let scores = &row[CLASS_SCORE_OFFSET..];
        let (class_id, confidence) = best_class(scores);

        if confidence <= params.confidence_threshold {
            continue;
        }
        if !params.accepted_classes.contains(&class_id) {
            continue;
        }

        if let Some(rect) = decode_rect(row, params.frame_width, params.frame_height) {
            detections.push(Detection {
                class_id,
                confidence,
                rect,
            });
        }
    }
    Ok(detections)
}

/// Index and value of the highest class score.
fn best_class(scores: &[f32]) -> (usize, f32) {
    let mut best = 0;
    let mut best_score = f32::MIN;
    for (i, &score) in scores.iter().enumerate() {
        if score > best_score {
            best = i;
            best_score = score;
        }
    }
    (best, best_score)
}

/// Normalized center/size row fields to a clipped pixel rectangle.
fn decode_rect(row: &[f32], frame_width: u32, frame_height: u32) -> Option<BoundingBox> {
    let fw = frame_width as f32;
    let fh = frame_height as f32;
    let cx = row[0] * fw;
    let cy = row[1] * fh;
    let w = row[2] * fw;
    let h = row[3] * fh;

    let left = (cx - w / 2.0).max(0.0);
    let top = (cy - h / 2.0).max(0.0);
    let right = (cx + w / 2.0).min(fw);
    let bottom = (cy + h / 2.0).min(fh);

    let width = right - left;
    let height = bottom - top;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(BoundingBox::new(left, top, width, height))
}
