//! Greedy non-maximum suppression over decoded detections.

use crate::core::types::{BoundingBox, Detection};

/// Intersection-over-union of two rectangles, zero when they are disjoint
/// or degenerate.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Keep the highest-confidence detection in each overlapping cluster.
///
/// Suppression is decided against survivors only: a detection removed by a
/// stronger one cannot itself remove anything.
pub fn non_max_suppression(mut detections: Vec<Detection>, threshold: f32) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    while !detections.is_empty() {
        let current = detections.remove(0);
        detections.retain(|d| iou(&current.rect, &d.rect) <= threshold);
        keep.push(current);
    }
    keep
}
