//! Detection and fusion result types.

use serde::{Deserialize, Serialize};

use super::geometry::BoundingBox;

/// One detected object in image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Index into the model's class label list.
    pub class_id: usize,
    /// Best class score, in (threshold, 1].
    pub confidence: f32,
    /// Pixel rectangle, clipped to the frame.
    pub rect: BoundingBox,
}

/// Pairing of one projected scanner point with one detection.
///
/// Indices refer to the tick-local point and detection vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FusionMatch {
    pub point_index: usize,
    pub detection_index: usize,
}

/// Obstacle position in the vehicle coordinate system.
///
/// Right-handed: forward along the vehicle axis, lateral positive to the
/// left, height positive up. Meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VcsPoint {
    pub forward: f32,
    pub lateral: f32,
    pub height: f32,
    /// Class of the matched detection.
    pub class_id: usize,
    /// Confidence of the matched detection.
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_serde_roundtrip() {
        let det = Detection {
            class_id: 4,
            confidence: 0.87,
            rect: BoundingBox::new(10.0, 20.0, 30.0, 40.0),
        };
        let json = serde_json::to_string(&det).unwrap();
        let back: Detection = serde_json::from_str(&json).unwrap();

        assert_eq!(back, det);
    }
}
