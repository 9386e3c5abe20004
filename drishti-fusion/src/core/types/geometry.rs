//! Geometric primitives shared across the pipeline.

use serde::{Deserialize, Serialize};

/// 2D point in the scanner plane, meters.
///
/// Scanner convention: x along the device forward axis, y to its left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance from the scanner origin.
    #[inline]
    pub fn range(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// 3D point, meters. The axis convention belongs to the owning frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Pixel-space point with sub-pixel precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub u: f32,
    pub v: f32,
}

impl ImagePoint {
    /// Sentinel for points that cannot be projected (behind the camera).
    pub const OUT_OF_FRAME: ImagePoint = ImagePoint { u: -1.0, v: -1.0 };

    #[inline]
    pub fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// True when the point lies inside a `width` x `height` image.
    ///
    /// The sentinel and any coordinate left of or above the origin fail
    /// this check.
    #[inline]
    pub fn in_frame(&self, width: f32, height: f32) -> bool {
        self.u >= 0.0 && self.u < width && self.v >= 0.0 && self.v < height
    }
}

/// Axis-aligned pixel rectangle.
///
/// Containment is half-open: the left and top edges belong to the box, the
/// right and bottom edges do not, so adjacent boxes never share a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Half-open containment test.
    #[inline]
    pub fn contains(&self, point: &ImagePoint) -> bool {
        point.u >= self.x && point.u < self.right() && point.v >= self.y && point.v < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point2d_range() {
        let p = Point2D::new(3.0, 4.0);
        assert_relative_eq!(p.range(), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_image_point_in_frame() {
        assert!(ImagePoint::new(0.0, 0.0).in_frame(640.0, 480.0));
        assert!(ImagePoint::new(639.9, 479.9).in_frame(640.0, 480.0));
        assert!(!ImagePoint::new(640.0, 240.0).in_frame(640.0, 480.0));
        assert!(!ImagePoint::new(320.0, 480.0).in_frame(640.0, 480.0));
        assert!(!ImagePoint::OUT_OF_FRAME.in_frame(640.0, 480.0));
    }

    #[test]
    fn test_bounding_box_edges_half_open() {
        let rect = BoundingBox::new(10.0, 20.0, 30.0, 40.0);

        // Left and top edges are inside.
        assert!(rect.contains(&ImagePoint::new(10.0, 20.0)));
        assert!(rect.contains(&ImagePoint::new(10.0, 59.9)));
        // Right and bottom edges are outside.
        assert!(!rect.contains(&ImagePoint::new(40.0, 30.0)));
        assert!(!rect.contains(&ImagePoint::new(20.0, 60.0)));
    }

    #[test]
    fn test_bounding_box_interior_and_exterior() {
        let rect = BoundingBox::new(0.0, 0.0, 100.0, 50.0);
        assert!(rect.contains(&ImagePoint::new(50.0, 25.0)));
        assert!(!rect.contains(&ImagePoint::new(-0.1, 25.0)));
        assert!(!rect.contains(&ImagePoint::new(150.0, 25.0)));
        assert_relative_eq!(rect.area(), 5000.0, epsilon = 1e-3);
    }

    #[test]
    fn test_adjacent_boxes_share_no_pixel() {
        let left = BoundingBox::new(0.0, 0.0, 50.0, 50.0);
        let right = BoundingBox::new(50.0, 0.0, 50.0, 50.0);
        let boundary = ImagePoint::new(50.0, 25.0);

        assert!(!left.contains(&boundary));
        assert!(right.contains(&boundary));
    }
}
