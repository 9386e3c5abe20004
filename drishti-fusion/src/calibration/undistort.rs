//! Undistortion remap table.
//!
//! The per-pixel source lookup is computed once at startup from the
//! distortion model; per-frame work is then a single bilinear gather pass.

use crate::calibration::intrinsics::CameraIntrinsics;
use crate::core::types::CameraFrame;

/// Precomputed source-pixel map for undistorting camera frames.
#[derive(Debug, Clone)]
pub struct UndistortMap {
    map_u: Vec<f32>,
    map_v: Vec<f32>,
    width: u32,
    height: u32,
}

impl UndistortMap {
    /// Build the remap table for the given intrinsics.
    ///
    /// For every output pixel: normalize through the inverse camera matrix,
    /// apply the forward distortion polynomial, then reproject through the
    /// camera matrix. The result is where in the distorted source image the
    /// undistorted pixel originates.
    pub fn build(intrinsics: &CameraIntrinsics) -> Self {
        let width = intrinsics.width();
        let height = intrinsics.height();
        let n = (width * height) as usize;
        let mut map_u = vec![0.0f32; n];
        let mut map_v = vec![0.0f32; n];
        let d = *intrinsics.distortion();

        for v in 0..height {
            for u in 0..width {
                let (x, y) = intrinsics.normalize_pixel(u as f32, v as f32);
                let r2 = x * x + y * y;
                let radial = 1.0 + r2 * (d.k1 + r2 * (d.k2 + r2 * d.k3));
                let xd = x * radial + 2.0 * d.p1 * x * y + d.p2 * (r2 + 2.0 * x * x);
                let yd = y * radial + d.p1 * (r2 + 2.0 * y * y) + 2.0 * d.p2 * x * y;
                let (su, sv) = intrinsics.denormalize(xd, yd);

                let idx = (v * width + u) as usize;
                map_u[idx] = su;
                map_v[idx] = sv;
            }
        }

        Self {
            map_u,
            map_v,
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Remap a frame through the table with bilinear interpolation.
    ///
    /// Source samples outside the frame contribute black, matching a
    /// constant-border remap.
    pub fn apply(&self, frame: &CameraFrame) -> CameraFrame {
        let mut out = vec![0u8; (self.width * self.height * 3) as usize];

        for idx in 0..(self.width * self.height) as usize {
            let su = self.map_u[idx];
            let sv = self.map_v[idx];
            let x0 = su.floor();
            let y0 = sv.floor();
            let fx = su - x0;
            let fy = sv - y0;
            let x0 = x0 as i64;
            let y0 = y0 as i64;

            for c in 0..3 {
                let p00 = sample_or_zero(frame, x0, y0, c);
                let p10 = sample_or_zero(frame, x0 + 1, y0, c);
                let p01 = sample_or_zero(frame, x0, y0 + 1, c);
                let p11 = sample_or_zero(frame, x0 + 1, y0 + 1, c);

                let value = p00 * (1.0 - fx) * (1.0 - fy)
                    + p10 * fx * (1.0 - fy)
                    + p01 * (1.0 - fx) * fy
                    + p11 * fx * fy;

                out[idx * 3 + c] = value.round() as u8;
            }
        }

        CameraFrame::new(self.width, self.height, out)
    }
}

#[inline]
fn sample_or_zero(frame: &CameraFrame, x: i64, y: i64, channel: usize) -> f32 {
    if x < 0 || y < 0 || x >= frame.width as i64 || y >= frame.height as i64 {
        return 0.0;
    }
    frame.data[((y as u32 * frame.width + x as u32) * 3) as usize + channel] as f32
}
