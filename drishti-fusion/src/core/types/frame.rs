//! Camera frame buffer.

/// Owned RGB8 image, row-major, three bytes per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// Wrap an existing RGB8 buffer.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width * height * 3) as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// All-black frame of the given size.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width * height * 3) as usize],
        }
    }

    /// RGB triple at pixel coordinates.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y * self.width + x) * 3) as usize;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Write the RGB triple at pixel coordinates.
    ///
    /// # Panics
    /// Panics if `x` or `y` is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = ((y * self.width + x) * 3) as usize;
        self.data[idx..idx + 3].copy_from_slice(&rgb);
    }
}
