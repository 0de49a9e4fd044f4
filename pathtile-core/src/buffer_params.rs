//! Geometry of the render buffer a pass writes into.

use crate::{ConfigError, PixelRect};
use serde::{Deserialize, Serialize};

/// Region of the full frame covered by a render buffer.
///
/// `full_x`/`full_y` place the region inside the full frame. The buffer
/// itself only stores `width * height` pixels, addressed through
/// [`BufferParams::offset_stride`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferParams {
    pub full_x: u32,
    pub full_y: u32,
    pub width: u32,
    pub height: u32,
    pub full_width: u32,
    pub full_height: u32,
}

impl BufferParams {
    /// Buffer covering the whole frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            full_x: 0,
            full_y: 0,
            width,
            height,
            full_width: width,
            full_height: height,
        }
    }

    /// Buffer covering a border region of a larger frame.
    pub fn region(full_frame: (u32, u32), rect: PixelRect) -> Self {
        Self {
            full_x: rect.x,
            full_y: rect.y,
            width: rect.width,
            height: rect.height,
            full_width: full_frame.0,
            full_height: full_frame.1,
        }
    }

    /// Region in full-frame coordinates.
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.full_x, self.full_y, self.width, self.height)
    }

    pub fn num_pixels(&self) -> u64 {
        self.rect().area()
    }

    /// Offset and stride mapping a full-frame pixel to a buffer index.
    ///
    /// `index = offset + x + y * stride`, with `(x, y)` in full-frame
    /// coordinates.
    pub fn offset_stride(&self) -> (i64, i64) {
        let stride = self.width as i64;
        let offset = -(self.full_x as i64 + self.full_y as i64 * stride);
        (offset, stride)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBuffer {
                width: self.width,
                height: self.height,
            });
        }
        let frame = PixelRect::new(0, 0, self.full_width, self.full_height);
        if !frame.contains_rect(&self.rect()) {
            return Err(ConfigError::RegionOutsideFrame {
                region: self.rect(),
                full_width: self.full_width,
                full_height: self.full_height,
            });
        }
        Ok(())
    }
}
