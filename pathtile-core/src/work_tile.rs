//! Units of work handed to devices.

use crate::PixelRect;
use serde::{Deserialize, Serialize};

/// Contiguous range of samples rendered by one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRange {
    pub start: u32,
    pub num: u32,
}

impl SampleRange {
    pub fn new(start: u32, num: u32) -> Self {
        Self { start, num }
    }

    /// One past the last sample.
    pub fn end(&self) -> u32 {
        self.start + self.num
    }

    pub fn is_empty(&self) -> bool {
        self.num == 0
    }

    pub fn contains(&self, sample: u32) -> bool {
        sample >= self.start && sample < self.end()
    }
}

/// A tile at one or more samples, fully self-describing for the device.
///
/// `x`/`y` are in full-frame coordinates. The buffer index of a pixel is
/// `offset + x + y * stride`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KernelWorkTile {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub start_sample: u32,
    pub num_samples: u32,
    pub offset: i64,
    pub stride: i64,
}

impl KernelWorkTile {
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.x, self.y, self.w, self.h)
    }

    pub fn pixel_count(&self) -> u64 {
        self.rect().area()
    }

    /// Number of path states needed to render this tile in one go.
    pub fn work_size(&self) -> u64 {
        self.pixel_count() * self.num_samples as u64
    }

    /// Buffer index of the full-frame pixel `(x, y)`.
    pub fn buffer_index(&self, x: u32, y: u32) -> usize {
        debug_assert!(self.rect().contains(x, y), "pixel ({x}, {y}) outside tile");
        (self.offset + x as i64 + y as i64 * self.stride) as usize
    }

    pub fn samples(&self) -> SampleRange {
        SampleRange::new(self.start_sample, self.num_samples)
    }
}
