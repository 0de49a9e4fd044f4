//! Accumulation buffer shared by all workers of a big tile.
//!
//! Layout per pixel, both addressed by `offset + x + y * stride`:
//! - sample count (`AtomicU32`)
//! - radiance sum (f32 bits in an `AtomicU32`)
//!
//! Workers finish tiles in any order and different samples of one pixel may
//! land concurrently, so every update is atomic.

use crate::atomics::{atomic_add_f32, atomic_load_f32};
use pathtile_core::BufferParams;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct RenderBuffer {
    params: BufferParams,
    sample_counts: Vec<AtomicU32>,
    radiance: Vec<AtomicU32>,
}

impl RenderBuffer {
    pub fn new(params: BufferParams) -> Self {
        let len = params.num_pixels() as usize;
        Self {
            params,
            sample_counts: (0..len).map(|_| AtomicU32::new(0)).collect(),
            radiance: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn params(&self) -> &BufferParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.sample_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_counts.is_empty()
    }

    /// Buffer index of a full-frame pixel.
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        debug_assert!(self.params.rect().contains(x, y), "pixel ({x}, {y}) outside buffer");
        let (offset, stride) = self.params.offset_stride();
        (offset + x as i64 + y as i64 * stride) as usize
    }

    /// Accumulate one sample at a buffer index.
    pub fn add_sample(&self, index: usize, value: f32) {
        atomic_add_f32(&self.radiance[index], value);
        self.sample_counts[index].fetch_add(1, Ordering::Relaxed);
    }

    pub fn sample_count(&self, x: u32, y: u32) -> u32 {
        self.sample_counts[self.index_of(x, y)].load(Ordering::Relaxed)
    }

    /// Mean radiance of a pixel, `None` if it has no samples yet.
    pub fn mean(&self, x: u32, y: u32) -> Option<f32> {
        let index = self.index_of(x, y);
        let count = self.sample_counts[index].load(Ordering::Relaxed);
        (count > 0).then(|| atomic_load_f32(&self.radiance[index]) / count as f32)
    }

    /// Mean radiance of every pixel in buffer order, zero where unsampled.
    pub fn means(&self) -> Vec<f32> {
        self.sample_counts
            .iter()
            .zip(&self.radiance)
            .map(|(count, sum)| match count.load(Ordering::Relaxed) {
                0 => 0.0,
                n => atomic_load_f32(sum) / n as f32,
            })
            .collect()
    }

    pub fn total_samples(&self) -> u64 {
        self.sample_counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed) as u64)
            .sum()
    }

    /// Smallest and largest per-pixel sample count.
    pub fn sample_count_range(&self) -> (u32, u32) {
        self.sample_counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .fold((u32::MAX, 0), |(lo, hi), n| (lo.min(n), hi.max(n)))
    }

    pub fn clear(&mut self) {
        for cell in self.sample_counts.iter_mut().chain(self.radiance.iter_mut()) {
            *cell.get_mut() = 0;
        }
    }
}
