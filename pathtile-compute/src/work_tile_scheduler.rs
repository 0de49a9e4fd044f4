//! Lock-free handout of one-sample tiles for a render pass.
//!
//! The work of a pass is the flattened index space
//! `[0, num_tiles_x * num_tiles_y * samples_num)`, with the sample as the
//! slowest varying dimension so every tile is visited once before any tile
//! gets its next sample. A single atomic cursor walks that space; there is no
//! queue and no lock.

use pathtile_core::{
    tile_calculate_best_size, BufferParams, KernelWorkTile, SampleRange, TileSize,
};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Outcome of [`WorkTileScheduler::get_work`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Work {
    /// A unit claimed by this caller and no one else.
    Tile(KernelWorkTile),
    /// The next unit is larger than the caller's budget. It stays unclaimed;
    /// retry once path states are freed.
    DoesNotFit,
    /// Nothing left in this pass. Stays so until the next `reset()`.
    Exhausted,
}

impl Work {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Work::Exhausted)
    }

    pub fn tile(self) -> Option<KernelWorkTile> {
        match self {
            Work::Tile(tile) => Some(tile),
            _ => None,
        }
    }
}

/// Splits a buffer and sample range into work tiles for concurrent workers.
///
/// `reset()` takes `&mut self`, so a pass can only be restarted once every
/// worker borrowing the scheduler for the previous pass is gone.
///
/// A worker which keeps getting [`Work::DoesNotFit`] holds no claim, so the
/// unit at the cursor stays at the head of the pass until some worker with
/// enough free path states takes it. Nothing orders the retries: a worker
/// may see `DoesNotFit` repeatedly while others drain the rest of the pass,
/// and a device whose budget never grows stalls on that unit.
///
/// Claims under a budget smaller than a nominal tile use a compare-exchange
/// loop instead of one increment. That path is lock-free, not wait-free: a
/// caller retries for as long as other claims keep moving the cursor.
pub struct WorkTileScheduler {
    max_num_path_states: u32,

    buffer_params: BufferParams,
    offset: i64,
    stride: i64,
    sample_range: SampleRange,

    tile_size: TileSize,
    num_tiles_x: u32,
    num_tiles_y: u32,
    total_tiles_num: i64,
    total_work_size: i64,
    is_reset: bool,

    next_work_index: AtomicI64,
    num_deferred: AtomicU64,
}

impl Default for WorkTileScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkTileScheduler {
    pub fn new() -> Self {
        Self {
            max_num_path_states: 0,
            buffer_params: BufferParams::new(0, 0),
            offset: 0,
            stride: 0,
            sample_range: SampleRange::default(),
            tile_size: TileSize::new(1, 1),
            num_tiles_x: 0,
            num_tiles_y: 0,
            total_tiles_num: 0,
            total_work_size: 0,
            is_reset: false,
            next_work_index: AtomicI64::new(0),
            num_deferred: AtomicU64::new(0),
        }
    }

    /// Set the number of path states the device can keep in flight.
    ///
    /// Takes effect on the next `reset()`.
    pub fn set_max_num_path_states(&mut self, max_num_path_states: u32) {
        debug_assert!(max_num_path_states > 0, "path state capacity must be nonzero");
        self.max_num_path_states = max_num_path_states;
    }

    pub fn max_num_path_states(&self) -> u32 {
        self.max_num_path_states
    }

    /// Start a new pass over `buffer_params` for `samples_num` samples
    /// beginning at `sample_start`.
    pub fn reset(&mut self, buffer_params: &BufferParams, sample_start: u32, samples_num: u32) {
        debug_assert!(
            self.max_num_path_states > 0,
            "set_max_num_path_states() must be called before reset()"
        );
        debug_assert!(
            sample_start.checked_add(samples_num).is_some(),
            "sample range {sample_start}+{samples_num} overflows u32"
        );

        self.buffer_params = *buffer_params;
        (self.offset, self.stride) = buffer_params.offset_stride();
        self.sample_range = SampleRange::new(sample_start, samples_num);

        self.reset_scheduler_state();
    }

    fn reset_scheduler_state(&mut self) {
        let image_size = (self.buffer_params.width, self.buffer_params.height);

        self.tile_size = tile_calculate_best_size(
            image_size,
            self.sample_range.num,
            self.max_num_path_states.max(1),
        );

        log::debug!(
            "Number of unused path states: {}",
            self.max_num_path_states as i64 - self.tile_size.area() as i64
        );

        (self.num_tiles_x, self.num_tiles_y) = self.tile_size.grid_for(image_size);

        self.total_tiles_num = self.num_tiles_x as i64 * self.num_tiles_y as i64;
        self.total_work_size = self.total_tiles_num * self.sample_range.num as i64;
        self.is_reset = true;

        *self.next_work_index.get_mut() = 0;
        *self.num_deferred.get_mut() = 0;
    }

    /// Claim the next unit of work.
    ///
    /// `max_work_size` is the number of path states the caller can take right
    /// now, zero meaning unlimited. It must not exceed the configured
    /// capacity.
    pub fn get_work(&self, max_work_size: u32) -> Work {
        debug_assert!(self.max_num_path_states > 0, "path state capacity must be nonzero");
        debug_assert!(self.is_reset, "get_work() called before reset()");
        debug_assert!(
            max_work_size <= self.max_num_path_states,
            "work size limit {max_work_size} above capacity {}",
            self.max_num_path_states
        );

        // Every tile fits when the budget covers a nominal tile, boundary
        // tiles only being smaller.
        if max_work_size == 0 || max_work_size as u64 >= self.tile_size.area() {
            return self.claim_any();
        }

        self.claim_fitting(max_work_size as u64)
    }

    fn claim_any(&self) -> Work {
        // Fields read below were written by reset() under &mut, which
        // happens-before any shared borrow used here.
        let work_index = self.next_work_index.fetch_add(1, Ordering::Relaxed);
        if work_index >= self.total_work_size {
            return Work::Exhausted;
        }
        Work::Tile(self.work_tile_at(work_index))
    }

    /// Claim the unit at the cursor only if it fits into `max_work_size`.
    ///
    /// Un-claiming by decrementing the cursor after a blind increment would
    /// hand out the index of any claim made in between a second time, so the
    /// fit check happens before the claim is committed.
    fn claim_fitting(&self, max_work_size: u64) -> Work {
        let mut work_index = self.next_work_index.load(Ordering::Relaxed);
        loop {
            if work_index >= self.total_work_size {
                return Work::Exhausted;
            }

            let work_tile = self.work_tile_at(work_index);
            if work_tile.work_size() > max_work_size {
                self.num_deferred.fetch_add(1, Ordering::Relaxed);
                return Work::DoesNotFit;
            }

            match self.next_work_index.compare_exchange_weak(
                work_index,
                work_index + 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Work::Tile(work_tile),
                Err(current) => work_index = current,
            }
        }
    }

    /// Decompose a flat work index into its tile.
    fn work_tile_at(&self, work_index: i64) -> KernelWorkTile {
        let sample = work_index / self.total_tiles_num;
        let tile_index = work_index - sample * self.total_tiles_num;
        let tile_y = (tile_index / self.num_tiles_x as i64) as u32;
        let tile_x = (tile_index - tile_y as i64 * self.num_tiles_x as i64) as u32;

        let x = tile_x * self.tile_size.width;
        let y = tile_y * self.tile_size.height;

        KernelWorkTile {
            x: x + self.buffer_params.full_x,
            y: y + self.buffer_params.full_y,
            w: self.tile_size.width.min(self.buffer_params.width - x),
            h: self.tile_size.height.min(self.buffer_params.height - y),
            start_sample: self.sample_range.start + sample as u32,
            num_samples: 1,
            offset: self.offset,
            stride: self.stride,
        }
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    /// Tile grid dimensions of the current pass.
    pub fn num_tiles(&self) -> (u32, u32) {
        (self.num_tiles_x, self.num_tiles_y)
    }

    pub fn total_tiles_num(&self) -> u64 {
        self.total_tiles_num as u64
    }

    pub fn total_work_size(&self) -> u64 {
        self.total_work_size as u64
    }

    /// Units claimed so far in this pass.
    pub fn num_claimed(&self) -> u64 {
        self.next_work_index
            .load(Ordering::Relaxed)
            .clamp(0, self.total_work_size) as u64
    }

    /// How often a caller was told its unit did not fit.
    pub fn num_deferred(&self) -> u64 {
        self.num_deferred.load(Ordering::Relaxed)
    }

    pub fn sample_range(&self) -> SampleRange {
        self.sample_range
    }

    pub fn buffer_params(&self) -> &BufferParams {
        &self.buffer_params
    }
}

#[cfg(test)]
#[path = "work_tile_scheduler_tests.rs"]
mod tests;
