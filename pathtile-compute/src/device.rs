//! Device execution layer: the collaborators which turn work tiles into samples.

use crate::RenderBuffer;
use pathtile_core::KernelWorkTile;

/// Computes one sample of one pixel. Shading itself lives outside this crate.
pub trait RenderKernel: Sync {
    fn render_pixel_sample(&self, x: u32, y: u32, sample: u32) -> f32;
}

impl<F> RenderKernel for F
where
    F: Fn(u32, u32, u32) -> f32 + Sync,
{
    fn render_pixel_sample(&self, x: u32, y: u32, sample: u32) -> f32 {
        self(x, y, sample)
    }
}

/// A render device driving one or more queues.
///
/// Every queue keeps up to `max_num_path_states()` path states in flight and
/// pulls work independently.
pub trait Device: Sync {
    fn name(&self) -> &str;

    /// Path states one queue of this device can hold at once.
    fn max_num_path_states(&self) -> u32;

    /// Number of queues (CPU threads, GPU streams) pulling work concurrently.
    fn num_queues(&self) -> usize {
        1
    }

    /// Whether the queues are host threads, so a session thread count
    /// replaces `num_queues()`.
    fn uses_cpu_threads(&self) -> bool {
        false
    }

    /// Render a batch of tiles and accumulate the samples into `buffer`.
    fn render_tiles(&self, tiles: &[KernelWorkTile], buffer: &RenderBuffer);
}

/// Path states a CPU thread keeps for one tile by default.
pub const DEFAULT_CPU_PATH_STATES: u32 = 64 * 64;

/// Renders tiles on CPU threads, pixel by pixel.
pub struct CpuDevice<K> {
    kernel: K,
    threads: usize,
    max_num_path_states: u32,
}

impl<K: RenderKernel> CpuDevice<K> {
    pub fn new(kernel: K, threads: usize) -> Self {
        Self {
            kernel,
            threads: threads.max(1),
            max_num_path_states: DEFAULT_CPU_PATH_STATES,
        }
    }

    pub fn with_path_states(mut self, max_num_path_states: u32) -> Self {
        self.max_num_path_states = max_num_path_states;
        self
    }
}

impl<K: RenderKernel> Device for CpuDevice<K> {
    fn name(&self) -> &str {
        "CPU"
    }

    fn max_num_path_states(&self) -> u32 {
        self.max_num_path_states
    }

    fn num_queues(&self) -> usize {
        self.threads
    }

    fn uses_cpu_threads(&self) -> bool {
        true
    }

    fn render_tiles(&self, tiles: &[KernelWorkTile], buffer: &RenderBuffer) {
        for tile in tiles {
            for sample in tile.start_sample..tile.start_sample + tile.num_samples {
                for y in tile.y..tile.y + tile.h {
                    for x in tile.x..tile.x + tile.w {
                        let value = self.kernel.render_pixel_sample(x, y, sample);
                        buffer.add_sample(tile.buffer_index(x, y), value);
                    }
                }
            }
        }
    }
}
