//! Drains one pass of a [`WorkTileScheduler`] with every queue of every device.

use crate::cancellation::CancellationChecker;
use crate::device::Device;
use crate::work_tile_scheduler::{Work, WorkTileScheduler};
use crate::RenderBuffer;
use pathtile_core::KernelWorkTile;
use serde::Serialize;
use std::thread;

/// What the queues did during one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    pub tiles: u64,
    pub pixel_samples: u64,
    pub batches: u64,
    /// Batches closed early because the next unit did not fit.
    pub deferrals: u64,
    /// A queue stopped on quick cancel before the pass was exhausted.
    pub cancelled: bool,
}

impl PassStats {
    fn merge(self, other: PassStats) -> PassStats {
        PassStats {
            tiles: self.tiles + other.tiles,
            pixel_samples: self.pixel_samples + other.pixel_samples,
            batches: self.batches + other.batches,
            deferrals: self.deferrals + other.deferrals,
            cancelled: self.cancelled || other.cancelled,
        }
    }
}

/// Render the current pass of `scheduler` into `buffer`.
///
/// Spawns one scoped thread per device queue and returns once every queue saw
/// the pass exhausted or the checker asked for a quick stop.
pub fn render_pass<C: CancellationChecker>(
    scheduler: &WorkTileScheduler,
    devices: &[&dyn Device],
    buffer: &RenderBuffer,
    cancel: &C,
) -> PassStats {
    render_pass_with_threads(scheduler, devices, None, buffer, cancel)
}

/// Like [`render_pass`], with `cpu_threads` queues for every device running
/// on host threads instead of the device's own count.
pub fn render_pass_with_threads<C: CancellationChecker>(
    scheduler: &WorkTileScheduler,
    devices: &[&dyn Device],
    cpu_threads: Option<usize>,
    buffer: &RenderBuffer,
    cancel: &C,
) -> PassStats {
    let num_queues = |device: &dyn Device| match cpu_threads {
        Some(threads) if device.uses_cpu_threads() => threads.max(1),
        _ => device.num_queues(),
    };

    thread::scope(|s| {
        let handles: Vec<_> = devices
            .iter()
            .flat_map(|&device| (0..num_queues(device)).map(move |queue| (device, queue)))
            .map(|(device, queue)| s.spawn(move || run_queue(scheduler, device, queue, buffer, cancel)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .fold(PassStats::default(), PassStats::merge)
    })
}

/// Work loop of one queue: fill the free path states with tiles, render them,
/// repeat.
fn run_queue<C: CancellationChecker>(
    scheduler: &WorkTileScheduler,
    device: &dyn Device,
    queue: usize,
    buffer: &RenderBuffer,
    cancel: &C,
) -> PassStats {
    let budget = scheduler.max_num_path_states() as u64;
    let mut stats = PassStats::default();
    let mut batch: Vec<KernelWorkTile> = Vec::new();

    loop {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            break;
        }

        let mut free_states = budget;
        let mut exhausted = false;
        while free_states > 0 {
            match scheduler.get_work(free_states as u32) {
                Work::Tile(tile) => {
                    free_states -= tile.work_size();
                    batch.push(tile);
                }
                Work::DoesNotFit => {
                    stats.deferrals += 1;
                    break;
                }
                Work::Exhausted => {
                    exhausted = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            if exhausted {
                break;
            }
            // Nothing fits right now; let other queues make progress.
            thread::yield_now();
            continue;
        }

        device.render_tiles(&batch, buffer);
        stats.batches += 1;
        stats.tiles += batch.len() as u64;
        stats.pixel_samples += batch.iter().map(KernelWorkTile::work_size).sum::<u64>();
        batch.clear();

        if exhausted {
            break;
        }
    }

    log::debug!(
        "{} queue {}: {} tiles in {} batches",
        device.name(),
        queue,
        stats.tiles,
        stats.batches
    );

    stats
}
