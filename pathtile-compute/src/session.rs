//! Render control loop: big tiles, scheduling steps and passes.

use crate::cancellation::{CancellationChecker, SessionControl};
use crate::device::Device;
use crate::path_trace_workers::render_pass_with_threads;
use crate::render_scheduler::RenderScheduler;
use crate::work_tile_scheduler::WorkTileScheduler;
use crate::{RenderBuffer, SessionError};
use pathtile_core::{generate_big_tiles, BufferParams, RenderProgress, SessionConfig};
use std::thread;
use std::time::{Duration, Instant};

const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Renders a frame with a set of devices according to a [`SessionConfig`].
///
/// The session owns the tile scheduler and lends it to the workers of one
/// pass at a time.
pub struct Session {
    config: SessionConfig,
    control: SessionControl,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            control: SessionControl::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Handle to pause or cancel the session from another thread.
    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    /// Big tiles the frame is rendered in, in render order.
    pub fn big_tiles(&self, width: u32, height: u32) -> Vec<BufferParams> {
        if self.config.use_auto_tile {
            generate_big_tiles(width, height, self.config.tile_size)
        } else {
            vec![BufferParams::new(width, height)]
        }
    }

    /// Render a `width` x `height` frame.
    ///
    /// CPU devices run `effective_threads()` queues from the session config,
    /// whatever thread count they were built with.
    ///
    /// `on_tile_done` receives every big tile once its sampling finished,
    /// including a tile cut short by cancellation.
    pub fn render<F>(
        &self,
        width: u32,
        height: u32,
        devices: &[&dyn Device],
        mut on_tile_done: F,
    ) -> Result<RenderProgress, SessionError>
    where
        F: FnMut(&BufferParams, &RenderBuffer),
    {
        BufferParams::new(width, height).validate()?;
        let max_num_path_states = min_path_states(devices)?;
        let cpu_threads = self.config.effective_threads();

        let big_tiles = self.big_tiles(width, height);
        let mut progress = RenderProgress::new(big_tiles.len() as u32, self.config.samples);
        let start = Instant::now();

        log::info!(
            "Rendering {}x{} in {} big tile(s), {} samples, {} path states, {} CPU threads",
            width,
            height,
            big_tiles.len(),
            self.config.samples,
            max_num_path_states,
            cpu_threads
        );

        let mut tile_scheduler = WorkTileScheduler::new();
        tile_scheduler.set_max_num_path_states(max_num_path_states);
        let mut render_scheduler = RenderScheduler::new(&self.config);
        let mut cancelled = false;

        for big_tile in &big_tiles {
            if self.control.stop_after_pass() {
                cancelled = true;
                break;
            }

            let buffer = RenderBuffer::new(*big_tile);
            render_scheduler.reset();

            while let Some(work) = render_scheduler.get_render_work() {
                self.wait_while_paused();
                if self.control.stop_after_pass() {
                    cancelled = true;
                    break;
                }

                let range = work.sample_range;
                tile_scheduler.reset(big_tile, range.start, range.num);

                let pass_start = Instant::now();
                let stats = render_pass_with_threads(
                    &tile_scheduler,
                    devices,
                    Some(cpu_threads),
                    &buffer,
                    &self.control,
                );
                let elapsed = pass_start.elapsed();

                if stats.cancelled {
                    log::warn!("Pass over samples {}..{} cancelled", range.start, range.end());
                    cancelled = true;
                    break;
                }

                render_scheduler.report_work_done(&work, elapsed);
                progress.completed_samples += range.num as u64;
                progress.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                log::debug!(
                    "Samples {}..{}: {} tiles of {}x{} in {} batches, {} deferrals, {:.2} ms",
                    range.start,
                    range.end(),
                    stats.tiles,
                    tile_scheduler.tile_size().width,
                    tile_scheduler.tile_size().height,
                    stats.batches,
                    stats.deferrals,
                    elapsed.as_secs_f64() * 1000.0
                );
            }

            on_tile_done(big_tile, &buffer);

            if cancelled {
                break;
            }
            progress.completed_tiles += 1;
            log::info!(
                "Big tile {}/{} done ({:.1}%)",
                progress.completed_tiles,
                progress.total_tiles,
                progress.percentage()
            );
        }

        progress.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        progress.is_complete = !cancelled && progress.completed_tiles == progress.total_tiles;
        Ok(progress)
    }

    fn wait_while_paused(&self) {
        while self.control.is_paused() {
            thread::sleep(PAUSE_POLL_INTERVAL);
        }
    }
}

/// Capacity of the tile scheduler: the smallest queue among the devices.
fn min_path_states(devices: &[&dyn Device]) -> Result<u32, SessionError> {
    if devices.is_empty() {
        return Err(SessionError::NoDevices);
    }
    if let Some(device) = devices.iter().find(|d| d.max_num_path_states() == 0) {
        return Err(SessionError::ZeroCapacity(device.name().to_string()));
    }
    Ok(devices
        .iter()
        .map(|d| d.max_num_path_states())
        .min()
        .unwrap_or(1))
}
