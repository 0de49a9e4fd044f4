//! Decides how many samples the next scheduling step renders.
//!
//! Steps start small so a first image appears quickly, then double up to
//! `max_samples_per_step`. With a time limit, a step is also clamped to the
//! samples the remaining time is predicted to allow.

use pathtile_core::{SampleRange, SessionConfig};
use serde::Serialize;
use std::time::Duration;

/// Samples to render over the whole buffer in one step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RenderWork {
    pub sample_range: SampleRange,
}

pub struct RenderScheduler {
    sample_offset: u32,
    num_samples: u32,
    time_limit: Option<Duration>,
    start_samples: u32,
    max_samples_per_step: u32,

    num_rendered_samples: u32,
    next_step_samples: u32,
    path_trace_time: Duration,
}

impl RenderScheduler {
    pub fn new(config: &SessionConfig) -> Self {
        let mut scheduler = Self {
            sample_offset: config.sample_offset,
            num_samples: config.samples,
            time_limit: None,
            start_samples: config.start_samples.max(1),
            max_samples_per_step: config.max_samples_per_step.max(1),
            num_rendered_samples: 0,
            next_step_samples: 0,
            path_trace_time: Duration::ZERO,
        };
        scheduler.set_time_limit(config.time_limit);
        scheduler.reset();
        scheduler
    }

    /// Restart sampling from the configured offset, e.g. for the next big tile.
    ///
    /// The time limit applies per reset.
    pub fn reset(&mut self) {
        self.num_rendered_samples = 0;
        self.next_step_samples = self.start_samples.min(self.max_samples_per_step);
        self.path_trace_time = Duration::ZERO;
    }

    pub fn set_num_samples(&mut self, num_samples: u32) {
        debug_assert!(
            self.sample_offset.checked_add(num_samples).is_some(),
            "sample range overflows u32"
        );
        self.num_samples = num_samples;
    }

    /// Limit in seconds, zero for none. Values no `Duration` can hold
    /// (negative, NaN, too large) also mean no limit.
    pub fn set_time_limit(&mut self, seconds: f64) {
        self.time_limit = Duration::try_from_secs_f64(seconds)
            .ok()
            .filter(|limit| !limit.is_zero());
    }

    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    pub fn num_rendered_samples(&self) -> u32 {
        self.num_rendered_samples
    }

    pub fn path_trace_time(&self) -> Duration {
        self.path_trace_time
    }

    fn time_limit_reached(&self) -> bool {
        self.time_limit
            .is_some_and(|limit| self.path_trace_time >= limit)
    }

    pub fn is_done(&self) -> bool {
        self.num_rendered_samples >= self.num_samples || self.time_limit_reached()
    }

    /// Average time of one sample over the buffer so far.
    fn time_per_sample(&self) -> Option<Duration> {
        (self.num_rendered_samples > 0)
            .then(|| self.path_trace_time / self.num_rendered_samples)
    }

    /// Work for the next step, `None` once all samples are rendered or the
    /// time limit is reached.
    pub fn get_render_work(&self) -> Option<RenderWork> {
        if self.is_done() {
            return None;
        }

        let remaining = self.num_samples - self.num_rendered_samples;
        let mut num = self.next_step_samples.min(remaining);

        if let (Some(limit), Some(per_sample)) = (self.time_limit, self.time_per_sample()) {
            if !per_sample.is_zero() {
                let time_left = limit.saturating_sub(self.path_trace_time);
                let affordable = time_left.as_nanos() / per_sample.as_nanos();
                num = num.min(affordable.clamp(1, u32::MAX as u128) as u32);
            }
        }

        Some(RenderWork {
            sample_range: SampleRange::new(self.sample_offset + self.num_rendered_samples, num),
        })
    }

    /// Account for a finished step.
    pub fn report_work_done(&mut self, work: &RenderWork, elapsed: Duration) {
        debug_assert_eq!(
            work.sample_range.start,
            self.sample_offset + self.num_rendered_samples,
            "render work reported out of order"
        );

        self.num_rendered_samples += work.sample_range.num;
        self.path_trace_time += elapsed;
        self.next_step_samples = self
            .next_step_samples
            .saturating_mul(2)
            .min(self.max_samples_per_step);
    }

    /// Time still needed at the current rate, `None` before the first step.
    pub fn estimated_remaining_time(&self) -> Option<Duration> {
        let per_sample = self.time_per_sample()?;
        let remaining = self.num_samples.saturating_sub(self.num_rendered_samples);
        let estimate = per_sample * remaining;
        Some(match self.time_limit {
            Some(limit) => estimate.min(limit.saturating_sub(self.path_trace_time)),
            None => estimate,
        })
    }

    /// Fraction of samples rendered, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.num_samples == 0 {
            return 1.0;
        }
        self.num_rendered_samples.min(self.num_samples) as f32 / self.num_samples as f32
    }
}
