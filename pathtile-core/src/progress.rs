use serde::{Deserialize, Serialize};

/// Progress of a render session.
///
/// Samples are counted per pixel: a step that renders 4 samples over a big
/// tile advances `completed_samples` by 4 for that tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderProgress {
    pub completed_samples: u64,
    pub total_samples: u64,
    pub completed_tiles: u32,
    pub total_tiles: u32,
    pub elapsed_ms: f64,
    pub is_complete: bool,
}

impl RenderProgress {
    /// Create new progress tracker.
    pub fn new(total_tiles: u32, samples_per_tile: u32) -> Self {
        Self {
            total_samples: total_tiles as u64 * samples_per_tile as u64,
            total_tiles,
            ..Self::default()
        }
    }

    /// Calculate completion percentage (0.0 to 100.0).
    pub fn percentage(&self) -> f32 {
        if self.total_samples == 0 {
            0.0
        } else {
            (self.completed_samples as f32 / self.total_samples as f32) * 100.0
        }
    }

    /// Extrapolate the time still needed from the rate so far.
    ///
    /// Returns `None` until at least one sample has been rendered.
    pub fn estimated_remaining_ms(&self) -> Option<f64> {
        if self.completed_samples == 0 {
            return None;
        }
        let remaining = self.total_samples.saturating_sub(self.completed_samples);
        Some(self.elapsed_ms / self.completed_samples as f64 * remaining as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_progress_starts_at_zero() {
        let progress = RenderProgress::new(4, 25);
        assert_eq!(progress.completed_samples, 0);
        assert_eq!(progress.total_samples, 100);
        assert_eq!(progress.total_tiles, 4);
        assert!(!progress.is_complete);
    }

    #[test]
    fn percentage_calculation() {
        let mut progress = RenderProgress::new(1, 100);
        progress.completed_samples = 50;
        assert!((progress.percentage() - 50.0).abs() < 0.001);
    }

    #[test]
    fn percentage_zero_samples() {
        let progress = RenderProgress::new(0, 16);
        assert!((progress.percentage() - 0.0).abs() < 0.001);
    }

    #[test]
    fn remaining_time_unknown_before_first_sample() {
        let progress = RenderProgress::new(1, 64);
        assert_eq!(progress.estimated_remaining_ms(), None);
    }

    #[test]
    fn remaining_time_extrapolates_rate() {
        let mut progress = RenderProgress::new(2, 8);
        progress.completed_samples = 4;
        progress.elapsed_ms = 100.0;
        let remaining = progress.estimated_remaining_ms().unwrap();
        assert!((remaining - 300.0).abs() < 1e-9);
    }
}
