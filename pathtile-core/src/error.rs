//! Configuration error types.

use crate::PixelRect;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Render buffer is empty ({width}x{height})")]
    EmptyBuffer { width: u32, height: u32 },

    #[error("Region {region:?} lies outside the {full_width}x{full_height} frame")]
    RegionOutsideFrame {
        region: PixelRect,
        full_width: u32,
        full_height: u32,
    },

    #[error("Sample count must be at least 1")]
    ZeroSamples,

    #[error("Sample offset {offset} plus {samples} samples overflows the sample index")]
    SampleRangeOverflow { offset: u32, samples: u32 },

    #[error("Big tile size must be at least 1 pixel")]
    ZeroTileSize,

    #[error("Samples per step must be at least 1 (start {start}, max {max})")]
    InvalidStepSamples { start: u32, max: u32 },

    #[error("Time limit must be a non-negative number of seconds within range, got {0}")]
    InvalidTimeLimit(f64),

    #[error("Unknown session preset: {0}")]
    UnknownPreset(String),

    #[error("Failed to parse session config: {0}")]
    Parse(#[from] serde_json::Error),
}
