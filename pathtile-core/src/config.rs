//! Session configuration and named presets.
//!
//! The configuration is plain data so it can be loaded from JSON and shared
//! between the scheduling thread and workers.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of one render session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Total number of samples per pixel.
    pub samples: u32,
    /// Index of the first sample, for resumed or distributed renders.
    pub sample_offset: u32,
    /// CPU worker threads. Zero uses the available parallelism.
    pub threads: usize,
    /// Limit in seconds for how long path tracing may run. Zero means no limit.
    pub time_limit: f64,
    /// Split the frame into big tiles rendered one after another.
    pub use_auto_tile: bool,
    /// Side of a big tile in pixels, used with `use_auto_tile`.
    pub tile_size: u32,
    /// Samples rendered by the first scheduling step.
    pub start_samples: u32,
    /// Upper bound on samples rendered by one scheduling step.
    pub max_samples_per_step: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        FINAL_CONFIG
    }
}

impl SessionConfig {
    /// Parse a configuration, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.sample_offset.checked_add(self.samples).is_none() {
            return Err(ConfigError::SampleRangeOverflow {
                offset: self.sample_offset,
                samples: self.samples,
            });
        }
        if self.use_auto_tile && self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if self.start_samples == 0 || self.max_samples_per_step < self.start_samples {
            return Err(ConfigError::InvalidStepSamples {
                start: self.start_samples,
                max: self.max_samples_per_step,
            });
        }
        if Duration::try_from_secs_f64(self.time_limit).is_err() {
            return Err(ConfigError::InvalidTimeLimit(self.time_limit));
        }
        Ok(())
    }

    /// Number of CPU worker threads to spawn.
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

/// Named configuration preset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionPreset {
    pub id: &'static str,
    pub display_name: &'static str,
    pub config: SessionConfig,
}

const FINAL_CONFIG: SessionConfig = SessionConfig {
    samples: 1024,
    sample_offset: 0,
    threads: 0,
    time_limit: 0.0,
    use_auto_tile: true,
    tile_size: 2048,
    start_samples: 1,
    max_samples_per_step: 64,
};

pub static SESSION_PRESETS: &[SessionPreset] = &[
    SessionPreset {
        id: "final",
        display_name: "Final Render",
        config: FINAL_CONFIG,
    },
    SessionPreset {
        id: "preview",
        display_name: "Interactive Preview",
        config: SessionConfig {
            samples: 64,
            sample_offset: 0,
            threads: 0,
            time_limit: 0.0,
            use_auto_tile: false,
            tile_size: 2048,
            start_samples: 1,
            max_samples_per_step: 4,
        },
    },
    SessionPreset {
        id: "quick",
        display_name: "Time Limited",
        config: SessionConfig {
            samples: 4096,
            sample_offset: 0,
            threads: 0,
            time_limit: 10.0,
            use_auto_tile: true,
            tile_size: 1024,
            start_samples: 1,
            max_samples_per_step: 16,
        },
    },
];

/// Look up a preset by ID.
pub fn get_session_preset(id: &str) -> Option<&'static SessionPreset> {
    SESSION_PRESETS.iter().find(|p| p.id == id)
}
