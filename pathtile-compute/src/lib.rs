pub mod atomics;
pub mod cancellation;
pub mod device;
pub mod error;
pub mod path_trace_workers;
pub mod render_buffer;
pub mod render_scheduler;
pub mod session;
pub mod work_tile_scheduler;

pub use cancellation::{CancellationChecker, ControlState, NeverCancel, SessionControl};
pub use device::{CpuDevice, Device, RenderKernel, DEFAULT_CPU_PATH_STATES};
pub use error::SessionError;
pub use path_trace_workers::{render_pass, render_pass_with_threads, PassStats};
pub use render_buffer::RenderBuffer;
pub use render_scheduler::{RenderScheduler, RenderWork};
pub use session::Session;
pub use work_tile_scheduler::{Work, WorkTileScheduler};

// Re-export core types for convenience
pub use pathtile_core::*;
