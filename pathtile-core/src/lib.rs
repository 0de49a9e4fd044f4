pub mod big_tiles;
pub mod buffer_params;
pub mod config;
pub mod error;
pub mod pixel_rect;
pub mod progress;
pub mod tile_size;
pub mod work_tile;

pub use big_tiles::generate_big_tiles;
pub use buffer_params::BufferParams;
pub use config::{get_session_preset, SessionConfig, SessionPreset, SESSION_PRESETS};
pub use error::ConfigError;
pub use pixel_rect::PixelRect;
pub use progress::RenderProgress;
pub use tile_size::{tile_calculate_best_size, TileSize};
pub use work_tile::{KernelWorkTile, SampleRange};
