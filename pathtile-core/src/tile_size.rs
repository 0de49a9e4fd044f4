//! Tile size selection for a device's path-state budget.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Dimensions of a nominal tile. Boundary tiles may be smaller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Number of tiles needed along each axis to cover `image_size`.
    pub fn grid_for(&self, image_size: (u32, u32)) -> (u32, u32) {
        (
            image_size.0.div_ceil(self.width),
            image_size.1.div_ceil(self.height),
        )
    }
}

/// Share of the best reachable tile area a candidate must keep, in eighths.
const MIN_UTILIZATION_EIGHTHS: u64 = 7;

/// Calculate the tile size which best uses `max_num_path_states`.
///
/// Every pixel of a tile holds one path state while the tile renders a
/// sample, so the tile area never exceeds the capacity unless the whole image
/// fits, in which case one tile covers the image. Among the shapes that keep
/// at least 7/8 of the best reachable area busy, the most square one wins,
/// then the larger one, then the wider one.
///
/// Units are always one sample deep, so `samples_num` does not change the
/// shape; an empty sample range yields a single full-image tile.
pub fn tile_calculate_best_size(
    image_size: (u32, u32),
    samples_num: u32,
    max_num_path_states: u32,
) -> TileSize {
    debug_assert!(max_num_path_states > 0, "path state capacity must be nonzero");

    let (width, height) = image_size;
    if width == 0 || height == 0 || samples_num == 0 {
        return TileSize::new(width.max(1), height.max(1));
    }

    let capacity = max_num_path_states.max(1);
    if capacity == 1 {
        return TileSize::new(1, 1);
    }

    if capacity as u64 >= width as u64 * height as u64 {
        return TileSize::new(width, height);
    }

    // Widths above the capacity would leave a zero-height tile.
    let candidates = (1..=width.min(capacity)).map(|tile_width| {
        let tile_height = (capacity / tile_width).min(height);
        TileSize::new(tile_width, tile_height)
    });

    let best_area = candidates.clone().map(|t| t.area()).max().unwrap_or(1);

    candidates
        .filter(|t| t.area() * 8 >= best_area * MIN_UTILIZATION_EIGHTHS)
        .min_by_key(|t| (t.width.abs_diff(t.height), Reverse(t.area()), Reverse(t.width)))
        .unwrap_or(TileSize::new(1, 1))
}
