use crate::{BufferParams, PixelRect};

/// Split a frame into big tiles rendered one after another.
///
/// Each big tile gets its own buffer; tiles are produced row by row and the
/// last column and row are clipped to the frame.
pub fn generate_big_tiles(width: u32, height: u32, tile_size: u32) -> Vec<BufferParams> {
    debug_assert!(tile_size > 0, "big tile size must be nonzero");
    let tile_size = tile_size.max(1);

    let mut tiles = Vec::new();

    for y_start in (0..height).step_by(tile_size as usize) {
        for x_start in (0..width).step_by(tile_size as usize) {
            let w = tile_size.min(width - x_start);
            let h = tile_size.min(height - y_start);
            tiles.push(BufferParams::region(
                (width, height),
                PixelRect::new(x_start, y_start, w, h),
            ));
        }
    }

    tiles
}
