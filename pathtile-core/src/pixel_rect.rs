use serde::{Deserialize, Serialize};

/// Rectangle in pixel space (always u32 coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create new pixel rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Calculate area in pixels
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// One past the last column.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if point is inside rectangle
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// True if `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &PixelRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check whether two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rect_area() {
        let rect = PixelRect::new(0, 0, 1920, 1080);
        assert_eq!(rect.area(), 1920 * 1080);
    }

    #[test]
    fn test_pixel_rect_area_does_not_overflow() {
        let rect = PixelRect::new(0, 0, 70_000, 70_000);
        assert_eq!(rect.area(), 4_900_000_000);
    }

    #[test]
    fn test_pixel_rect_contains_point() {
        let rect = PixelRect::new(10, 20, 100, 50);

        assert!(rect.contains(50, 40));
        assert!(rect.contains(10, 20)); // Top-left corner
        assert!(rect.contains(109, 69)); // Bottom-right corner
        assert!(!rect.contains(110, 70)); // Just outside
        assert!(!rect.contains(9, 20)); // Just left
        assert!(!rect.contains(50, 19)); // Just above
    }

    #[test]
    fn test_pixel_rect_contains_rect() {
        let image = PixelRect::new(0, 0, 10, 10);

        assert!(image.contains_rect(&PixelRect::new(5, 5, 5, 5)));
        assert!(image.contains_rect(&image));
        assert!(!image.contains_rect(&PixelRect::new(6, 5, 5, 5)));
    }

    #[test]
    fn test_pixel_rect_overlaps() {
        let a = PixelRect::new(0, 0, 4, 4);

        assert!(a.overlaps(&PixelRect::new(3, 3, 2, 2)));
        assert!(!a.overlaps(&PixelRect::new(4, 0, 2, 2))); // Touching edge
        assert!(!a.overlaps(&PixelRect::new(0, 4, 4, 4)));
    }

    #[test]
    fn test_pixel_rect_serialization_roundtrip() {
        let original = PixelRect::new(100, 200, 640, 480);

        let json = serde_json::to_string(&original).unwrap();
        let restored: PixelRect = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, original);
    }
}
