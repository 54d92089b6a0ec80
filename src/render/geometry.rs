//! Shared geometry for marker drawing
//!
//! Constants and math used when compositing anchor markers over a
//! rendered plan.

/// Marker geometry constants
pub mod marker {
    /// Width of the dark ring drawn around a marker, in pixels
    pub const OUTLINE: f32 = 2.0;
    /// Alpha of the dark ring
    pub const OUTLINE_ALPHA: u8 = 220;
    /// Smallest diameter that is still drawn
    pub const MIN_SIZE: f32 = 1.0;

    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Calculate ellipse center and radii from bounding box
#[inline]
pub fn ellipse_from_bounds(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> (f32, f32, f32, f32) {
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let rx = ((max_x - min_x) * 0.5).max(0.5);
    let ry = ((max_y - min_y) * 0.5).max(0.5);
    (cx, cy, rx, ry)
}

/// Bounding box of a round marker of diameter `size` centered on a point
///
/// Returns (min_x, min_y, max_x, max_y). The top-left is the point shifted
/// by half the size, which is how markers are visually centered.
#[inline]
pub fn marker_bounds(cx: f32, cy: f32, size: f32) -> (f32, f32, f32, f32) {
    let half = size.max(marker::MIN_SIZE) * 0.5;
    (cx - half, cy - half, cx + half, cy + half)
}

/// Whether a bounding box overlaps a `width` x `height` canvas at all
#[inline]
pub fn bounds_overlap_canvas(bounds: (f32, f32, f32, f32), width: u32, height: u32) -> bool {
    let (min_x, min_y, max_x, max_y) = bounds;
    max_x > 0.0 && max_y > 0.0 && min_x < width as f32 && min_y < height as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_bounds_centered() {
        assert_eq!(marker_bounds(160.0, 140.0, 12.0), (154.0, 134.0, 166.0, 146.0));
    }

    #[test]
    fn test_marker_bounds_min_size() {
        assert_eq!(marker_bounds(10.0, 10.0, 0.0), (9.5, 9.5, 10.5, 10.5));
    }

    #[test]
    fn test_ellipse_from_marker_bounds() {
        let (min_x, min_y, max_x, max_y) = marker_bounds(50.0, 20.0, 12.0);
        assert_eq!(ellipse_from_bounds(min_x, min_y, max_x, max_y), (50.0, 20.0, 6.0, 6.0));
    }

    #[test]
    fn test_bounds_overlap_canvas() {
        assert!(bounds_overlap_canvas((-5.0, -5.0, 1.0, 1.0), 10, 10));
        assert!(!bounds_overlap_canvas((-5.0, 2.0, 0.0, 4.0), 10, 10));
        assert!(!bounds_overlap_canvas((10.0, 2.0, 14.0, 4.0), 10, 10));
        assert!(!bounds_overlap_canvas((f32::NAN, 2.0, f32::NAN, 4.0), 10, 10));
    }
}
