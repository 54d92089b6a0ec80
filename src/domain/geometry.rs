//! Geometric types for plan viewports and letterboxing

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Pixel size of a render target chosen by the caller
///
/// Both dimensions are non-zero. A zero-sized viewport would make every
/// stored anchor meaningless, so construction with zero panics instead of
/// guessing a size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub width: NonZeroU32,
    pub height: NonZeroU32,
}

impl Viewport {
    /// Create a viewport, panicking if either dimension is zero
    pub fn new(width: u32, height: u32) -> Self {
        match Self::try_new(width, height) {
            Some(viewport) => viewport,
            None => panic!("viewport dimensions must be positive, got {width}x{height}"),
        }
    }

    /// Create a viewport from untrusted dimensions
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
        })
    }

    /// Get the width as u32
    pub fn width(&self) -> u32 {
        self.width.get()
    }

    /// Get the height as u32
    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f64 {
        self.width() as f64 / self.height() as f64
    }
}

/// A position inside a viewport, in pixels from its top-left corner
///
/// Not constrained to the viewport: pointer events and marker offsets may
/// legitimately fall outside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelPos {
    pub px: f64,
    pub py: f64,
}

impl PixelPos {
    pub fn new(px: f64, py: f64) -> Self {
        Self { px, py }
    }
}

/// Natural size of a plan at scale 1 (image pixels or PDF points)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanSize {
    pub width: f64,
    pub height: f64,
}

impl PlanSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check that both dimensions are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Where a plan lands inside a viewport after contain-fit scaling
///
/// `scale` saturates one axis; the other axis is centered with floored
/// offsets. The floor must stay: rounding would move markers by up to half a
/// pixel relative to anchors stored against earlier renders.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Letterbox {
    /// Factor applied to the plan's natural size
    pub scale: f64,
    /// Scaled content width in whole pixels
    pub content_width: u32,
    /// Scaled content height in whole pixels
    pub content_height: u32,
    /// Left margin in pixels
    pub offset_x: u32,
    /// Top margin in pixels
    pub offset_y: u32,
}

impl Letterbox {
    /// Fit a plan of the given natural size into a viewport
    ///
    /// Panics if `plan` is not a valid size; decoders reject such plans
    /// before layout is attempted.
    pub fn fit(plan: PlanSize, viewport: Viewport) -> Self {
        assert!(plan.is_valid(), "plan size must be positive, got {plan:?}");

        let (vw, vh) = (viewport.width(), viewport.height());
        let scale = (vw as f64 / plan.width).min(vh as f64 / plan.height);

        let content_width = scaled_extent(plan.width, scale, vw);
        let content_height = scaled_extent(plan.height, scale, vh);

        // Both extents are clamped to the viewport, so these never underflow
        let offset_x = (vw - content_width) / 2;
        let offset_y = (vh - content_height) / 2;

        Self {
            scale,
            content_width,
            content_height,
            offset_x,
            offset_y,
        }
    }

    /// Check if a viewport position lies on the plan rather than the margin
    pub fn content_contains(&self, pos: PixelPos) -> bool {
        let left = self.offset_x as f64;
        let top = self.offset_y as f64;
        pos.px >= left
            && pos.px < left + self.content_width as f64
            && pos.py >= top
            && pos.py < top + self.content_height as f64
    }
}

/// Scale one plan dimension and round to a whole pixel in `1..=limit`
#[inline]
fn scaled_extent(natural: f64, scale: f64, limit: u32) -> u32 {
    let rounded = (natural * scale).round();
    if rounded < 1.0 {
        1
    } else if rounded >= limit as f64 {
        limit
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_viewport_try_new_rejects_zero() {
        assert!(Viewport::try_new(0, 10).is_none());
        assert!(Viewport::try_new(10, 0).is_none());
        assert_eq!(Viewport::try_new(320, 280).map(|v| v.width()), Some(320));
    }

    #[test]
    #[should_panic(expected = "viewport dimensions must be positive")]
    fn test_viewport_new_panics_on_zero() {
        let _ = Viewport::new(0, 280);
    }

    #[test]
    fn test_portrait_raster_in_preview() {
        let fit = Letterbox::fit(PlanSize::new(1000.0, 1500.0), Viewport::new(320, 280));
        assert!((fit.scale - 0.186_666).abs() < 1e-4);
        assert_eq!(fit.content_width, 187);
        assert_eq!(fit.content_height, 280);
        assert_eq!(fit.offset_x, 66);
        assert_eq!(fit.offset_y, 0);
    }

    #[test]
    fn test_us_letter_pdf_in_preview() {
        let fit = Letterbox::fit(PlanSize::new(612.0, 792.0), Viewport::new(320, 280));
        assert!((fit.scale - 0.353_5).abs() < 1e-3);
        assert_eq!(fit.content_width, 216);
        assert_eq!(fit.content_height, 280);
        assert_eq!(fit.offset_x, 52);
        assert_eq!(fit.offset_y, 0);
    }

    #[test]
    fn test_landscape_plan_letterboxes_vertically() {
        let fit = Letterbox::fit(PlanSize::new(2000.0, 500.0), Viewport::new(400, 400));
        assert_eq!(fit.content_width, 400);
        assert_eq!(fit.content_height, 100);
        assert_eq!(fit.offset_x, 0);
        assert_eq!(fit.offset_y, 150);
    }

    #[test]
    fn test_small_plan_is_upscaled_to_fit() {
        let fit = Letterbox::fit(PlanSize::new(10.0, 10.0), Viewport::new(100, 50));
        assert_eq!(fit.scale, 5.0);
        assert_eq!((fit.content_width, fit.content_height), (50, 50));
        assert_eq!((fit.offset_x, fit.offset_y), (25, 0));
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        let fit = Letterbox::fit(PlanSize::new(100_000.0, 1.0), Viewport::new(100, 100));
        assert_eq!(fit.content_width, 100);
        assert_eq!(fit.content_height, 1);
    }

    #[test]
    fn test_content_contains() {
        let fit = Letterbox::fit(PlanSize::new(1000.0, 1500.0), Viewport::new(320, 280));
        assert!(!fit.content_contains(PixelPos::new(10.0, 140.0)));
        assert!(fit.content_contains(PixelPos::new(160.0, 140.0)));
        assert!(!fit.content_contains(PixelPos::new(66.0 + 187.0, 140.0)));
    }

    proptest! {
        #[test]
        fn prop_contain_fit(
            iw in 1.0f64..20_000.0,
            ih in 1.0f64..20_000.0,
            w in 1u32..4_000,
            h in 1u32..4_000,
        ) {
            let fit = Letterbox::fit(PlanSize::new(iw, ih), Viewport::new(w, h));
            prop_assert!(fit.content_width <= w);
            prop_assert!(fit.content_height <= h);

            // Rounding to whole pixels perturbs each side by at most half a pixel
            let sw = fit.content_width as f64;
            let sh = fit.content_height as f64;
            let exact_w = iw * fit.scale;
            let exact_h = ih * fit.scale;
            prop_assert!((sw - exact_w).abs() <= 0.5 + 1e-9 || sw == 1.0);
            prop_assert!((sh - exact_h).abs() <= 0.5 + 1e-9 || sh == 1.0);
        }

        #[test]
        fn prop_centering(
            iw in 1.0f64..20_000.0,
            ih in 1.0f64..20_000.0,
            w in 1u32..4_000,
            h in 1u32..4_000,
        ) {
            let fit = Letterbox::fit(PlanSize::new(iw, ih), Viewport::new(w, h));
            prop_assert!(fit.offset_x + fit.content_width <= w);
            prop_assert!(fit.offset_y + fit.content_height <= h);
            prop_assert!(fit.offset_x == 0 || fit.offset_y == 0);
        }
    }
}
