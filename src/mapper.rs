//! Conversions between normalized anchors and viewport pixels
//!
//! Every function here must be called with the same viewport that was used
//! to render the plan in that pass. Mixing sizes between render and mapping
//! places markers in the wrong spot.

use crate::domain::{Anchor, PixelPos, Viewport};

/// Map a stored anchor to a pixel position in `viewport`
///
/// The result is not clamped. Marker offsets such as centering a dot on the
/// point are applied by the caller.
#[inline]
pub fn anchor_to_pixel(anchor: Anchor, viewport: Viewport) -> PixelPos {
    PixelPos {
        px: anchor.x * viewport.width() as f64,
        py: anchor.y * viewport.height() as f64,
    }
}

/// Map a pixel position in `viewport` to a normalized anchor
///
/// Positions outside the viewport are clamped onto its edge so stored values
/// stay in `[0, 1]`.
#[inline]
pub fn pixel_to_anchor(pos: PixelPos, viewport: Viewport) -> Anchor {
    Anchor {
        x: normalize_axis(pos.px, viewport.width()),
        y: normalize_axis(pos.py, viewport.height()),
    }
}

/// Check whether an anchor should be treated as present
///
/// Absent anchors and the legacy `{0, 0}` placeholder are both unset. Use
/// this instead of an `Option` check before drawing a marker.
#[inline]
pub fn is_anchor_set(anchor: Option<&Anchor>) -> bool {
    anchor.is_some_and(|a| !a.is_sentinel())
}

fn normalize_axis(value: f64, extent: u32) -> f64 {
    let normalized = value / extent as f64;
    // NaN input would otherwise survive clamp and be persisted
    if normalized.is_nan() {
        return 0.0;
    }
    normalized.clamp(0.0, 1.0)
}
