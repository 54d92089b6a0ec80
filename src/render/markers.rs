//! Anchor marker compositing using tiny-skia
//!
//! Markers are drawn directly onto the rendered plan bitmap. The bitmap's own
//! size is the viewport, so markers always use the same dimensions the plan
//! was rendered at.

use image::RgbaImage;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use super::geometry::{self, marker};
use crate::config::MarkerStyle;
use crate::domain::{Anchor, Viewport};
use crate::mapper::{anchor_to_pixel, is_anchor_set};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
///
/// Expects an opaque image, which every rendered plan is.
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

/// Build an ellipse path using cubic bezier curves
fn build_ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Option<tiny_skia::Path> {
    let kx = rx * marker::BEZIER_K;
    let ky = ry * marker::BEZIER_K;

    let mut pb = PathBuilder::new();

    pb.move_to(cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);

    pb.close();
    pb.finish()
}

/// Draw one dot per set anchor onto a rendered plan
///
/// Unset anchors, including the legacy `{0, 0}` value, are skipped, as are
/// markers that would land entirely off the bitmap. Returns how many markers
/// were drawn.
pub fn draw_markers(img: &mut RgbaImage, anchors: &[Anchor], style: &MarkerStyle) -> usize {
    let Some(viewport) = Viewport::try_new(img.width(), img.height()) else {
        return 0;
    };

    let visible: Vec<&Anchor> = anchors.iter().filter(|a| is_anchor_set(Some(*a))).collect();
    if visible.is_empty() {
        return 0;
    }

    let [r, g, b, a] = style.color.to_rgba_u8();
    let mut drawn = 0;

    with_pixmap(img, |pixmap| {
        for anchor in visible {
            let pos = anchor_to_pixel(*anchor, viewport);
            let (min_x, min_y, max_x, max_y) =
                geometry::marker_bounds(pos.px as f32, pos.py as f32, style.size);
            let ring = if style.shadow { marker::OUTLINE } else { 0.0 };
            let painted = (min_x - ring, min_y - ring, max_x + ring, max_y + ring);
            if !geometry::bounds_overlap_canvas(painted, viewport.width(), viewport.height()) {
                log::debug!(
                    "Marker for anchor ({}, {}) falls outside the plan, skipping",
                    anchor.x,
                    anchor.y
                );
                continue;
            }
            let (cx, cy, rx, ry) = geometry::ellipse_from_bounds(min_x, min_y, max_x, max_y);

            // Draw the ring first so the dot sits on top of it
            if style.shadow
                && let Some(path) =
                    build_ellipse_path(cx, cy, rx + marker::OUTLINE, ry + marker::OUTLINE)
            {
                let mut paint = Paint::default();
                paint.set_color_rgba8(0, 0, 0, marker::OUTLINE_ALPHA);
                paint.anti_alias = true;
                pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            }

            let Some(path) = build_ellipse_path(cx, cy, rx, ry) else {
                continue;
            };
            let mut paint = Paint::default();
            paint.set_color_rgba8(r, g, b, a);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
            drawn += 1;
        }
    });

    drawn
}
