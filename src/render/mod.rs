//! Plan rendering module
//!
//! This module contains:
//! - Letterboxed rendering of raster and PDF plans (image)
//! - The PDF first-page rasterizer seam and its pdfium backend
//! - Anchor marker compositing using tiny-skia

pub mod geometry;
pub mod markers;
pub mod pdf;
pub mod plan;

pub use markers::draw_markers;
pub use pdf::{PageRasterizer, PdfLayout};
#[cfg(feature = "pdfium")]
pub use pdf::PdfiumRasterizer;
pub use plan::PlanRenderer;
