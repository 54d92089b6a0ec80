//! Site-plan rendering and viewport-independent anchor points
//!
//! Plans (raster images or the first page of a PDF) are rendered into a
//! viewport of any size with contain-fit letterboxing. Anchors placed on a
//! rendered plan are stored as fractions of the viewport, so they land on
//! the same spot in the editor, a preview, or a printed report.

pub mod config;
pub mod domain;
pub mod error;
pub mod mapper;
pub mod overlay;
pub mod render;
pub mod storage;

pub use config::{MarkerStyle, PlanColor, PlanConfig, ResampleFilter};
pub use domain::{Anchor, Letterbox, PixelPos, PlanId, PlanKind, PlanSize, PlanSource, Viewport};
pub use error::PlanError;
pub use mapper::{anchor_to_pixel, is_anchor_set, pixel_to_anchor};
pub use overlay::{PlanView, RenderTicket};
pub use render::{PageRasterizer, PdfLayout, PlanRenderer, draw_markers};
pub use storage::{FsPlanStore, MemoryPlanStore, PlanStore};
