//! Viewport overlay state for one plan widget
//!
//! A [`PlanView`] pairs a plan with the viewport it is shown in. Rendering,
//! marker placement and click mapping all go through the view, so they can
//! never disagree about the viewport size. Each view owns its state; several
//! views can coexist without sharing anything.

use image::RgbaImage;

use crate::config::MarkerStyle;
use crate::domain::{Anchor, Letterbox, PixelPos, PlanSize, PlanSource, Viewport};
use crate::error::PlanError;
use crate::mapper::{anchor_to_pixel, is_anchor_set, pixel_to_anchor};
use crate::render::{PlanRenderer, draw_markers};

/// Proof that a render was started for a particular view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket {
    generation: u64,
    viewport: Viewport,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// A plan shown in a viewport, optionally accepting anchor clicks
#[derive(Clone)]
pub struct PlanView {
    plan: PlanSource,
    viewport: Viewport,
    editing: bool,
    generation: u64,
    current: Option<RgbaImage>,
}

impl std::fmt::Debug for PlanView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanView")
            .field("plan", &self.plan)
            .field("viewport", &self.viewport)
            .field("editing", &self.editing)
            .field("generation", &self.generation)
            .field("rendered", &self.current.is_some())
            .finish()
    }
}

impl PlanView {
    pub fn new(plan: PlanSource, viewport: Viewport) -> Self {
        Self {
            plan,
            viewport,
            editing: false,
            generation: 0,
            current: None,
        }
    }

    pub fn plan(&self) -> &PlanSource {
        &self.plan
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current render generation; bumps whenever plan or viewport change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last accepted bitmap, if it still matches the view
    pub fn bitmap(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Enable or disable anchor placement by click
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// Show a different plan; any in-flight render becomes stale
    pub fn set_plan(&mut self, plan: PlanSource) {
        if plan != self.plan {
            self.plan = plan;
            self.invalidate();
        }
    }

    /// Resize the view; any in-flight render becomes stale
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.invalidate();
        }
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    /// Start a render of the current plan and viewport
    pub fn begin_render(&self) -> RenderTicket {
        RenderTicket {
            generation: self.generation,
            viewport: self.viewport,
        }
    }

    /// Accept a finished render if it is still current
    ///
    /// Returns `Ok(false)` and drops the bitmap when the view changed after
    /// the ticket was issued. Errors from current renders are passed on and
    /// clear the shown bitmap; stale errors are dropped.
    pub fn accept(
        &mut self,
        ticket: RenderTicket,
        result: Result<RgbaImage, PlanError>,
    ) -> Result<bool, PlanError> {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding stale render of plan {} (generation {} < {})",
                self.plan.id,
                ticket.generation,
                self.generation
            );
            return Ok(false);
        }

        match result {
            Ok(bitmap) => {
                debug_assert_eq!(
                    bitmap.dimensions(),
                    (self.viewport.width(), self.viewport.height())
                );
                self.current = Some(bitmap);
                Ok(true)
            }
            Err(err) => {
                self.current = None;
                Err(err)
            }
        }
    }

    /// Render the current state and accept the result
    pub async fn refresh(&mut self, renderer: &PlanRenderer) -> Result<bool, PlanError> {
        let ticket = self.begin_render();
        let result = renderer.render_plan(&self.plan, ticket.viewport).await;
        self.accept(ticket, result)
    }

    /// Draw markers for every set anchor over the accepted bitmap
    ///
    /// Returns `None` when there is no current bitmap to draw on.
    pub fn compose(&self, anchors: &[Option<Anchor>], style: &MarkerStyle) -> Option<RgbaImage> {
        let mut bitmap = self.current.clone()?;
        let set: Vec<Anchor> = anchors
            .iter()
            .filter(|a| is_anchor_set(a.as_ref()))
            .flatten()
            .copied()
            .collect();
        draw_markers(&mut bitmap, &set, style);
        Some(bitmap)
    }

    /// Pixel position of an anchor's marker in this view
    pub fn marker_position(&self, anchor: Option<&Anchor>) -> Option<PixelPos> {
        let anchor = anchor.filter(|a| is_anchor_set(Some(*a)))?;
        Some(anchor_to_pixel(*anchor, self.viewport))
    }

    /// Translate a pointer click into an anchor while editing
    pub fn click(&self, pos: PixelPos) -> Option<Anchor> {
        if !self.editing {
            return None;
        }
        let anchor = pixel_to_anchor(pos, self.viewport);
        log::debug!(
            "Click at ({:.1}, {:.1}) on plan {} -> anchor ({:.4}, {:.4})",
            pos.px,
            pos.py,
            self.plan.id,
            anchor.x,
            anchor.y
        );
        Some(anchor)
    }

    /// Letterbox of a plan with the given natural size in this view
    pub fn letterbox(&self, size: PlanSize) -> Letterbox {
        Letterbox::fit(size, self.viewport)
    }
}
