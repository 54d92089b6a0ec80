//! Letterboxed plan rendering
//!
//! Turns a raster image or the first page of a PDF into a bitmap of exactly
//! the requested viewport size. The plan is scaled to fit without cropping
//! or distortion, centered, and the margin is filled with the background.

use std::sync::Arc;

use futures::future::join_all;
use image::{Rgba, RgbaImage, imageops};

use super::pdf::{PageRasterizer, PdfLayout};
use crate::config::{PlanColor, PlanConfig, ResampleFilter};
use crate::domain::{Letterbox, PlanKind, PlanSize, PlanSource, Viewport};
use crate::error::{BoxError, PlanError};

/// Stateless plan renderer
///
/// Cloning is cheap. Each call decodes on the blocking pool and owns its
/// own surfaces, so several renders may run at once.
#[derive(Clone)]
pub struct PlanRenderer {
    background: PlanColor,
    resample: ResampleFilter,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl std::fmt::Debug for PlanRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanRenderer")
            .field("background", &self.background)
            .field("resample", &self.resample)
            .field("pdf", &self.rasterizer.is_some())
            .finish()
    }
}

impl Default for PlanRenderer {
    fn default() -> Self {
        Self::new(PlanColor::WHITE, ResampleFilter::default())
    }
}

impl PlanRenderer {
    /// Create a renderer without PDF support
    pub fn new(background: PlanColor, resample: ResampleFilter) -> Self {
        Self {
            background,
            resample,
            rasterizer: None,
        }
    }

    /// Create a renderer from config, with pdfium when it is compiled in
    pub fn from_config(config: &PlanConfig) -> Self {
        let renderer = Self::new(config.background, config.resample);
        #[cfg(feature = "pdfium")]
        let renderer = renderer.with_rasterizer(Arc::new(super::pdf::PdfiumRasterizer::new(
            config.pdfium_library_dir.clone(),
        )));
        renderer
    }

    /// Use `rasterizer` for PDF plans
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    /// Render a plan into a bitmap of exactly `viewport` size
    ///
    /// Either the full bitmap is produced or an error is returned.
    pub async fn render_plan(
        &self,
        plan: &PlanSource,
        viewport: Viewport,
    ) -> Result<RgbaImage, PlanError> {
        let renderer = self.clone();
        let plan = plan.clone();
        tokio::task::spawn_blocking(move || renderer.render_blocking(&plan, viewport)).await?
    }

    /// Render several plans into same-sized viewports concurrently
    ///
    /// Results come back in input order; one failure does not affect the rest.
    pub async fn render_gallery(
        &self,
        plans: &[PlanSource],
        viewport: Viewport,
    ) -> Vec<Result<RgbaImage, PlanError>> {
        join_all(plans.iter().map(|plan| self.render_plan(plan, viewport))).await
    }

    /// Natural size of a plan at scale 1
    pub async fn measure(&self, plan: &PlanSource) -> Result<PlanSize, PlanError> {
        let renderer = self.clone();
        let plan = plan.clone();
        tokio::task::spawn_blocking(move || renderer.measure_blocking(&plan)).await?
    }

    /// Synchronous body of [`render_plan`](Self::render_plan)
    pub fn render_blocking(
        &self,
        plan: &PlanSource,
        viewport: Viewport,
    ) -> Result<RgbaImage, PlanError> {
        warn_on_kind_mismatch(plan);

        let (fit, content) = match plan.kind {
            PlanKind::Raster => self.render_raster(plan, viewport)?,
            PlanKind::Pdf => self.render_pdf(plan, viewport)?,
        };

        log::debug!(
            "Plan {} ({}) fit into {}x{}: scale {:.4}, content {}x{}, offset ({}, {})",
            plan.id,
            plan.kind,
            viewport.width(),
            viewport.height(),
            fit.scale,
            fit.content_width,
            fit.content_height,
            fit.offset_x,
            fit.offset_y
        );

        let mut bitmap = RgbaImage::from_pixel(
            viewport.width(),
            viewport.height(),
            Rgba(self.background.to_rgba_u8()),
        );
        imageops::overlay(&mut bitmap, &content, fit.offset_x as i64, fit.offset_y as i64);
        Ok(bitmap)
    }

    fn measure_blocking(&self, plan: &PlanSource) -> Result<PlanSize, PlanError> {
        match plan.kind {
            PlanKind::Raster => {
                let decoded = image::load_from_memory(&plan.bytes)
                    .map_err(|err| PlanError::decode(PlanKind::Raster, err))?;
                checked_size(
                    PlanKind::Raster,
                    PlanSize::new(decoded.width() as f64, decoded.height() as f64),
                )
            }
            PlanKind::Pdf => self
                .pdf_rasterizer()?
                .layout(&plan.bytes)
                .and_then(first_page_size)
                .map_err(|err| PlanError::decode(PlanKind::Pdf, err)),
        }
    }

    fn render_raster(
        &self,
        plan: &PlanSource,
        viewport: Viewport,
    ) -> Result<(Letterbox, RgbaImage), PlanError> {
        let decoded = image::load_from_memory(&plan.bytes)
            .map_err(|err| PlanError::decode(PlanKind::Raster, err))?;
        let size = checked_size(
            PlanKind::Raster,
            PlanSize::new(decoded.width() as f64, decoded.height() as f64),
        )?;

        let fit = Letterbox::fit(size, viewport);
        let scaled = imageops::resize(
            &decoded,
            fit.content_width,
            fit.content_height,
            self.resample.into(),
        );
        Ok((fit, scaled))
    }

    fn render_pdf(
        &self,
        plan: &PlanSource,
        viewport: Viewport,
    ) -> Result<(Letterbox, RgbaImage), PlanError> {
        let rasterizer = self.pdf_rasterizer()?;
        let mut fitted = None;
        let mut scale_for = |layout: PdfLayout| -> Result<f64, BoxError> {
            let fit = Letterbox::fit(first_page_size(layout)?, viewport);
            fitted = Some(fit);
            Ok(fit.scale)
        };
        let page = rasterizer
            .render_first_page(&plan.bytes, &mut scale_for)
            .map_err(|err| PlanError::decode(PlanKind::Pdf, err))?;
        let Some(fit) = fitted else {
            return Err(PlanError::decode(
                PlanKind::Pdf,
                "rasterizer rendered without reporting the page layout",
            ));
        };

        // Engines round page pixels their own way; pin the surface to the fitted size
        let mut surface = RgbaImage::from_pixel(
            fit.content_width,
            fit.content_height,
            Rgba(self.background.to_rgba_u8()),
        );
        imageops::overlay(&mut surface, &page, 0, 0);
        Ok((fit, surface))
    }

    fn pdf_rasterizer(&self) -> Result<&dyn PageRasterizer, PlanError> {
        self.rasterizer
            .as_deref()
            .ok_or_else(|| PlanError::decode(PlanKind::Pdf, "no PDF rasterizer is available"))
    }
}

/// First page size of a PDF, if it can be fitted
fn first_page_size(layout: PdfLayout) -> Result<PlanSize, BoxError> {
    let size = layout.first_page.ok_or("document has no pages")?;
    usable_size(size)
}

fn usable_size(size: PlanSize) -> Result<PlanSize, BoxError> {
    if size.is_valid() {
        Ok(size)
    } else {
        Err(format!("plan has unusable size {}x{}", size.width, size.height).into())
    }
}

fn checked_size(kind: PlanKind, size: PlanSize) -> Result<PlanSize, PlanError> {
    usable_size(size).map_err(|err| PlanError::decode(kind, err))
}

fn warn_on_kind_mismatch(plan: &PlanSource) {
    if let Some(sniffed) = PlanKind::sniff(&plan.bytes)
        && sniffed != plan.kind
    {
        log::warn!(
            "Plan {} is declared {} but its content looks like {}; decoding as {}",
            plan.id,
            plan.kind,
            sniffed,
            plan.kind
        );
    }
}
