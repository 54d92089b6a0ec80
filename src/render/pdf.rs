//! PDF page rasterization
//!
//! The renderer only needs the first page of a document: its size, to fit
//! it into the viewport, and then a bitmap of it at the fitted scale.
//! [`PageRasterizer`] is that seam; [`PdfiumRasterizer`] fills it with the
//! system pdfium library.

use image::RgbaImage;

use crate::domain::PlanSize;
use crate::error::BoxError;

/// What a PDF engine reports about a loaded document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfLayout {
    pub page_count: u16,
    /// Natural size of the first page in PDF points, if there is one
    pub first_page: Option<PlanSize>,
}

/// Capability to rasterize the first page of a PDF document
///
/// Implementations must be safe to call from several render tasks at once.
/// Each call loads the document exactly once.
pub trait PageRasterizer: Send + Sync {
    /// Page count and first page size
    fn layout(&self, pdf: &[u8]) -> Result<PdfLayout, BoxError>;

    /// Render the first page at the scale `scale_for` picks from the layout
    ///
    /// An error from `scale_for` stops the call before anything is
    /// rasterized and is returned as is.
    fn render_first_page(
        &self,
        pdf: &[u8],
        scale_for: &mut dyn FnMut(PdfLayout) -> Result<f64, BoxError>,
    ) -> Result<RgbaImage, BoxError>;
}

#[cfg(feature = "pdfium")]
pub use self::pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, PoisonError};

    use image::RgbaImage;
    use pdfium_render::prelude::*;

    use super::{PageRasterizer, PdfLayout};
    use crate::domain::PlanSize;
    use crate::error::BoxError;

    /// Rasterizer backed by a dynamically loaded pdfium library
    ///
    /// The library is bound on first use and kept for the life of the
    /// rasterizer. A failed bind is retried on the next call.
    #[derive(Debug, Default)]
    pub struct PdfiumRasterizer {
        library_dir: Option<PathBuf>,
        engine: Mutex<Option<Arc<Pdfium>>>,
    }

    impl PdfiumRasterizer {
        /// Use pdfium from `library_dir`, or the system search path when `None`
        pub fn new(library_dir: Option<PathBuf>) -> Self {
            Self {
                library_dir,
                engine: Mutex::new(None),
            }
        }

        fn engine(&self) -> Result<Arc<Pdfium>, PdfiumError> {
            let mut slot = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(pdfium) = slot.as_ref() {
                return Ok(Arc::clone(pdfium));
            }

            let bindings = match &self.library_dir {
                Some(dir) => {
                    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))?
                }
                None => Pdfium::bind_to_system_library()?,
            };
            log::debug!("Bound pdfium from {:?}", self.library_dir);

            let pdfium = Arc::new(Pdfium::new(bindings));
            *slot = Some(Arc::clone(&pdfium));
            Ok(pdfium)
        }
    }

    fn layout_of(document: &PdfDocument<'_>) -> Result<PdfLayout, PdfiumError> {
        let pages = document.pages();
        let page_count = pages.len();
        let first_page = if page_count == 0 {
            None
        } else {
            let page = pages.first()?;
            Some(PlanSize::new(
                page.width().value as f64,
                page.height().value as f64,
            ))
        };
        Ok(PdfLayout {
            page_count,
            first_page,
        })
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn layout(&self, pdf: &[u8]) -> Result<PdfLayout, BoxError> {
            let pdfium = self.engine()?;
            let document = pdfium.load_pdf_from_byte_slice(pdf, None)?;
            Ok(layout_of(&document)?)
        }

        fn render_first_page(
            &self,
            pdf: &[u8],
            scale_for: &mut dyn FnMut(PdfLayout) -> Result<f64, BoxError>,
        ) -> Result<RgbaImage, BoxError> {
            let pdfium = self.engine()?;
            let document = pdfium.load_pdf_from_byte_slice(pdf, None)?;
            let scale = scale_for(layout_of(&document)?)?;
            let page = document.pages().first()?;

            let config = PdfRenderConfig::new().scale_page_by_factor(scale as f32);
            let bitmap = page.render_with_config(&config)?;

            let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
            log::debug!("pdfium rendered page at {scale:.4}: {width}x{height} pixels");

            RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
                .ok_or_else(|| "pdfium bitmap size does not match its pixel data".into())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_missing_library_reported_on_use() {
            let dir = tempfile::tempdir().unwrap();
            let rasterizer = PdfiumRasterizer::new(Some(dir.path().to_path_buf()));
            assert!(rasterizer.layout(b"%PDF-1.7").is_err());
            // Still unbound, so a later call tries again
            assert!(rasterizer.engine.lock().unwrap().is_none());
        }
    }
}
