//! End-to-end: fetch a plan, render it into different viewports, place and
//! reproduce anchors.

use std::io::Cursor;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use plananchor::error::BoxError;
use plananchor::{
    Anchor, FsPlanStore, MarkerStyle, MemoryPlanStore, PageRasterizer, PdfLayout, PixelPos,
    PlanColor, PlanId, PlanKind, PlanRenderer, PlanSize, PlanStore, PlanView, Viewport,
    anchor_to_pixel,
};

const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, BLUE);
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .unwrap();
    out
}

fn red_marker() -> MarkerStyle {
    MarkerStyle {
        size: 12.0,
        shadow: false,
        color: PlanColor {
            r: 1.0,
            g: 0.0,
            b: 0.0,
        },
    }
}

struct LetterPages;

impl PageRasterizer for LetterPages {
    fn layout(&self, _pdf: &[u8]) -> Result<PdfLayout, BoxError> {
        Ok(PdfLayout {
            page_count: 1,
            first_page: Some(PlanSize::new(612.0, 792.0)),
        })
    }

    fn render_first_page(
        &self,
        pdf: &[u8],
        scale_for: &mut dyn FnMut(PdfLayout) -> Result<f64, BoxError>,
    ) -> Result<RgbaImage, BoxError> {
        let scale = scale_for(self.layout(pdf)?)?;
        let w = (612.0 * scale).round() as u32;
        let h = (792.0 * scale).round() as u32;
        Ok(RgbaImage::from_pixel(w, h, BLUE))
    }
}

struct BrokenPages;

impl PageRasterizer for BrokenPages {
    fn layout(&self, _pdf: &[u8]) -> Result<PdfLayout, BoxError> {
        Err("trailer not found".into())
    }

    fn render_first_page(
        &self,
        _pdf: &[u8],
        _scale_for: &mut dyn FnMut(PdfLayout) -> Result<f64, BoxError>,
    ) -> Result<RgbaImage, BoxError> {
        Err("trailer not found".into())
    }
}

#[tokio::test]
async fn placed_anchor_reappears_at_same_relative_spot() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ground.png"), png(1000, 1500)).unwrap();

    let store = FsPlanStore::new(dir.path());
    let source = store.fetch(&PlanId::new("ground.png")).await.unwrap();
    assert_eq!(source.kind, PlanKind::Raster);

    let renderer = PlanRenderer::default();

    // Place in the inline preview
    let mut view = PlanView::new(source, Viewport::new(320, 280));
    assert!(view.refresh(&renderer).await.unwrap());
    view.set_editing(true);
    let anchor = view.click(PixelPos::new(160.0, 140.0)).unwrap();
    assert_eq!(anchor, Anchor::new(0.5, 0.5));

    let preview = view.compose(&[Some(anchor)], &red_marker()).unwrap();
    assert_eq!(preview.dimensions(), (320, 280));
    assert_eq!(preview.get_pixel(160, 140), &RED);
    assert_eq!(preview.get_pixel(10, 140), &WHITE);

    // Reproduce in a print-sized viewport with the same aspect ratio
    view.set_viewport(Viewport::new(640, 560));
    assert!(view.bitmap().is_none());
    assert!(view.refresh(&renderer).await.unwrap());
    let print = view.compose(&[Some(anchor)], &red_marker()).unwrap();
    assert_eq!(print.dimensions(), (640, 560));
    assert_eq!(
        anchor_to_pixel(anchor, view.viewport()),
        PixelPos::new(320.0, 280.0)
    );
    assert_eq!(print.get_pixel(320, 280), &RED);
    // Letterbox doubled along with the viewport
    let fit = view.letterbox(PlanSize::new(1000.0, 1500.0));
    assert_eq!(fit.offset_x, 133);
    assert_eq!(print.get_pixel(132, 280), &WHITE);
    assert_eq!(print.get_pixel(134, 10), &BLUE);
}

#[tokio::test]
async fn legacy_zero_anchor_draws_nothing() {
    let store = MemoryPlanStore::new();
    let id = PlanId::new("plan-7");
    store.insert(id.clone(), "level.png", png(200, 100)).await;
    let source = store.fetch(&id).await.unwrap();

    let mut view = PlanView::new(source, Viewport::new(100, 100));
    view.refresh(&PlanRenderer::default()).await.unwrap();

    let stored = serde_json::json!({ "x": 0, "y": 0 });
    let anchor = Anchor::from_value(&stored);
    assert_eq!(anchor, Some(Anchor::UNSET));

    let plain = view.bitmap().unwrap().clone();
    let composed = view.compose(&[anchor], &red_marker()).unwrap();
    assert_eq!(composed, plain);
}

#[tokio::test]
async fn pdf_plan_uses_first_page_letterbox() {
    let store = MemoryPlanStore::new();
    let id = PlanId::new("site.pdf");
    store.insert(id.clone(), "site.pdf", b"%PDF-1.7".to_vec()).await;
    let source = store.fetch(&id).await.unwrap();
    assert_eq!(source.kind, PlanKind::Pdf);

    let renderer = PlanRenderer::default().with_rasterizer(Arc::new(LetterPages));
    let bitmap = renderer
        .render_plan(&source, Viewport::new(320, 280))
        .await
        .unwrap();
    assert_eq!(bitmap.dimensions(), (320, 280));
    assert_eq!(bitmap.get_pixel(51, 0), &WHITE);
    assert_eq!(bitmap.get_pixel(52, 0), &BLUE);
    assert_eq!(bitmap.get_pixel(267, 279), &BLUE);
    assert_eq!(bitmap.get_pixel(268, 279), &WHITE);
}

#[tokio::test]
async fn broken_pdf_fails_without_bitmap() {
    let store = MemoryPlanStore::new();
    let id = PlanId::new("broken.pdf");
    store.insert(id.clone(), "broken.pdf", b"%PDF-".to_vec()).await;
    let source = store.fetch(&id).await.unwrap();

    let renderer = PlanRenderer::default().with_rasterizer(Arc::new(BrokenPages));
    let mut view = PlanView::new(source, Viewport::new(320, 280));
    let err = view.refresh(&renderer).await.unwrap_err();
    assert!(err.is_decode());
    assert!(err.to_string().contains("trailer not found"));
    assert!(view.bitmap().is_none());
    assert!(view.compose(&[], &red_marker()).is_none());
}

#[tokio::test]
async fn missing_plan_is_fetch_error() {
    let store = MemoryPlanStore::new();
    let err = store.fetch(&PlanId::new("nope")).await.unwrap_err();
    assert!(err.is_fetch());
}
