use crate::{page_ids, page_size};
use formmark_traits::{PageMetrics, RenderError, RenderingService};
use lopdf::Document;

/// A [`RenderingService`] that reports display metrics without rasterizing.
///
/// The first page is assumed to be shown at the requested width with its
/// aspect ratio preserved, which is how a fit-to-width viewer lays it out.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessRenderer;

impl RenderingService for HeadlessRenderer {
    fn render(&self, bytes: &[u8], display_width: f32) -> Result<PageMetrics, RenderError> {
        if !(display_width.is_finite() && display_width > 0.0) {
            return Err(RenderError::Document(format!(
                "display width must be positive, got {}",
                display_width
            )));
        }
        let doc = Document::load_mem(bytes).map_err(|e| RenderError::Document(e.to_string()))?;
        let pages = page_ids(&doc);
        let first = *pages.first().ok_or(RenderError::NoPages)?;
        let size = page_size(&doc, first).map_err(|e| RenderError::Document(e.to_string()))?;

        let metrics = PageMetrics::fit_width(pages.len(), size, display_width);
        log::info!(
            "Rendered {} page(s); first page {}x{} pt shown at {}x{:.1} px.",
            metrics.num_pages,
            size.width,
            size.height,
            metrics.page_display_width,
            metrics.page_display_height
        );
        Ok(metrics)
    }
}
