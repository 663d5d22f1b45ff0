//! RenderingService trait for the page viewer collaborator.
//!
//! A renderer displays the first page at a requested width and reports the
//! resulting display metrics once rendering has finished. The layout grid is
//! derived from these metrics, so it must never be computed before the
//! report arrives.

use formmark_types::Size;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Failed to render document: {0}")]
    Document(String),

    #[error("Document has no pages")]
    NoPages,
}

/// Display metrics reported when a document finishes rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub num_pages: usize,
    pub page_display_width: f32,
    pub page_display_height: f32,
}

impl PageMetrics {
    /// Metrics for a page of native `page_size` shown at `display_width`,
    /// keeping the page's aspect ratio.
    pub fn fit_width(num_pages: usize, page_size: Size, display_width: f32) -> Self {
        Self {
            num_pages,
            page_display_width: display_width,
            page_display_height: page_size.height_at_width(display_width),
        }
    }
}

pub trait RenderingService {
    fn render(&self, bytes: &[u8], display_width: f32) -> Result<PageMetrics, RenderError>;
}
