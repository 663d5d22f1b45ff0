//! Screen-space to document-space geometry.
//!
//! Screen space is display pixels with the origin at the top-left of the
//! rendered page. Document space is the page's native units (points) with
//! the origin at the bottom-left.
//!
//! Horizontal lengths scale by `page.width / display.width`. Vertical
//! positions map through `page.height / display.height`, and vertical
//! lengths (the highlight height, the text baseline drop) use the
//! horizontal scale factor.

use crate::error::EmissionFailure;
use crate::grid::LayoutGrid;
use crate::store::Selection;
use crate::style::MarkStyle;
use formmark_types::{Point, Rect, Size};

/// The rendered page and the document page it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    display: Size,
    page: Size,
}

impl Viewport {
    pub fn new(display: Size, page: Size) -> Result<Self, EmissionFailure> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !(positive(display.width) && positive(display.height)) {
            return Err(EmissionFailure::InvalidViewport(format!(
                "display size {}x{} must be positive",
                display.width, display.height
            )));
        }
        if !(positive(page.width) && positive(page.height)) {
            return Err(EmissionFailure::InvalidViewport(format!(
                "page size {}x{} must be positive",
                page.width, page.height
            )));
        }
        Ok(Self { display, page })
    }

    pub fn display(&self) -> Size {
        self.display
    }

    pub fn page(&self) -> Size {
        self.page
    }

    /// Document units per display pixel, horizontally.
    pub fn scale_factor(&self) -> f32 {
        self.page.width / self.display.width
    }

    /// Flips a screen `y` into document space.
    pub fn to_document_y(&self, screen_y: f32) -> f32 {
        self.page.height - (screen_y * self.page.height / self.display.height)
    }
}

/// Where one selection's marks go on the document page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkGeometry {
    pub highlight: Rect,
    /// Baseline origin for the quantity text.
    pub text_anchor: Point,
}

/// Computes the document-space highlight and text anchor for `selection`.
///
/// Fails only when the selection's column is not part of `grid`.
pub fn to_document_space(
    selection: &Selection,
    grid: &LayoutGrid,
    viewport: &Viewport,
    style: &MarkStyle,
) -> Result<MarkGeometry, EmissionFailure> {
    let address = selection.address();
    let band = grid
        .column(address.column)
        .ok_or_else(|| EmissionFailure::UnknownColumn {
            key: selection.key().clone(),
            column: address.column,
            columns: grid.columns().len(),
        })?;

    let scale = viewport.scale_factor();
    let column_start = band.start * scale;
    let column_end = band.end * scale;
    let doc_y = viewport.to_document_y(selection.screen_point().y);
    let line_height = grid.line_pitch() * scale;

    let highlight = Rect::new(
        column_start,
        doc_y - line_height / 2.0,
        column_end - column_start,
        line_height,
    );
    let text_anchor = Point::new(
        column_end - style.text_inset * scale,
        doc_y - style.text_baseline_drop * scale,
    );

    Ok(MarkGeometry {
        highlight,
        text_anchor,
    })
}

/// Calibration guides in document space: one full-height outline per band.
pub fn guides_to_document_space(grid: &LayoutGrid, viewport: &Viewport) -> Vec<Rect> {
    let scale = viewport.scale_factor();
    let page = viewport.page();
    grid.columns()
        .iter()
        .map(|band| Rect::new(band.start * scale, 0.0, band.width() * scale, page.height))
        .collect()
}
