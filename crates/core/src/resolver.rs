//! Maps a click in screen space to the cell under it.

use crate::error::Unresolved;
use crate::grid::LayoutGrid;
use formmark_types::{LogicalAddress, Point};

/// Resolves `point` to a cell address, or `None` when it is outside every
/// column band or above the first line. A click below the last printed item
/// still yields an address, as long as its line index fits in a `usize`.
pub fn resolve(point: Point, grid: &LayoutGrid) -> Option<LogicalAddress> {
    classify(point, grid).ok()
}

/// Like [`resolve`], but reports why a click missed.
pub fn classify(point: Point, grid: &LayoutGrid) -> Result<LogicalAddress, Unresolved> {
    if !(point.x.is_finite() && point.y.is_finite()) {
        return Err(Unresolved::NonFinite);
    }

    let column = grid
        .columns()
        .iter()
        .position(|band| band.contains(point.x))
        .ok_or(Unresolved::OutsideColumns)?;

    let line = ((point.y - grid.header_offset()) / grid.line_pitch()).floor();
    if line < 0.0 {
        return Err(Unresolved::AboveFirstLine);
    }
    // `as` saturates; anything at or past the cast limit is not a real line.
    if line >= usize::MAX as f32 {
        return Err(Unresolved::LineOutOfRange);
    }

    Ok(LogicalAddress::new(column, line as usize))
}
