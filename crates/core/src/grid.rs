//! The layout grid: column bands and a uniform line pitch in display pixels.

use crate::error::GridError;
use formmark_types::Rect;
use serde::{Deserialize, Serialize};

/// A horizontal band `[start, end]` in display pixels. Both edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBand {
    pub start: f32,
    pub end: f32,
}

impl ColumnBand {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.start && x <= self.end
    }

    pub fn width(&self) -> f32 {
        self.end - self.start
    }
}

/// Column bands plus row geometry for one rendered page.
///
/// Bands are ordered left to right and never overlap, except that one band
/// may end exactly where the next starts. Gaps between bands are allowed.
/// A grid is only built through [`LayoutGrid::new`], so these invariants
/// always hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutGrid {
    columns: Vec<ColumnBand>,
    line_pitch: f32,
    header_offset: f32,
}

impl LayoutGrid {
    pub fn new(
        columns: Vec<ColumnBand>,
        line_pitch: f32,
        header_offset: f32,
    ) -> Result<Self, GridError> {
        if columns.is_empty() {
            return Err(GridError::NoColumns);
        }
        for (index, band) in columns.iter().enumerate() {
            if !(band.start.is_finite() && band.end.is_finite() && band.start < band.end) {
                return Err(GridError::InvalidBand {
                    index,
                    start: band.start,
                    end: band.end,
                });
            }
        }
        for (index, pair) in columns.windows(2).enumerate() {
            if pair[1].start < pair[0].end {
                return Err(GridError::Overlap {
                    index: index + 1,
                    previous: index,
                });
            }
        }
        if !(line_pitch.is_finite() && line_pitch > 0.0) {
            return Err(GridError::InvalidPitch(line_pitch));
        }
        if !(header_offset.is_finite() && header_offset >= 0.0) {
            return Err(GridError::InvalidHeaderOffset(header_offset));
        }
        Ok(Self {
            columns,
            line_pitch,
            header_offset,
        })
    }

    pub fn columns(&self) -> &[ColumnBand] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnBand> {
        self.columns.get(index)
    }

    pub fn line_pitch(&self) -> f32 {
        self.line_pitch
    }

    pub fn header_offset(&self) -> f32 {
        self.header_offset
    }

    /// One full-height rectangle per column band, for calibration guides.
    pub fn calibration_overlay(&self, display_height: f32) -> Vec<Rect> {
        self.columns
            .iter()
            .map(|band| Rect::new(band.start, 0.0, band.width(), display_height))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands(pairs: &[(f32, f32)]) -> Vec<ColumnBand> {
        pairs.iter().map(|&(s, e)| ColumnBand::new(s, e)).collect()
    }

    #[test]
    fn accepts_contiguous_and_gapped_bands() {
        assert!(LayoutGrid::new(bands(&[(0.0, 100.0), (100.0, 200.0)]), 22.0, 95.0).is_ok());
        assert!(LayoutGrid::new(bands(&[(0.0, 90.0), (110.0, 200.0)]), 22.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_invalid_grids() {
        assert_eq!(LayoutGrid::new(vec![], 22.0, 95.0), Err(GridError::NoColumns));
        assert!(matches!(
            LayoutGrid::new(bands(&[(50.0, 50.0)]), 22.0, 95.0),
            Err(GridError::InvalidBand { index: 0, .. })
        ));
        assert!(matches!(
            LayoutGrid::new(bands(&[(0.0, f32::NAN)]), 22.0, 95.0),
            Err(GridError::InvalidBand { .. })
        ));
        assert_eq!(
            LayoutGrid::new(bands(&[(0.0, 120.0), (100.0, 200.0)]), 22.0, 95.0),
            Err(GridError::Overlap { index: 1, previous: 0 })
        );
        assert_eq!(
            LayoutGrid::new(bands(&[(0.0, 100.0)]), 0.0, 95.0),
            Err(GridError::InvalidPitch(0.0))
        );
        assert_eq!(
            LayoutGrid::new(bands(&[(0.0, 100.0)]), 22.0, -1.0),
            Err(GridError::InvalidHeaderOffset(-1.0))
        );
    }

    #[test]
    fn band_edges_are_inclusive() {
        let band = ColumnBand::new(100.0, 200.0);
        assert!(band.contains(100.0));
        assert!(band.contains(200.0));
        assert!(!band.contains(99.9));
        assert!(!band.contains(200.1));
    }

    #[test]
    fn calibration_overlay_spans_page_height() {
        let grid = LayoutGrid::new(bands(&[(0.0, 100.0), (120.0, 300.0)]), 22.0, 95.0).unwrap();
        let overlay = grid.calibration_overlay(1000.0);
        assert_eq!(
            overlay,
            vec![
                Rect::new(0.0, 0.0, 100.0, 1000.0),
                Rect::new(120.0, 0.0, 180.0, 1000.0)
            ]
        );
    }
}
