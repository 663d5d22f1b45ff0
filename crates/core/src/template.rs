//! Layout templates: a form's column bands as fractions of the page width.

use crate::catalog::ItemCatalog;
use crate::error::GridError;
use crate::grid::{ColumnBand, LayoutGrid};
use crate::style::MarkStyle;
use serde::{Deserialize, Serialize};

/// A column band as fractions of the rendered page width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnFraction {
    pub start: f32,
    pub end: f32,
}

/// Calibration data for one form template.
///
/// Column bands scale with the rendered width; line pitch and header offset
/// are display pixels at that width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutTemplate {
    pub name: String,
    pub columns: Vec<ColumnFraction>,
    pub line_pitch: f32,
    pub header_offset: f32,
    /// Item labels per column, top to bottom.
    #[serde(default)]
    pub items: Vec<Vec<String>>,
    pub style: MarkStyle,
}

impl Default for LayoutTemplate {
    /// The church food order form the tool was first calibrated against.
    fn default() -> Self {
        let fractions = [
            (0.0, 0.19),  // canned meats
            (0.19, 0.335), // cake mixes, seasonings
            (0.335, 0.47), // sugars, flour
            (0.47, 0.63), // fresh fruits, meats
            (0.63, 1.0),  // personal products
        ];
        let items = vec![
            vec![
                "Fully cooked beef (can)",
                "Beef Stew",
                "Chili",
                "Pork and Beans",
                "Tuna",
                "Chick breast pcs",
            ],
            vec![
                "Cake mix, chocolate",
                "Cake mix, yellow",
                "Cinnamon",
                "Pepper, black",
                "Salt",
                "Vanilla extract",
            ],
        ];

        Self {
            name: "Food order form".to_string(),
            columns: fractions
                .iter()
                .map(|&(start, end)| ColumnFraction { start, end })
                .collect(),
            line_pitch: 22.0,
            header_offset: 95.0,
            items: items
                .into_iter()
                .map(|column| column.into_iter().map(String::from).collect())
                .collect(),
            style: MarkStyle::default(),
        }
    }
}

impl LayoutTemplate {
    /// Builds the grid for a page rendered `page_display_width` pixels wide.
    pub fn grid_for_width(&self, page_display_width: f32) -> Result<LayoutGrid, GridError> {
        if !(page_display_width.is_finite() && page_display_width > 0.0) {
            return Err(GridError::InvalidWidth(page_display_width));
        }
        let mut bands = Vec::with_capacity(self.columns.len());
        for (index, fraction) in self.columns.iter().enumerate() {
            for value in [fraction.start, fraction.end] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(GridError::FractionOutOfRange { index, value });
                }
            }
            bands.push(ColumnBand::new(
                fraction.start * page_display_width,
                fraction.end * page_display_width,
            ));
        }
        LayoutGrid::new(bands, self.line_pitch, self.header_offset)
    }

    pub fn catalog(&self) -> ItemCatalog {
        ItemCatalog::new(self.items.clone())
    }
}
