use formmark_types::Color;
use serde::{Deserialize, Serialize};

/// Appearance of emitted marks.
///
/// Lengths are in display pixels and pass through the same scale factor as
/// the column bands; `text_size` is already in document points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkStyle {
    pub highlight: Color,
    pub text_color: Color,
    pub text_size: f32,
    /// Distance from the column's right edge to the start of the quantity text.
    pub text_inset: f32,
    /// Distance of the quantity baseline below the highlight's vertical center.
    /// The text sits slightly low in the band, where the paper form's
    /// quantity boxes print it.
    pub text_baseline_drop: f32,
    pub guide_color: Color,
}

impl Default for MarkStyle {
    fn default() -> Self {
        Self {
            highlight: Color::rgb(255, 237, 92).with_alpha(0.3),
            text_color: Color::BLACK,
            text_size: 12.0,
            text_inset: 30.0,
            text_baseline_drop: 5.0,
            guide_color: Color::RED,
        }
    }
}

/// Per-emission switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmitOptions {
    /// Page that receives the marks. Selections only ever target one page.
    pub page_index: usize,
    /// Also outline every column band, for checking a template against a form.
    pub calibration_guides: bool,
}
