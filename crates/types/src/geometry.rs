use serde::{Deserialize, Serialize};

/// A point in either screen space (top-left origin) or document space
/// (bottom-left origin). The coordinate system is fixed by context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Height of a box of `width` with the same aspect ratio as `self`.
    pub fn height_at_width(&self, width: f32) -> f32 {
        if self.width <= 0.0 {
            return 0.0;
        }
        width * self.height / self.width
    }
}
