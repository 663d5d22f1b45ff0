pub mod authoring;
pub mod rendering;

pub use authoring::{
    AuthoringError, AuthoringService, DrawCommand, RecordedDocument, RecordingAuthoring,
    RectangleDraw, TextDraw,
};
pub use rendering::{PageMetrics, RenderError, RenderingService};
