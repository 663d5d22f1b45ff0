//! AuthoringService trait for abstracting PDF mutation.
//!
//! The annotation core never touches PDF objects directly. It loads a
//! document into a backend-specific handle, asks for the page size, issues
//! rectangle and text draws in document space, and finally saves the handle
//! back to bytes. All work on a handle stays in memory until `save`.

use formmark_types::{Color, Point, Rect, Size};
use thiserror::Error;

/// Error type for authoring operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthoringError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Page {0} does not exist in the document")]
    PageNotFound(usize),

    #[error("Failed to draw on page {page}: {message}")]
    Draw { page: usize, message: String },

    #[error("Failed to save document: {0}")]
    Save(String),
}

/// A filled rectangle in document space (bottom-left origin, points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleDraw {
    pub rect: Rect,
    pub color: Color,
}

/// A single text run whose baseline starts at `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub text: String,
    pub origin: Point,
    pub size: f32,
    pub color: Color,
}

/// A PDF-authoring backend.
///
/// # Implementations
///
/// - `LopdfAuthoring` (formmark-pdf-composer): mutates real PDF documents.
/// - [`RecordingAuthoring`]: records draw requests, always available.
pub trait AuthoringService {
    /// In-memory document being edited.
    type Handle;

    fn load(&self, bytes: &[u8]) -> Result<Self::Handle, AuthoringError>;

    /// Native size of the page at `page_index` (0-based), in points.
    fn page_size(&self, handle: &Self::Handle, page_index: usize) -> Result<Size, AuthoringError>;

    fn draw_rectangle(
        &self,
        handle: &mut Self::Handle,
        page_index: usize,
        draw: &RectangleDraw,
    ) -> Result<(), AuthoringError>;

    /// Strokes the outline of `draw.rect`. Used for calibration guides.
    fn draw_outline(
        &self,
        handle: &mut Self::Handle,
        page_index: usize,
        draw: &RectangleDraw,
    ) -> Result<(), AuthoringError>;

    fn draw_text(
        &self,
        handle: &mut Self::Handle,
        page_index: usize,
        draw: &TextDraw,
    ) -> Result<(), AuthoringError>;

    fn save(&self, handle: Self::Handle) -> Result<Vec<u8>, AuthoringError>;
}

/// A draw request captured by [`RecordingAuthoring`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rectangle { page: usize, draw: RectangleDraw },
    Outline { page: usize, draw: RectangleDraw },
    Text { page: usize, draw: TextDraw },
}

/// Handle produced by [`RecordingAuthoring::load`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedDocument {
    pub page_sizes: Vec<Size>,
    pub commands: Vec<DrawCommand>,
}

/// An authoring backend that records every draw instead of writing PDF.
///
/// `load` accepts any input starting with the `%PDF-` header and presents
/// the configured page sizes. `save` emits one line per recorded command,
/// which keeps emitted output deterministic and easy to assert on.
#[derive(Debug, Clone)]
pub struct RecordingAuthoring {
    page_sizes: Vec<Size>,
}

impl RecordingAuthoring {
    pub fn new(page_sizes: Vec<Size>) -> Self {
        Self { page_sizes }
    }

    /// A single US Letter page.
    pub fn letter() -> Self {
        Self::new(vec![Size::new(612.0, 792.0)])
    }

    fn check_page(&self, handle: &RecordedDocument, page: usize) -> Result<(), AuthoringError> {
        if page < handle.page_sizes.len() {
            Ok(())
        } else {
            Err(AuthoringError::PageNotFound(page))
        }
    }
}

impl AuthoringService for RecordingAuthoring {
    type Handle = RecordedDocument;

    fn load(&self, bytes: &[u8]) -> Result<RecordedDocument, AuthoringError> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(AuthoringError::Load("missing %PDF- header".to_string()));
        }
        Ok(RecordedDocument {
            page_sizes: self.page_sizes.clone(),
            commands: Vec::new(),
        })
    }

    fn page_size(&self, handle: &RecordedDocument, page_index: usize) -> Result<Size, AuthoringError> {
        handle
            .page_sizes
            .get(page_index)
            .copied()
            .ok_or(AuthoringError::PageNotFound(page_index))
    }

    fn draw_rectangle(
        &self,
        handle: &mut RecordedDocument,
        page_index: usize,
        draw: &RectangleDraw,
    ) -> Result<(), AuthoringError> {
        self.check_page(handle, page_index)?;
        handle.commands.push(DrawCommand::Rectangle {
            page: page_index,
            draw: *draw,
        });
        Ok(())
    }

    fn draw_outline(
        &self,
        handle: &mut RecordedDocument,
        page_index: usize,
        draw: &RectangleDraw,
    ) -> Result<(), AuthoringError> {
        self.check_page(handle, page_index)?;
        handle.commands.push(DrawCommand::Outline {
            page: page_index,
            draw: *draw,
        });
        Ok(())
    }

    fn draw_text(
        &self,
        handle: &mut RecordedDocument,
        page_index: usize,
        draw: &TextDraw,
    ) -> Result<(), AuthoringError> {
        self.check_page(handle, page_index)?;
        handle.commands.push(DrawCommand::Text {
            page: page_index,
            draw: draw.clone(),
        });
        Ok(())
    }

    fn save(&self, handle: RecordedDocument) -> Result<Vec<u8>, AuthoringError> {
        let mut out = String::new();
        for command in &handle.commands {
            out.push_str(&format!("{:?}\n", command));
        }
        Ok(out.into_bytes())
    }
}
