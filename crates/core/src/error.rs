//! Error types for layout validation, selection edits and emission.

use formmark_traits::AuthoringError;
use formmark_types::AddressKey;
use thiserror::Error;

/// A layout grid or template that cannot describe a form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Layout grid has no columns")]
    NoColumns,
    #[error("Column {index} is invalid: start {start} must be finite and below end {end}")]
    InvalidBand { index: usize, start: f32, end: f32 },
    #[error("Column {index} overlaps column {previous}")]
    Overlap { index: usize, previous: usize },
    #[error("Column fraction {value} of column {index} is outside 0..=1")]
    FractionOutOfRange { index: usize, value: f32 },
    #[error("Line pitch must be positive, got {0}")]
    InvalidPitch(f32),
    #[error("Header offset must be non-negative, got {0}")]
    InvalidHeaderOffset(f32),
    #[error("Page display width must be positive, got {0}")]
    InvalidWidth(f32),
}

/// Why a click did not land on a cell. Absorbed by the session, never surfaced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    #[error("click is outside every column band")]
    OutsideColumns,
    #[error("click is above the first line")]
    AboveFirstLine,
    #[error("click is too far below the first line to number")]
    LineOutOfRange,
    #[error("click coordinates are not finite")]
    NonFinite,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("No selection with key '{0}'")]
pub struct UnknownSelection(pub AddressKey);

/// Failure while computing geometry or drawing, after the document loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmissionFailure {
    #[error("Selection '{key}' refers to column {column}, but the layout has {columns} column(s)")]
    UnknownColumn {
        key: AddressKey,
        column: usize,
        columns: usize,
    },
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),
    #[error(transparent)]
    Authoring(#[from] AuthoringError),
}

/// The error returned by [`AnnotationEmitter::emit`](crate::AnnotationEmitter::emit).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmitError {
    #[error("There are no selections to emit")]
    EmptySelection,
    #[error("Failed to load the source document: {0}")]
    DocumentLoad(#[source] AuthoringError),
    #[error("Failed to generate the annotated document: {0}")]
    Emission(#[from] EmissionFailure),
}
