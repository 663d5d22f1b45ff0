// src/error.rs
use formmark_core::{EmitError, GridError, RenderError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error for form loading, configuration and emission.
#[derive(Error, Debug)]
pub enum FormmarkError {
    #[error("'{path}' is not a PDF document: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Layout is invalid: {0}")]
    Grid(#[from] GridError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("An emission is already in progress")]
    Busy,

    #[error("Emission did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Emission task failed: {0}")]
    Task(String),
}
