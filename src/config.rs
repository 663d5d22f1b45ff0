// src/config.rs
//! Configuration files and tunables.
//!
//! Layout templates and session files are JSON. Both are read whole; a
//! missing field in a template falls back to the built-in order form.

use crate::error::FormmarkError;
use formmark_core::{LayoutTemplate, Point};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Width the first page is rendered at, in display pixels.
pub const DEFAULT_DISPLAY_WIDTH: f32 = 800.0;

/// Upper bound on one emission, load to save.
pub const DEFAULT_EMIT_TIMEOUT: Duration = Duration::from_secs(30);

fn read_file(path: &Path, what: &str) -> Result<String, FormmarkError> {
    fs::read_to_string(path).map_err(|e| {
        FormmarkError::Io(io::Error::new(
            e.kind(),
            format!("Failed to read {} from '{}': {}", what, path.display(), e),
        ))
    })
}

/// Loading templates from JSON files.
pub trait TemplateFile: Sized {
    fn from_json_str(json: &str) -> Result<Self, FormmarkError>;
    fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, FormmarkError>;
}

impl TemplateFile for LayoutTemplate {
    fn from_json_str(json: &str) -> Result<Self, FormmarkError> {
        let template: LayoutTemplate = serde_json::from_str(json)?;
        // Any width works here; this only validates fractions and pitch.
        template.grid_for_width(DEFAULT_DISPLAY_WIDTH)?;
        Ok(template)
    }

    fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, FormmarkError> {
        let path = path.as_ref();
        let template = Self::from_json_str(&read_file(path, "layout template")?)?;
        log::info!(
            "Loaded layout template '{}' ({} columns) from '{}'.",
            template.name,
            template.columns.len(),
            path.display()
        );
        Ok(template)
    }
}

/// One recorded click, with the quantity typed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClick {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
}

impl SessionClick {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A saved sequence of clicks on a form rendered at `display_width`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    #[serde(default)]
    pub display_width: Option<f32>,
    pub clicks: Vec<SessionClick>,
}

impl SessionFile {
    pub fn from_json_str(json: &str) -> Result<Self, FormmarkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, FormmarkError> {
        Self::from_json_str(&read_file(path.as_ref(), "session")?)
    }
}
