//! # formmark
//!
//! Overlay item and quantity selections onto a fixed-layout PDF order form,
//! then write them into a copy of the form as highlights and text.
//!
//! ```no_run
//! use formmark::{FormDocument, PipelineBuilder, SessionFile};
//!
//! # async fn run() -> Result<(), formmark::FormmarkError> {
//! let pipeline = PipelineBuilder::new().with_display_width(800.0).build();
//! let form = FormDocument::open("order.pdf")?;
//! let mut session = pipeline.open(&form)?;
//! pipeline.replay(&mut session, &SessionFile::from_json_file("clicks.json")?)?;
//! let emitted = pipeline.generate(&form, &session).await?;
//! std::fs::write("order-filled.pdf", emitted.bytes)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod emission;
pub mod error;
pub mod form;
pub mod pipeline;

pub use formmark_core as core;
pub use formmark_pdf_composer as composer;

pub use config::{SessionClick, SessionFile, TemplateFile, DEFAULT_DISPLAY_WIDTH, DEFAULT_EMIT_TIMEOUT};
pub use emission::EmissionController;
pub use error::FormmarkError;
pub use form::FormDocument;
pub use pipeline::{FormPipeline, PipelineBuilder};
