//! # formmark-core
//!
//! Platform-agnostic selection and coordinate-mapping core.
//!
//! This crate turns clicks on a rendered form page into stable cell
//! selections and bakes those selections back into the form document:
//! - **grid** / **template**: column bands and line pitch for a form layout
//! - **resolver**: screen point to `(column, line)` address
//! - **catalog**: item labels per address
//! - **store**: the ordered, deduplicated selection set
//! - **transform**: screen-space to document-space geometry
//! - **emitter**: drawing selections through an [`AuthoringService`]
//! - **session**: event dispatch tying the pieces together
//!
//! ## Design Principle
//!
//! This crate has **no platform dependencies**: no filesystem access, no PDF
//! library, no async runtime. Document bytes pass through the authoring and
//! rendering traits from `formmark-traits`.

pub use formmark_traits as traits;
pub use formmark_types as types;

pub mod catalog;
pub mod emitter;
pub mod error;
pub mod grid;
pub mod resolver;
pub mod session;
pub mod store;
pub mod style;
pub mod template;
pub mod transform;

pub use types::{AddressKey, Color, LogicalAddress, Point, Rect, Size};

pub use catalog::ItemCatalog;
pub use emitter::{AnnotationEmitter, EmittedDocument};
pub use error::{EmissionFailure, EmitError, GridError, UnknownSelection, Unresolved};
pub use grid::{ColumnBand, LayoutGrid};
pub use resolver::{classify, resolve};
pub use session::{FormSession, SessionEvent, HISTORY_LIMIT};
pub use store::{Selection, SelectionStore};
pub use style::{EmitOptions, MarkStyle};
pub use template::{ColumnFraction, LayoutTemplate};
pub use transform::{guides_to_document_space, to_document_space, MarkGeometry, Viewport};

pub use traits::{
    AuthoringError, AuthoringService, PageMetrics, RenderError, RenderingService,
};
