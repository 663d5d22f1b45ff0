//! PDF composition utilities for stamping overlays onto existing documents.
//!
//! This crate provides low-level PDF manipulation using lopdf:
//! - Page tree lookup with inherited attributes (MediaBox, Resources)
//! - Content overlaying on top of the existing page content
//! - [`LopdfAuthoring`], the `AuthoringService` backend used by the emitter
//! - [`HeadlessRenderer`], display metrics without rasterizing

mod authoring;
mod error;
mod metrics;

pub use authoring::{LopdfAuthoring, LopdfHandle};
pub use error::ComposerError;
pub use metrics::HeadlessRenderer;

use formmark_types::Size;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// Page tree depth beyond which we assume a `/Parent` cycle.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Returns the page object ids ordered by page number.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    // `get_pages` is keyed by 1-based page number, so values come out in order.
    doc.get_pages().into_values().collect()
}

/// Follows a reference to the object it names. Direct objects are returned as-is.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, ComposerError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Looks up a page attribute, walking up `/Parent` links for inheritable keys.
pub fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>, ComposerError> {
    let mut node_id = page_id;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        let node = doc.get_object(node_id)?.as_dict()?;
        if let Ok(value) = node.get(key) {
            return Ok(Some(value.clone()));
        }
        match node.get(b"Parent") {
            Ok(parent) => node_id = parent.as_reference()?,
            Err(_) => return Ok(None),
        }
    }
    Err(ComposerError::PageTree(format!(
        "page {:?} exceeds the maximum page tree depth",
        page_id
    )))
}

fn as_number(obj: &Object) -> Result<f32, ComposerError> {
    match obj {
        Object::Integer(i) => Ok(*i as f32),
        Object::Real(r) => Ok(*r),
        other => Err(ComposerError::Other(format!(
            "expected a number, found {:?}",
            other
        ))),
    }
}

/// Native page size, from the (possibly inherited) `/MediaBox`.
pub fn page_size(doc: &Document, page_id: ObjectId) -> Result<Size, ComposerError> {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")?.ok_or_else(|| {
        ComposerError::PageTree(format!("page {:?} has no /MediaBox", page_id))
    })?;
    let values = resolve(doc, &media_box)?.as_array()?;
    if values.len() != 4 {
        return Err(ComposerError::PageTree(format!(
            "/MediaBox must have 4 entries, found {}",
            values.len()
        )));
    }
    let mut corners = [0.0f32; 4];
    for (slot, value) in corners.iter_mut().zip(values) {
        *slot = as_number(resolve(doc, value)?)?;
    }
    let [llx, lly, urx, ury] = corners;
    Ok(Size::new((urx - llx).abs(), (ury - lly).abs()))
}

/// Brackets the page's existing content in `q`/`Q` so that any graphics
/// state it leaves behind (CTM, colors) cannot leak into later overlays.
pub fn isolate_existing_content(doc: &mut Document, page_id: ObjectId) -> Result<(), ComposerError> {
    let existing = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        match page_dict.get(b"Contents") {
            Ok(contents) => match contents.as_array() {
                Ok(arr) => arr.clone(),
                Err(_) => vec![contents.clone()],
            },
            Err(_) => return Ok(()),
        }
    };

    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));

    let mut wrapped = Vec::with_capacity(existing.len() + 2);
    wrapped.push(Object::Reference(save_id));
    wrapped.extend(existing);
    wrapped.push(Object::Reference(restore_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(wrapped));
    Ok(())
}

/// Adds a new content stream to an existing page, overlaying it on top.
///
/// A page without `/Contents` (a blank page) gets the overlay as its only
/// content stream.
///
/// # Arguments
/// * `doc` - The document containing the page to modify.
/// * `page_id` - The `ObjectId` of the page to add the overlay to.
/// * `content_stream` - The raw bytes of the new content stream.
pub fn overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    content_stream: Vec<u8>,
) -> Result<(), ComposerError> {
    let stream = Stream::new(dictionary! {}, content_stream);
    let new_content_id = doc.add_object(Object::Stream(stream));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;

    match page_dict.get_mut(b"Contents") {
        Ok(contents_obj) => {
            let mut new_contents_array = match contents_obj.as_array() {
                Ok(arr) => arr.clone(),
                // A single reference; wrap it.
                Err(_) => vec![contents_obj.clone()],
            };

            // Drawn last, so on top.
            new_contents_array.push(Object::Reference(new_content_id));
            page_dict.set("Contents", Object::Array(new_contents_array));
        }
        Err(_) => {
            log::warn!(
                "Page {:?} has no /Contents; using the overlay as its only content.",
                page_id
            );
            page_dict.set("Contents", Object::Reference(new_content_id));
        }
    }

    Ok(())
}
