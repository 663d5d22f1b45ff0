use crate::error::ComposerError;
use crate::{inherited_attribute, isolate_existing_content, overlay_content, page_ids, page_size, resolve};
use formmark_traits::{AuthoringError, AuthoringService, RectangleDraw, TextDraw};
use formmark_types::{Color, Rect, Size};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::BTreeMap;

/// Resource name of the Helvetica font registered for overlay text.
const OVERLAY_FONT: &str = "FMHelv";
/// Prefix of the ExtGState resources carrying fill/stroke alpha.
const ALPHA_STATE_PREFIX: &str = "FMgs";
const GUIDE_LINE_WIDTH: f32 = 1.0;

/// Pending overlay operations for one page, flushed on save.
#[derive(Default)]
struct PageOverlay {
    operations: Vec<Operation>,
    alphas: Vec<f32>,
    uses_font: bool,
}

impl PageOverlay {
    /// Pushes a `gs` selecting `alpha`, registering a graphics state for it on first use.
    fn set_alpha(&mut self, alpha: f32) {
        let index = match self.alphas.iter().position(|a| a.to_bits() == alpha.to_bits()) {
            Some(index) => index,
            None => {
                self.alphas.push(alpha);
                self.alphas.len() - 1
            }
        };
        self.operations.push(Operation::new(
            "gs",
            vec![Object::Name(format!("{ALPHA_STATE_PREFIX}{index}").into_bytes())],
        ));
    }

    fn push_color(&mut self, operator: &str, color: &Color) {
        let [r, g, b] = color.to_unit_rgb();
        self.operations
            .push(Operation::new(operator, vec![r.into(), g.into(), b.into()]));
    }

    fn push_rect(&mut self, rect: &Rect) {
        self.operations.push(Operation::new(
            "re",
            vec![rect.x.into(), rect.y.into(), rect.width.into(), rect.height.into()],
        ));
    }
}

/// An in-memory lopdf document with overlays queued per page.
pub struct LopdfHandle {
    doc: Document,
    page_ids: Vec<ObjectId>,
    overlays: BTreeMap<usize, PageOverlay>,
}

impl LopdfHandle {
    fn page_id(&self, page_index: usize) -> Result<ObjectId, AuthoringError> {
        self.page_ids
            .get(page_index)
            .copied()
            .ok_or(AuthoringError::PageNotFound(page_index))
    }

    fn overlay(&mut self, page_index: usize) -> Result<&mut PageOverlay, AuthoringError> {
        self.page_id(page_index)?;
        Ok(self.overlays.entry(page_index).or_default())
    }
}

/// The lopdf backend for [`AuthoringService`].
///
/// Draws are queued and written on [`save`](AuthoringService::save) as one
/// overlay content stream per touched page, with the page's original
/// content isolated in its own `q`/`Q` pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfAuthoring;

impl LopdfAuthoring {
    pub fn new() -> Self {
        Self
    }
}

/// Encodes `s` for the overlay font's `WinAnsiEncoding`. Characters the
/// encoding has no code for become `?`.
fn to_win_ansi(s: &str) -> Vec<u8> {
    s.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        // 0x80..=0x9F are not Latin-1 in WinAnsi.
        '\u{80}'..='\u{9F}' => return None,
        '\u{00}'..='\u{FF}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Returns an owned copy of `resources[key]`, following a reference if needed.
fn sub_dictionary(doc: &Document, resources: &Dictionary, key: &[u8]) -> Result<Dictionary, ComposerError> {
    match resources.get(key) {
        Ok(obj) => Ok(resolve(doc, obj)?.as_dict()?.clone()),
        Err(_) => Ok(Dictionary::new()),
    }
}

/// Registers the overlay's graphics states and font in the page's resources.
///
/// Resources are written back as a direct dictionary on the page itself, so
/// resources shared with other pages (or inherited from the tree) are never
/// modified.
fn install_resources(doc: &mut Document, page_id: ObjectId, overlay: &PageOverlay) -> Result<(), ComposerError> {
    if overlay.alphas.is_empty() && !overlay.uses_font {
        return Ok(());
    }

    let mut resources = match inherited_attribute(doc, page_id, b"Resources")? {
        Some(obj) => resolve(doc, &obj)?.as_dict()?.clone(),
        None => Dictionary::new(),
    };

    if !overlay.alphas.is_empty() {
        let mut states = sub_dictionary(doc, &resources, b"ExtGState")?;
        for (index, alpha) in overlay.alphas.iter().enumerate() {
            states.set(
                format!("{ALPHA_STATE_PREFIX}{index}"),
                dictionary! {
                    "Type" => "ExtGState",
                    "ca" => Object::Real(*alpha),
                    "CA" => Object::Real(*alpha),
                },
            );
        }
        resources.set("ExtGState", states);
    }

    if overlay.uses_font {
        let mut fonts = sub_dictionary(doc, &resources, b"Font")?;
        fonts.set(
            OVERLAY_FONT,
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            },
        );
        resources.set("Font", fonts);
    }

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", resources);
    Ok(())
}

fn flush_overlay(doc: &mut Document, page_id: ObjectId, overlay: PageOverlay) -> Result<(), ComposerError> {
    install_resources(doc, page_id, &overlay)?;
    isolate_existing_content(doc, page_id)?;
    let stream = Content {
        operations: overlay.operations,
    }
    .encode()?;
    overlay_content(doc, page_id, stream)
}

impl AuthoringService for LopdfAuthoring {
    type Handle = LopdfHandle;

    fn load(&self, bytes: &[u8]) -> Result<LopdfHandle, AuthoringError> {
        let doc = Document::load_mem(bytes).map_err(|e| AuthoringError::Load(e.to_string()))?;
        let page_ids = page_ids(&doc);
        if page_ids.is_empty() {
            return Err(AuthoringError::Load("document has no pages".to_string()));
        }
        log::debug!("Loaded PDF {} with {} page(s).", doc.version, page_ids.len());
        Ok(LopdfHandle {
            doc,
            page_ids,
            overlays: BTreeMap::new(),
        })
    }

    fn page_size(&self, handle: &LopdfHandle, page_index: usize) -> Result<Size, AuthoringError> {
        let page_id = handle.page_id(page_index)?;
        page_size(&handle.doc, page_id).map_err(|e| AuthoringError::Load(e.to_string()))
    }

    fn draw_rectangle(
        &self,
        handle: &mut LopdfHandle,
        page_index: usize,
        draw: &RectangleDraw,
    ) -> Result<(), AuthoringError> {
        let overlay = handle.overlay(page_index)?;
        overlay.operations.push(Operation::new("q", vec![]));
        if !draw.color.is_opaque() {
            overlay.set_alpha(draw.color.a);
        }
        overlay.push_color("rg", &draw.color);
        overlay.push_rect(&draw.rect);
        overlay.operations.push(Operation::new("f", vec![]));
        overlay.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn draw_outline(
        &self,
        handle: &mut LopdfHandle,
        page_index: usize,
        draw: &RectangleDraw,
    ) -> Result<(), AuthoringError> {
        let overlay = handle.overlay(page_index)?;
        overlay.operations.push(Operation::new("q", vec![]));
        if !draw.color.is_opaque() {
            overlay.set_alpha(draw.color.a);
        }
        overlay.push_color("RG", &draw.color);
        overlay
            .operations
            .push(Operation::new("w", vec![GUIDE_LINE_WIDTH.into()]));
        // Dashed, like the on-screen calibration guides.
        overlay.operations.push(Operation::new(
            "d",
            vec![vec![Object::Integer(3), Object::Integer(2)].into(), 0.into()],
        ));
        overlay.push_rect(&draw.rect);
        overlay.operations.push(Operation::new("S", vec![]));
        overlay.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn draw_text(
        &self,
        handle: &mut LopdfHandle,
        page_index: usize,
        draw: &TextDraw,
    ) -> Result<(), AuthoringError> {
        if draw.size <= 0.0 {
            return Err(AuthoringError::Draw {
                page: page_index,
                message: format!("font size must be positive, got {}", draw.size),
            });
        }
        let overlay = handle.overlay(page_index)?;
        overlay.uses_font = true;
        overlay.operations.push(Operation::new("q", vec![]));
        if !draw.color.is_opaque() {
            overlay.set_alpha(draw.color.a);
        }
        overlay.operations.push(Operation::new("BT", vec![]));
        overlay.operations.push(Operation::new(
            "Tf",
            vec![Object::Name(OVERLAY_FONT.as_bytes().to_vec()), draw.size.into()],
        ));
        overlay.push_color("rg", &draw.color);
        overlay.operations.push(Operation::new(
            "Td",
            vec![draw.origin.x.into(), draw.origin.y.into()],
        ));
        overlay.operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&draw.text), StringFormat::Literal)],
        ));
        overlay.operations.push(Operation::new("ET", vec![]));
        overlay.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn save(&self, handle: LopdfHandle) -> Result<Vec<u8>, AuthoringError> {
        let LopdfHandle {
            mut doc,
            page_ids,
            overlays,
        } = handle;

        for (page_index, overlay) in overlays {
            let page_id = page_ids[page_index];
            flush_overlay(&mut doc, page_id, overlay).map_err(|e| e.into_draw_error(page_index))?;
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| AuthoringError::Save(e.to_string()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_dummy_pdf, to_bytes};
    use formmark_types::Point;

    fn highlight() -> RectangleDraw {
        RectangleDraw {
            rect: Rect::new(0.0, 671.0, 116.28, 16.83),
            color: Color::rgb(255, 237, 92).with_alpha(0.3),
        }
    }

    fn page_content(bytes: &[u8], page_index: usize) -> String {
        let doc = Document::load_mem(bytes).unwrap();
        let id = page_ids(&doc)[page_index];
        String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned()
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = LopdfAuthoring.load(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, AuthoringError::Load(_)));
    }

    #[test]
    fn test_page_size_and_bounds() {
        let handle = LopdfAuthoring.load(&to_bytes(create_dummy_pdf(2, "Page"))).unwrap();
        assert_eq!(handle.page_ids.len(), 2);
        assert_eq!(
            LopdfAuthoring.page_size(&handle, 0).unwrap(),
            Size::new(612.0, 792.0)
        );
        assert_eq!(
            LopdfAuthoring.page_size(&handle, 2),
            Err(AuthoringError::PageNotFound(2))
        );
    }

    #[test]
    fn test_rectangle_and_text_are_overlaid() {
        let authoring = LopdfAuthoring::new();
        let mut handle = authoring.load(&to_bytes(create_dummy_pdf(1, "Form"))).unwrap();
        authoring.draw_rectangle(&mut handle, 0, &highlight()).unwrap();
        authoring
            .draw_text(
                &mut handle,
                0,
                &TextDraw {
                    text: "3".into(),
                    origin: Point::new(86.28, 675.5),
                    size: 12.0,
                    color: Color::BLACK,
                },
            )
            .unwrap();
        let bytes = authoring.save(handle).unwrap();

        let content = page_content(&bytes, 0);
        assert!(content.contains("Form 1"), "original content must survive");
        assert!(content.contains(" re"));
        assert!(content.contains("/FMgs0 gs"));
        assert!(content.contains("/FMHelv") && content.contains(" Tf"));
        assert!(content.contains("(3) Tj"));

        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = page_ids(&doc)[0];
        let resources = doc
            .get_object(page_id)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap();
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"), "existing fonts are kept");
        assert!(fonts.has(OVERLAY_FONT.as_bytes()));
        let states = resources.get(b"ExtGState").unwrap().as_dict().unwrap();
        let alpha = states.get(b"FMgs0").unwrap().as_dict().unwrap();
        match alpha.get(b"ca").unwrap() {
            Object::Real(ca) => assert!((ca - 0.3).abs() < 1e-4),
            other => panic!("unexpected alpha object {:?}", other),
        }
    }

    #[test]
    fn test_shared_resources_are_not_modified() {
        let authoring = LopdfAuthoring::new();
        let mut handle = authoring.load(&to_bytes(create_dummy_pdf(2, "Form"))).unwrap();
        authoring.draw_rectangle(&mut handle, 0, &highlight()).unwrap();
        let bytes = authoring.save(handle).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let second = page_ids(&doc)[1];
        let resources = doc
            .get_object(second)
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Resources")
            .unwrap()
            .as_reference()
            .unwrap();
        let shared = doc.get_object(resources).unwrap().as_dict().unwrap();
        assert!(!shared.has(b"ExtGState"));
        assert!(!page_content(&bytes, 1).contains(" re"));
    }

    #[test]
    fn test_outline_is_stroked_and_dashed() {
        let authoring = LopdfAuthoring::new();
        let mut handle = authoring.load(&to_bytes(create_dummy_pdf(1, "Form"))).unwrap();
        authoring
            .draw_outline(
                &mut handle,
                0,
                &RectangleDraw {
                    rect: Rect::new(0.0, 0.0, 116.28, 792.0),
                    color: Color::RED,
                },
            )
            .unwrap();
        let content = page_content(&authoring.save(handle).unwrap(), 0);
        assert!(content.contains(" RG"));
        assert!(content.contains("[3 2]"));
        assert!(content.lines().any(|line| line.trim() == "S"));
    }

    #[test]
    fn test_draw_on_missing_page_fails() {
        let authoring = LopdfAuthoring::new();
        let mut handle = authoring.load(&to_bytes(create_dummy_pdf(1, "Form"))).unwrap();
        assert_eq!(
            authoring.draw_rectangle(&mut handle, 1, &highlight()),
            Err(AuthoringError::PageNotFound(1))
        );
    }

    #[test]
    fn test_untouched_document_round_trips() {
        let authoring = LopdfAuthoring::new();
        let handle = authoring.load(&to_bytes(create_dummy_pdf(1, "Form"))).unwrap();
        let bytes = authoring.save(handle).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(page_content(&bytes, 0).contains("Form 1"));
    }

    #[test]
    fn test_win_ansi_replaces_wide_chars() {
        assert_eq!(to_win_ansi("12"), b"12".to_vec());
        assert_eq!(to_win_ansi("2×"), vec![b'2', 0xD7]);
        assert_eq!(to_win_ansi("3 🍎"), b"3 ?".to_vec());
    }

    #[test]
    fn test_win_ansi_maps_the_windows_block() {
        assert_eq!(to_win_ansi("€5"), vec![0x80, b'5']);
        assert_eq!(to_win_ansi("2\u{2013}3…"), vec![b'2', 0x96, b'3', 0x85]);
        assert_eq!(to_win_ansi("\u{2019}Œ™Ÿ"), vec![0x92, 0x8C, 0x99, 0x9F]);
        // C1 controls have no glyph in WinAnsi.
        assert_eq!(to_win_ansi("\u{80}\u{9D}"), b"??".to_vec());
    }
}
