use crate::error::{EmissionFailure, EmitError};
use crate::grid::LayoutGrid;
use crate::store::SelectionStore;
use crate::style::{EmitOptions, MarkStyle};
use crate::transform::{guides_to_document_space, to_document_space, MarkGeometry, Viewport};
use formmark_traits::{AuthoringService, RectangleDraw, TextDraw};
use formmark_types::Size;

/// The annotated document and what was drawn into it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedDocument {
    pub bytes: Vec<u8>,
    pub highlights: usize,
    pub quantities: usize,
}

/// Bakes a selection store into a copy of the source document.
pub struct AnnotationEmitter<A: AuthoringService> {
    authoring: A,
    style: MarkStyle,
    options: EmitOptions,
}

impl<A: AuthoringService> AnnotationEmitter<A> {
    pub fn new(authoring: A) -> Self {
        Self {
            authoring,
            style: MarkStyle::default(),
            options: EmitOptions::default(),
        }
    }

    pub fn with_style(mut self, style: MarkStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_options(mut self, options: EmitOptions) -> Self {
        self.options = options;
        self
    }

    /// Draws one highlight per selection, plus the quantity text when it is
    /// not blank, onto the target page of `source`.
    ///
    /// `display` is the size the page was rendered at when the selections
    /// were clicked. Geometry for every selection is computed before the
    /// first draw, so an unknown column aborts the emission with nothing
    /// drawn. The store is only read.
    pub fn emit(
        &self,
        source: &[u8],
        selections: &SelectionStore,
        grid: &LayoutGrid,
        display: Size,
    ) -> Result<EmittedDocument, EmitError> {
        if selections.is_empty() {
            return Err(EmitError::EmptySelection);
        }

        let mut handle = self.authoring.load(source).map_err(EmitError::DocumentLoad)?;
        let page = self.options.page_index;
        let page_size = self
            .authoring
            .page_size(&handle, page)
            .map_err(EmissionFailure::from)?;
        let viewport = Viewport::new(display, page_size)?;

        let marks = selections
            .iter()
            .map(|selection| {
                let geometry = to_document_space(selection, grid, &viewport, &self.style)?;
                log::debug!(
                    "{} '{}' -> highlight {:?}, text at {:?}",
                    selection.key(),
                    selection.label(),
                    geometry.highlight,
                    geometry.text_anchor
                );
                Ok((geometry, selection.quantity().trim()))
            })
            .collect::<Result<Vec<(MarkGeometry, &str)>, EmissionFailure>>()?;

        if self.options.calibration_guides {
            for rect in guides_to_document_space(grid, &viewport) {
                let draw = RectangleDraw {
                    rect,
                    color: self.style.guide_color,
                };
                self.authoring
                    .draw_outline(&mut handle, page, &draw)
                    .map_err(EmissionFailure::from)?;
            }
        }

        let mut quantities = 0;
        for (geometry, quantity) in &marks {
            let highlight = RectangleDraw {
                rect: geometry.highlight,
                color: self.style.highlight,
            };
            self.authoring
                .draw_rectangle(&mut handle, page, &highlight)
                .map_err(EmissionFailure::from)?;

            if !quantity.is_empty() {
                let text = TextDraw {
                    text: quantity.to_string(),
                    origin: geometry.text_anchor,
                    size: self.style.text_size,
                    color: self.style.text_color,
                };
                self.authoring
                    .draw_text(&mut handle, page, &text)
                    .map_err(EmissionFailure::from)?;
                quantities += 1;
            }
        }

        let bytes = self.authoring.save(handle).map_err(EmissionFailure::from)?;
        log::info!(
            "Emitted {} highlight(s) and {} quantity label(s) onto page {} ({} bytes).",
            marks.len(),
            quantities,
            page + 1,
            bytes.len()
        );

        Ok(EmittedDocument {
            bytes,
            highlights: marks.len(),
            quantities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ItemCatalog;
    use crate::grid::ColumnBand;
    use formmark_traits::{AuthoringError, DrawCommand, RecordedDocument, RecordingAuthoring};
    use formmark_types::{LogicalAddress, Point};
    use std::cell::RefCell;

    fn grid() -> LayoutGrid {
        LayoutGrid::new(
            vec![ColumnBand::new(0.0, 152.0), ColumnBand::new(152.0, 268.0)],
            22.0,
            95.0,
        )
        .unwrap()
    }

    fn display() -> Size {
        Size::new(800.0, 800.0 * 792.0 / 612.0)
    }

    /// Wraps [`RecordingAuthoring`] and keeps the last saved handle for inspection.
    struct Spy {
        inner: RecordingAuthoring,
        saved: RefCell<Option<RecordedDocument>>,
        fail_text: bool,
    }

    impl Spy {
        fn new() -> Self {
            Self {
                inner: RecordingAuthoring::letter(),
                saved: RefCell::new(None),
                fail_text: false,
            }
        }

        fn commands(&self) -> Vec<DrawCommand> {
            self.saved
                .borrow()
                .as_ref()
                .map(|doc| doc.commands.clone())
                .unwrap_or_default()
        }
    }

    impl AuthoringService for &Spy {
        type Handle = RecordedDocument;

        fn load(&self, bytes: &[u8]) -> Result<RecordedDocument, AuthoringError> {
            self.inner.load(bytes)
        }

        fn page_size(&self, handle: &RecordedDocument, page: usize) -> Result<Size, AuthoringError> {
            self.inner.page_size(handle, page)
        }

        fn draw_rectangle(
            &self,
            handle: &mut RecordedDocument,
            page: usize,
            draw: &RectangleDraw,
        ) -> Result<(), AuthoringError> {
            self.inner.draw_rectangle(handle, page, draw)
        }

        fn draw_outline(
            &self,
            handle: &mut RecordedDocument,
            page: usize,
            draw: &RectangleDraw,
        ) -> Result<(), AuthoringError> {
            self.inner.draw_outline(handle, page, draw)
        }

        fn draw_text(
            &self,
            handle: &mut RecordedDocument,
            page: usize,
            draw: &TextDraw,
        ) -> Result<(), AuthoringError> {
            if self.fail_text {
                return Err(AuthoringError::Draw {
                    page,
                    message: "font unavailable".into(),
                });
            }
            self.inner.draw_text(handle, page, draw)
        }

        fn save(&self, handle: RecordedDocument) -> Result<Vec<u8>, AuthoringError> {
            *self.saved.borrow_mut() = Some(handle.clone());
            self.inner.save(handle)
        }
    }

    fn store_with(clicks: &[(usize, usize, Point, &str)]) -> SelectionStore {
        let catalog = ItemCatalog::default();
        let mut store = SelectionStore::new();
        for &(column, line, click, quantity) in clicks {
            let address = LogicalAddress::new(column, line);
            store = store.toggle(address, click, &catalog);
            if !quantity.is_empty() {
                store = store.set_quantity(&address.key(), quantity).unwrap();
            }
        }
        store
    }

    #[test]
    fn empty_store_is_rejected_before_loading() {
        let spy = Spy::new();
        let emitter = AnnotationEmitter::new(&spy);
        let err = emitter
            .emit(b"garbage", &SelectionStore::new(), &grid(), display())
            .unwrap_err();
        assert_eq!(err, EmitError::EmptySelection);
    }

    #[test]
    fn corrupt_source_is_a_document_load_error() {
        let spy = Spy::new();
        let store = store_with(&[(0, 0, Point::new(50.0, 106.0), "3")]);
        let before = store.clone();
        let err = AnnotationEmitter::new(&spy)
            .emit(b"\x00\x01 not a pdf", &store, &grid(), display())
            .unwrap_err();
        assert!(matches!(err, EmitError::DocumentLoad(AuthoringError::Load(_))));
        assert_eq!(store, before);
    }

    #[test]
    fn one_rectangle_per_selection_and_text_only_when_quantity_set() {
        let spy = Spy::new();
        let store = store_with(&[
            (0, 0, Point::new(50.0, 106.0), "3"),
            (1, 2, Point::new(200.0, 150.0), ""),
            (1, 3, Point::new(200.0, 172.0), "   "),
        ]);
        let emitted = AnnotationEmitter::new(&spy)
            .emit(b"%PDF-1.7", &store, &grid(), display())
            .unwrap();
        assert_eq!(emitted.highlights, 3);
        assert_eq!(emitted.quantities, 1);

        let commands = spy.commands();
        let rects = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rectangle { .. }))
            .count();
        let texts: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { draw, .. } => Some(draw.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(rects, 3);
        assert_eq!(texts, vec!["3"]);
        // Marks follow store order: rectangle then its text.
        assert!(matches!(commands[0], DrawCommand::Rectangle { .. }));
        assert!(matches!(commands[1], DrawCommand::Text { .. }));
    }

    #[test]
    fn unknown_column_aborts_before_drawing() {
        let spy = Spy::new();
        let store = store_with(&[
            (0, 0, Point::new(50.0, 106.0), "1"),
            (9, 0, Point::new(900.0, 106.0), "2"),
        ]);
        let err = AnnotationEmitter::new(&spy)
            .emit(b"%PDF-1.7", &store, &grid(), display())
            .unwrap_err();
        assert!(matches!(
            err,
            EmitError::Emission(EmissionFailure::UnknownColumn { column: 9, .. })
        ));
        assert!(spy.saved.borrow().is_none());
    }

    #[test]
    fn draw_failure_surfaces_the_cause() {
        let mut spy = Spy::new();
        spy.fail_text = true;
        let store = store_with(&[(0, 0, Point::new(50.0, 106.0), "4")]);
        let err = AnnotationEmitter::new(&spy)
            .emit(b"%PDF-1.7", &store, &grid(), display())
            .unwrap_err();
        assert!(err.to_string().contains("font unavailable"));
        assert!(spy.saved.borrow().is_none());
    }

    #[test]
    fn calibration_guides_are_outlined_first() {
        let spy = Spy::new();
        let store = store_with(&[(0, 0, Point::new(50.0, 106.0), "")]);
        AnnotationEmitter::new(&spy)
            .with_options(EmitOptions {
                calibration_guides: true,
                ..EmitOptions::default()
            })
            .emit(b"%PDF-1.7", &store, &grid(), display())
            .unwrap();
        let commands = spy.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], DrawCommand::Outline { .. }));
        assert!(matches!(commands[1], DrawCommand::Outline { .. }));
        assert!(matches!(commands[2], DrawCommand::Rectangle { .. }));
    }

    #[test]
    fn missing_target_page_is_an_emission_failure() {
        let spy = Spy::new();
        let store = store_with(&[(0, 0, Point::new(50.0, 106.0), "")]);
        let err = AnnotationEmitter::new(&spy)
            .with_options(EmitOptions {
                page_index: 4,
                ..EmitOptions::default()
            })
            .emit(b"%PDF-1.7", &store, &grid(), display())
            .unwrap_err();
        assert_eq!(
            err,
            EmitError::Emission(EmissionFailure::Authoring(AuthoringError::PageNotFound(4)))
        );
    }

    #[test]
    fn custom_style_is_applied() {
        let spy = Spy::new();
        let store = store_with(&[(0, 0, Point::new(50.0, 106.0), "2")]);
        let style = MarkStyle {
            text_size: 9.0,
            ..MarkStyle::default()
        };
        AnnotationEmitter::new(&spy)
            .with_style(style)
            .emit(b"%PDF-1.7", &store, &grid(), display())
            .unwrap();
        let size = spy.commands().iter().find_map(|c| match c {
            DrawCommand::Text { draw, .. } => Some(draw.size),
            _ => None,
        });
        assert_eq!(size, Some(9.0));
    }
}
