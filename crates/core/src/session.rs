//! Event dispatch for one open form.
//!
//! A [`FormSession`] receives every user and renderer event through
//! [`FormSession::dispatch`] and applies it to its selection store with the
//! store's pure transitions. Events run one at a time to completion.

use crate::catalog::ItemCatalog;
use crate::error::GridError;
use crate::grid::LayoutGrid;
use crate::resolver::classify;
use crate::store::SelectionStore;
use crate::template::LayoutTemplate;
use formmark_traits::PageMetrics;
use formmark_types::{AddressKey, Point, Rect, Size};
use std::collections::VecDeque;

/// Number of earlier states kept for undo.
pub const HISTORY_LIMIT: usize = 50;

/// The template in effect before a recalibration.
#[derive(Debug, Clone)]
struct Layout {
    template: LayoutTemplate,
    catalog: ItemCatalog,
    grid: Option<LayoutGrid>,
}

/// One undo step. `layout` is only set when the step swapped templates.
#[derive(Debug, Clone)]
struct Snapshot {
    store: SelectionStore,
    layout: Option<Layout>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The renderer finished laying out a newly loaded document.
    RenderComplete(PageMetrics),
    /// A pointer click in screen space.
    Click(Point),
    SetQuantity { key: AddressKey, text: String },
    Remove(AddressKey),
    ClearAll,
    /// Swap in a new template and re-resolve existing selections against it.
    Recalibrate(LayoutTemplate),
    ToggleCalibration,
    Undo,
}

#[derive(Debug, Clone)]
pub struct FormSession {
    template: LayoutTemplate,
    catalog: ItemCatalog,
    grid: Option<LayoutGrid>,
    metrics: Option<PageMetrics>,
    store: SelectionStore,
    history: VecDeque<Snapshot>,
    calibration_mode: bool,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new(LayoutTemplate::default())
    }
}

impl FormSession {
    pub fn new(template: LayoutTemplate) -> Self {
        let catalog = template.catalog();
        Self {
            template,
            catalog,
            grid: None,
            metrics: None,
            store: SelectionStore::new(),
            history: VecDeque::new(),
            calibration_mode: false,
        }
    }

    /// Applies `event` and reports whether anything changed.
    ///
    /// Only a template that cannot produce a grid at the rendered width is an
    /// error; in that case the session keeps its previous state.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<bool, GridError> {
        match event {
            SessionEvent::RenderComplete(metrics) => self.render_complete(metrics),
            SessionEvent::Click(point) => Ok(self.click(point)),
            SessionEvent::SetQuantity { key, text } => {
                match self.store.set_quantity(&key, text) {
                    Ok(next) => Ok(self.commit(next)),
                    Err(missing) => {
                        log::debug!("Ignoring quantity edit: {missing}");
                        Ok(false)
                    }
                }
            }
            SessionEvent::Remove(key) => {
                let next = self.store.remove(&key);
                Ok(self.commit(next))
            }
            SessionEvent::ClearAll => {
                let next = self.store.clear();
                Ok(self.commit(next))
            }
            SessionEvent::Recalibrate(template) => self.recalibrate(template),
            SessionEvent::ToggleCalibration => {
                self.calibration_mode = !self.calibration_mode;
                Ok(true)
            }
            SessionEvent::Undo => Ok(self.undo()),
        }
    }

    /// Restores the state before the last change. Undoing a recalibration
    /// also restores the previous template and grid.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop_back() else {
            return false;
        };
        if let Some(layout) = snapshot.layout {
            self.template = layout.template;
            self.catalog = layout.catalog;
            self.grid = layout.grid;
        }
        self.store = snapshot.store;
        true
    }

    fn render_complete(&mut self, metrics: PageMetrics) -> Result<bool, GridError> {
        let grid = self.template.grid_for_width(metrics.page_display_width)?;
        log::info!(
            "Document rendered: {} page(s), first page {}x{} px, {} column(s).",
            metrics.num_pages,
            metrics.page_display_width,
            metrics.page_display_height,
            grid.columns().len()
        );
        self.grid = Some(grid);
        self.metrics = Some(metrics);
        self.store = SelectionStore::new();
        self.history.clear();
        Ok(true)
    }

    fn click(&mut self, point: Point) -> bool {
        let Some(grid) = &self.grid else {
            log::debug!("Ignoring click at ({}, {}) before rendering completed", point.x, point.y);
            return false;
        };
        match classify(point, grid) {
            Ok(address) => {
                let next = self.store.toggle(address, point, &self.catalog);
                self.commit(next)
            }
            Err(reason) => {
                log::debug!("Ignoring click at ({}, {}): {reason}", point.x, point.y);
                false
            }
        }
    }

    fn recalibrate(&mut self, template: LayoutTemplate) -> Result<bool, GridError> {
        let grid = self
            .metrics
            .as_ref()
            .map(|metrics| template.grid_for_width(metrics.page_display_width))
            .transpose()?;
        let catalog = template.catalog();
        let store = match &grid {
            Some(grid) => self.store.rebind(grid, &catalog),
            None => self.store.clone(),
        };
        log::info!(
            "Recalibrated with template '{}': kept {} of {} selection(s).",
            template.name,
            store.len(),
            self.store.len()
        );

        let previous = Snapshot {
            store: std::mem::replace(&mut self.store, store),
            layout: Some(Layout {
                template: std::mem::replace(&mut self.template, template),
                catalog: std::mem::replace(&mut self.catalog, catalog),
                grid: std::mem::replace(&mut self.grid, grid),
            }),
        };
        self.push_history(previous);
        Ok(true)
    }

    fn commit(&mut self, next: SelectionStore) -> bool {
        if next == self.store {
            return false;
        }
        let previous = std::mem::replace(&mut self.store, next);
        self.push_history(Snapshot {
            store: previous,
            layout: None,
        });
        true
    }

    fn push_history(&mut self, snapshot: Snapshot) {
        self.history.push_back(snapshot);
        if self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    pub fn template(&self) -> &LayoutTemplate {
        &self.template
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// `None` until the first [`SessionEvent::RenderComplete`].
    pub fn grid(&self) -> Option<&LayoutGrid> {
        self.grid.as_ref()
    }

    pub fn metrics(&self) -> Option<&PageMetrics> {
        self.metrics.as_ref()
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn calibration_mode(&self) -> bool {
        self.calibration_mode
    }

    /// Rendered size of the first page.
    pub fn display_size(&self) -> Option<Size> {
        self.metrics
            .map(|m| Size::new(m.page_display_width, m.page_display_height))
    }

    /// Column guides to draw over the page, empty unless calibration mode is on.
    pub fn calibration_overlay(&self) -> Vec<Rect> {
        match (&self.grid, &self.metrics) {
            (Some(grid), Some(metrics)) if self.calibration_mode => {
                grid.calibration_overlay(metrics.page_display_height)
            }
            _ => Vec::new(),
        }
    }

    /// On-screen highlight for every selection, in store order.
    pub fn highlights(&self) -> Vec<(AddressKey, Rect)> {
        let Some(grid) = &self.grid else {
            return Vec::new();
        };
        self.store
            .iter()
            .filter_map(|s| s.screen_highlight(grid).map(|rect| (s.key().clone(), rect)))
            .collect()
    }
}
