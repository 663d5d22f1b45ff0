//! The selection store: an ordered, deduplicated set of selected cells.
//!
//! Every operation borrows the current state and returns the next one, so a
//! caller can keep old states around for undo or diff two states directly.

use crate::catalog::ItemCatalog;
use crate::error::UnknownSelection;
use crate::grid::LayoutGrid;
use crate::resolver::classify;
use formmark_types::{AddressKey, LogicalAddress, Point, Rect};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// One selected cell.
///
/// `label` is fixed when the selection is created; only `quantity` changes
/// afterwards. The original click is kept for reconstructing geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    key: AddressKey,
    address: LogicalAddress,
    label: String,
    quantity: String,
    screen_x: f32,
    screen_y: f32,
}

impl Selection {
    fn new(address: LogicalAddress, label: String, click: Point) -> Self {
        Self {
            key: address.key(),
            address,
            label,
            quantity: String::new(),
            screen_x: click.x,
            screen_y: click.y,
        }
    }

    pub fn key(&self) -> &AddressKey {
        &self.key
    }

    pub fn address(&self) -> LogicalAddress {
        self.address
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn quantity(&self) -> &str {
        &self.quantity
    }

    pub fn screen_point(&self) -> Point {
        Point::new(self.screen_x, self.screen_y)
    }

    /// The on-screen highlight: the full column band, one line pitch tall,
    /// vertically centered on the original click. `None` if the grid has no
    /// such column.
    pub fn screen_highlight(&self, grid: &LayoutGrid) -> Option<Rect> {
        let band = grid.column(self.address.column)?;
        let pitch = grid.line_pitch();
        Some(Rect::new(
            band.start,
            self.screen_y - pitch / 2.0,
            band.width(),
            pitch,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionStore {
    entries: IndexMap<AddressKey, Selection>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the selection at `address` if there is one, otherwise adds a
    /// new one labelled from `catalog` with an empty quantity.
    #[must_use]
    pub fn toggle(&self, address: LogicalAddress, click: Point, catalog: &ItemCatalog) -> Self {
        let key = address.key();
        let mut next = self.clone();
        if next.entries.shift_remove(&key).is_none() {
            let label = catalog.label_for(address);
            next.entries
                .insert(key, Selection::new(address, label, click));
        }
        next
    }

    /// Replaces the quantity of the selection at `key`.
    pub fn set_quantity(
        &self,
        key: &AddressKey,
        text: impl Into<String>,
    ) -> Result<Self, UnknownSelection> {
        let mut next = self.clone();
        let selection = next
            .entries
            .get_mut(key)
            .ok_or_else(|| UnknownSelection(key.clone()))?;
        selection.quantity = text.into();
        Ok(next)
    }

    /// Drops the selection at `key`. Unknown keys leave the state as it was.
    #[must_use]
    pub fn remove(&self, key: &AddressKey) -> Self {
        let mut next = self.clone();
        next.entries.shift_remove(key);
        next
    }

    #[must_use]
    pub fn clear(&self) -> Self {
        Self::default()
    }

    /// Re-resolves every selection's original click against `grid`.
    ///
    /// A selection that still lands in its own cell is kept unchanged. One
    /// that lands in a different cell moves there, relabelled from `catalog`
    /// and keeping its quantity, unless that cell is already taken. One that
    /// no longer lands in any cell is dropped. Order is preserved.
    #[must_use]
    pub fn rebind(&self, grid: &LayoutGrid, catalog: &ItemCatalog) -> Self {
        let resolved: Vec<_> = self
            .entries
            .values()
            .map(|selection| (selection, classify(selection.screen_point(), grid)))
            .collect();
        let unchanged: HashSet<AddressKey> = resolved
            .iter()
            .filter(|(selection, address)| address.as_ref() == Ok(&selection.address))
            .map(|(selection, _)| selection.key.clone())
            .collect();

        let mut next = Self::default();
        for (selection, address) in resolved {
            match address {
                Ok(address) if address == selection.address => {
                    next.entries.insert(selection.key.clone(), selection.clone());
                }
                Ok(address) => {
                    let key = address.key();
                    if unchanged.contains(&key) || next.entries.contains_key(&key) {
                        log::debug!("Dropping {}: {} is already selected", selection.key, key);
                        continue;
                    }
                    let mut moved =
                        Selection::new(address, catalog.label_for(address), selection.screen_point());
                    moved.quantity = selection.quantity.clone();
                    next.entries.insert(key, moved);
                }
                Err(reason) => log::debug!("Dropping {}: {reason}", selection.key),
            }
        }
        next
    }

    pub fn get(&self, key: &AddressKey) -> Option<&Selection> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &AddressKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selections in the order they were first selected.
    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.entries.values()
    }
}

impl Serialize for SelectionStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}
