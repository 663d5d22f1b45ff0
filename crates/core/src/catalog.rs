use formmark_types::LogicalAddress;

/// Item labels per column, indexed by line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    columns: Vec<Vec<String>>,
}

impl ItemCatalog {
    pub fn new(columns: Vec<Vec<String>>) -> Self {
        Self { columns }
    }

    /// The label printed at `address`, or a placeholder naming the 1-based
    /// column and line when the catalog has no entry there.
    pub fn label_for(&self, address: LogicalAddress) -> String {
        self.columns
            .get(address.column)
            .and_then(|items| items.get(address.line))
            .cloned()
            .unwrap_or_else(|| {
                format!(
                    "Item in column {}, line {}",
                    address.column.saturating_add(1),
                    address.line.saturating_add(1)
                )
            })
    }
}
