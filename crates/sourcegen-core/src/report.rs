//! Sync report: what a merge changed (or would change)

use serde::{Deserialize, Serialize};

/// A single change applied to the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncAction {
    /// A table discovered in the warehouse was added to the document
    TableAdded { table: String },

    /// An existing table entry was updated from warehouse metadata
    TableUpdated { table: String },

    /// A table no longer in the warehouse was removed
    TableRemoved { table: String },

    /// A column discovered in the warehouse was added to a table entry
    ColumnAdded { table: String, column: String },

    /// A column no longer in the warehouse was removed
    ColumnRemoved { table: String, column: String },

    /// A column's data type was refreshed from the warehouse
    ColumnRetyped {
        table: String,
        column: String,
        old_type: String,
        new_type: String,
    },
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableAdded { table } => write!(f, "add table {}", table),
            Self::TableUpdated { table } => write!(f, "update table {}", table),
            Self::TableRemoved { table } => write!(f, "remove table {}", table),
            Self::ColumnAdded { table, column } => {
                write!(f, "add column {}.{}", table, column)
            }
            Self::ColumnRemoved { table, column } => {
                write!(f, "remove column {}.{}", table, column)
            }
            Self::ColumnRetyped {
                table,
                column,
                old_type,
                new_type,
            } => write!(
                f,
                "retype column {}.{}: {} -> {}",
                table, column, old_type, new_type
            ),
        }
    }
}

/// Ordered record of the changes a merge produced
///
/// Actions appear in the order the merge emitted them: warehouse order
/// first, YAML-only survivors after.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// All recorded actions
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an action
    pub fn record(&mut self, action: SyncAction) {
        self.actions.push(action);
    }

    /// True when the merge changed nothing
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of tables added
    pub fn tables_added(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::TableAdded { .. }))
    }

    /// Number of tables updated
    pub fn tables_updated(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::TableUpdated { .. }))
    }

    /// Number of tables removed
    pub fn tables_removed(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::TableRemoved { .. }))
    }

    /// Number of columns added
    pub fn columns_added(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::ColumnAdded { .. }))
    }

    /// Number of columns removed
    pub fn columns_removed(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::ColumnRemoved { .. }))
    }

    /// Number of columns whose type changed
    pub fn columns_retyped(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::ColumnRetyped { .. }))
    }

    fn count(&self, pred: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| pred(a)).count()
    }
}
