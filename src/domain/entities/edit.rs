use crate::domain::entities::row::{Row, RowKey};

/// A local mutation handed to the persistence port after it has been applied to the grid.
#[derive(Debug, Clone, PartialEq)]
pub enum RowChange {
    Added { key: RowKey, row: Row },
    Updated { key: RowKey, row: Row },
    Removed { key: RowKey, id: Option<i64> },
}

impl RowChange {
    pub fn key(&self) -> RowKey {
        match self {
            RowChange::Added { key, .. }
            | RowChange::Updated { key, .. }
            | RowChange::Removed { key, .. } => *key,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            RowChange::Added { row, .. } | RowChange::Updated { row, .. } => row.id,
            RowChange::Removed { id, .. } => *id,
        }
    }
}
