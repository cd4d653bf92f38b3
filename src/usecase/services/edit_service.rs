use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::edit::RowChange;
use crate::domain::entities::row::{CellValue, GridRow, Row, RowDraft, RowKey};
use crate::usecase::ports::persistence::{PendingChange, RepoError, RowPersistence};

/// Optimistic add/edit/delete on the displayed rows.
pub struct EditService {
    repo: Arc<dyn RowPersistence>,
    editable_columns: Vec<String>,
}

impl EditService {
    pub fn new(repo: Arc<dyn RowPersistence>, editable_columns: Vec<String>) -> Self {
        Self {
            repo,
            editable_columns,
        }
    }

    pub fn editable_columns(&self) -> &[String] {
        &self.editable_columns
    }

    /// Updates the row whose `id` matches the draft, or appends a new row with the next id.
    ///
    /// A draft naming an id that is not on screen changes nothing.
    pub fn add_or_update(
        &self,
        rows: &mut Vec<GridRow>,
        draft: RowDraft,
        new_key: impl FnOnce() -> RowKey,
    ) -> Option<RowChange> {
        match draft.id {
            Some(id) => {
                let Some(target) = rows.iter_mut().find(|grid_row| grid_row.row.id == Some(id))
                else {
                    debug!(id, "edited row is no longer displayed");
                    return None;
                };
                for (field, value) in draft.fields {
                    if self.editable_columns.contains(&field) {
                        target.row.set(field, CellValue::Text(value));
                    }
                }
                Some(RowChange::Updated {
                    key: target.key,
                    row: target.row.clone(),
                })
            }
            None => {
                let id = next_id(rows);
                let mut row = Row {
                    id: Some(id),
                    ..Row::default()
                };
                for (field, value) in draft.fields {
                    row.set(field, CellValue::Text(value));
                }
                let key = new_key();
                rows.push(GridRow {
                    key,
                    row: row.clone(),
                });
                Some(RowChange::Added { key, row })
            }
        }
    }

    pub fn remove(&self, rows: &mut Vec<GridRow>, key: RowKey) -> Option<RowChange> {
        let idx = rows.iter().position(|grid_row| grid_row.key == key)?;
        let removed = rows.remove(idx);
        Some(RowChange::Removed {
            key,
            id: removed.row.id,
        })
    }

    pub fn persist(&self, change: &RowChange) -> Result<(), RepoError> {
        self.repo.record(change).inspect_err(|err| {
            warn!(id = ?change.id(), error = %err, "failed to record local edit");
        })
    }

    pub fn pending(&self) -> Result<Vec<PendingChange>, RepoError> {
        self.repo.pending()
    }
}

/// One past the largest id on screen, or 1 when nothing has an id.
pub fn next_id(rows: &[GridRow]) -> i64 {
    rows.iter()
        .filter_map(|grid_row| grid_row.row.id)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::ports::persistence::LocalOnly;
    use std::collections::BTreeMap;

    fn service() -> EditService {
        EditService::new(
            Arc::new(LocalOnly),
            vec!["issue_reference".to_string(), "issue_title".to_string()],
        )
    }

    fn grid_row(key: u64, id: i64, title: &str) -> GridRow {
        let mut row = Row {
            id: Some(id),
            ..Row::default()
        };
        row.set("issue_title", CellValue::Text(title.to_string()));
        row.set("issue_statustext", CellValue::Text("Completed".to_string()));
        GridRow {
            key: RowKey(key),
            row,
        }
    }

    fn draft(id: Option<i64>, title: &str) -> RowDraft {
        RowDraft {
            id,
            fields: BTreeMap::from([
                ("issue_reference".to_string(), "REF-1".to_string()),
                ("issue_title".to_string(), title.to_string()),
            ]),
        }
    }

    #[test]
    fn add_to_empty_assigns_id_one() {
        let mut rows = Vec::new();
        let change = service()
            .add_or_update(&mut rows, draft(None, "New"), || RowKey(100))
            .expect("add should produce a change");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row.id, Some(1));
        assert_eq!(rows[0].key, RowKey(100));
        assert!(matches!(change, RowChange::Added { .. }));
    }

    #[test]
    fn add_uses_max_id_plus_one() {
        let mut rows = vec![grid_row(1, 3, "a"), grid_row(2, 7, "b"), grid_row(3, 5, "c")];
        service().add_or_update(&mut rows, draft(None, "New"), || RowKey(4));

        assert_eq!(rows.last().and_then(|grid_row| grid_row.row.id), Some(8));
    }

    #[test]
    fn next_id_does_not_overflow_at_the_largest_id() {
        let rows = vec![grid_row(1, i64::MAX, "edge")];

        assert_eq!(next_id(&rows), i64::MAX);
    }

    #[test]
    fn update_replaces_only_editable_fields_in_place() {
        let mut rows = vec![grid_row(1, 3, "a"), grid_row(2, 7, "b")];
        let mut edit = draft(Some(7), "Renamed");
        edit.fields
            .insert("issue_statustext".to_string(), "Archived".to_string());

        let change = service().add_or_update(&mut rows, edit, || unreachable!("no new key"));

        assert!(matches!(change, Some(RowChange::Updated { key: RowKey(2), .. })));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row.display("issue_title"), "Renamed");
        assert_eq!(rows[1].row.display("issue_reference"), "REF-1");
        assert_eq!(rows[1].row.display("issue_statustext"), "Completed");
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut rows = vec![grid_row(1, 3, "a")];
        let change = service().add_or_update(&mut rows, draft(Some(99), "x"), || RowKey(9));

        assert!(change.is_none());
        assert_eq!(rows, vec![grid_row(1, 3, "a")]);
    }

    #[test]
    fn remove_uses_row_identity_not_id() {
        let mut rows = vec![grid_row(1, 3, "dup"), grid_row(2, 3, "dup")];
        let change = service().remove(&mut rows, RowKey(2));

        assert_eq!(
            change,
            Some(RowChange::Removed {
                key: RowKey(2),
                id: Some(3)
            })
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, RowKey(1));
        assert!(service().remove(&mut rows, RowKey(2)).is_none());
    }
}
