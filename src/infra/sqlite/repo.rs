use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::params;
use tracing::debug;

use crate::domain::entities::edit::RowChange;
use crate::domain::entities::row::Row;
use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::usecase::ports::persistence::{PendingChange, PendingKind, RepoError, RowPersistence};

/// Keeps local issue edits in a SQLite file until a backend write API exists.
pub struct SqliteScratchStore {
    pub db_path: PathBuf,
}

impl SqliteScratchStore {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

fn to_repo_error(err: anyhow::Error) -> RepoError {
    RepoError::Message(format!("{err:#}"))
}

pub fn upsert_issue(db_path: &Path, issue_id: i64, row: &Row) -> Result<()> {
    let payload = serde_json::to_string(&row.to_json()).context("failed to encode issue")?;
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start scratch transaction")?;
    tx.execute(
        "INSERT INTO scratch_issue(issue_id, payload) VALUES (?1, ?2)
         ON CONFLICT(issue_id) DO UPDATE SET payload = excluded.payload,
                                             updated_at = CURRENT_TIMESTAMP",
        params![issue_id, payload],
    )
    .with_context(|| format!("failed to store issue #{issue_id}"))?;
    tx.execute(
        "DELETE FROM scratch_deletion WHERE issue_id = ?1",
        params![issue_id],
    )
    .with_context(|| format!("failed to clear deletion of issue #{issue_id}"))?;
    tx.commit().context("failed to commit scratch transaction")?;
    Ok(())
}

pub fn mark_deleted(db_path: &Path, issue_id: i64) -> Result<()> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start scratch transaction")?;
    tx.execute(
        "DELETE FROM scratch_issue WHERE issue_id = ?1",
        params![issue_id],
    )
    .with_context(|| format!("failed to drop stored issue #{issue_id}"))?;
    tx.execute(
        "INSERT OR REPLACE INTO scratch_deletion(issue_id) VALUES (?1)",
        params![issue_id],
    )
    .with_context(|| format!("failed to record deletion of issue #{issue_id}"))?;
    tx.commit().context("failed to commit scratch transaction")?;
    Ok(())
}

pub fn list_pending(db_path: &Path) -> Result<Vec<PendingChange>> {
    let conn = open_connection(db_path)?;
    let mut stmt = conn
        .prepare(
            "SELECT issue_id, 0 AS kind, payload FROM scratch_issue
             UNION ALL
             SELECT issue_id, 1 AS kind, NULL FROM scratch_deletion
             ORDER BY issue_id ASC, kind ASC",
        )
        .context("failed to prepare pending query")?;

    let pending = stmt
        .query_map([], |row| {
            let kind: i64 = row.get(1)?;
            Ok(PendingChange {
                issue_id: row.get(0)?,
                kind: if kind == 0 {
                    PendingKind::Upsert
                } else {
                    PendingKind::Delete
                },
                payload: row.get(2)?,
            })
        })
        .context("failed to query pending changes")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect pending changes")?;

    Ok(pending)
}

impl RowPersistence for SqliteScratchStore {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(to_repo_error)
    }

    fn record(&self, change: &RowChange) -> Result<(), RepoError> {
        let Some(issue_id) = change.id() else {
            debug!(key = ?change.key(), "row has no issue id, nothing to store");
            return Ok(());
        };

        match change {
            RowChange::Added { row, .. } | RowChange::Updated { row, .. } => {
                upsert_issue(&self.db_path, issue_id, row)
            }
            RowChange::Removed { .. } => mark_deleted(&self.db_path, issue_id),
        }
        .map_err(to_repo_error)
    }

    fn pending(&self) -> Result<Vec<PendingChange>, RepoError> {
        list_pending(&self.db_path).map_err(to_repo_error)
    }
}
