use crate::domain::entities::edit::RowChange;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoError {
    #[error("{0}")]
    Message(String),
}

/// Where optimistic grid edits go once they have been applied on screen.
///
/// The backend exposes no write API for issues, so adapters decide what "saved" means.
pub trait RowPersistence: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn record(&self, change: &RowChange) -> Result<(), RepoError>;

    /// Changes recorded so far that have not reached the backend.
    fn pending(&self) -> Result<Vec<PendingChange>, RepoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingKind {
    Upsert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChange {
    pub issue_id: i64,
    pub kind: PendingKind,
    pub payload: Option<String>,
}

/// Keeps edits on screen only; nothing survives a re-fetch.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalOnly;

impl RowPersistence for LocalOnly {
    fn init(&self) -> Result<(), RepoError> {
        Ok(())
    }

    fn record(&self, _change: &RowChange) -> Result<(), RepoError> {
        Ok(())
    }

    fn pending(&self) -> Result<Vec<PendingChange>, RepoError> {
        Ok(Vec::new())
    }
}
