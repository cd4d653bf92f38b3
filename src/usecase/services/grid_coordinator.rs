use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::GridConfig;
use crate::domain::entities::edit::RowChange;
use crate::domain::entities::filter_model::{ColumnFilter, FilterModel};
use crate::domain::entities::grid_state::{FetchStatus, GridQueryState, GridSnapshot};
use crate::domain::entities::row::{GridRow, RowDraft, RowKey};
use crate::domain::entities::sort_model::SortModel;
use crate::platform::debounce::Debouncer;
use crate::usecase::criteria::page_options;
use crate::usecase::ports::pagination::PaginationControl;
use crate::usecase::ports::persistence::{PendingChange, RepoError};
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::export_service::ExportService;
use crate::usecase::services::query_service::{FetchError, QueryResult, QueryService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub page_size: u32,
    pub debounce: Duration,
}

struct Inner {
    state: GridQueryState,
    rows: Vec<GridRow>,
    total_count: u64,
    status: FetchStatus,
    notice: Option<String>,
    /// Generation of the most recently issued fetch.
    generation: u64,
    /// Latest sort model waiting in the debounce window.
    pending_sort: Option<SortModel>,
    next_key: u64,
}

impl Inner {
    fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            state: self.state.clone(),
            rows: self.rows.clone(),
            total_count: self.total_count,
            status: self.status.clone(),
            notice: self.notice.clone(),
        }
    }

    fn allocate_key(&mut self) -> RowKey {
        self.next_key += 1;
        RowKey(self.next_key)
    }
}

struct Shared {
    query: Arc<QueryService>,
    edits: EditService,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<GridSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.snapshots.send_replace(inner.snapshot());
    }

    /// Tags a fetch of the current state with a fresh generation and runs it.
    fn spawn_fetch(self: &Arc<Self>, mut inner: MutexGuard<'_, Inner>) -> JoinHandle<()> {
        inner.generation += 1;
        inner.status = FetchStatus::Loading;
        let generation = inner.generation;
        let state = inner.state.clone();
        self.publish(&inner);
        drop(inner);

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let options = page_options(state.current_page, state.page_size);
            let result = shared
                .query
                .execute(
                    &shared.query.grid().fields,
                    &state.filter_model,
                    &state.sort_model,
                    options,
                )
                .await;
            shared.apply_result(generation, result);
        })
    }

    fn apply_result(&self, generation: u64, result: Result<QueryResult, FetchError>) {
        let mut inner = self.lock();
        if generation != inner.generation {
            debug!(
                generation,
                latest = inner.generation,
                "discarding superseded fetch result"
            );
            return;
        }

        match result {
            Ok(QueryResult { rows, total_count }) => {
                let rows = rows
                    .into_iter()
                    .map(|row| GridRow {
                        key: inner.allocate_key(),
                        row,
                    })
                    .collect();
                inner.rows = rows;
                inner.total_count = total_count;
                inner.status = FetchStatus::Ready;
            }
            Err(err) => {
                warn!(error = %err, "fetch failed, keeping previous rows");
                inner.status = FetchStatus::Errored(err.to_string());
            }
        }
        self.publish(&inner);
    }

    fn apply_sort(self: &Arc<Self>, sort_model: SortModel) {
        let mut inner = self.lock();
        inner.pending_sort = None;
        if inner.state.sort_model == sort_model {
            debug!("sort window settled on the applied model, nothing to fetch");
            return;
        }
        debug!(sorts = sort_model.len(), "applying debounced sort model");
        inner.state.sort_model = sort_model;
        self.spawn_fetch(inner);
    }

    fn apply_search(self: &Arc<Self>, text: String) {
        let column = self.query.grid().search_column.clone();
        let mut inner = self.lock();
        let before = inner.state.filter_model.clone();

        let text = text.trim();
        if text.is_empty() {
            inner.state.filter_model.remove(&column);
        } else {
            inner
                .state
                .filter_model
                .upsert(column, ColumnFilter::text(text));
        }

        if inner.state.filter_model == before {
            return;
        }
        self.spawn_fetch(inner);
    }

    fn record_change(&self, change: RowChange) {
        let result = self.edits.persist(&change);
        let mut inner = self.lock();
        inner.notice = result
            .err()
            .map(|err| format!("change kept on screen only: {err}"));
        self.publish(&inner);
    }
}

/// Owns the grid's query state and displayed rows, and turns UI events into fetches.
pub struct GridCoordinator {
    shared: Arc<Shared>,
    pagination: Arc<dyn PaginationControl>,
    exports: ExportService,
    sort_debounce: Debouncer<SortModel>,
    search_debounce: Debouncer<String>,
}

impl GridCoordinator {
    /// Must be called from within a tokio runtime.
    pub fn new(
        query: Arc<QueryService>,
        edits: EditService,
        exports: ExportService,
        pagination: Arc<dyn PaginationControl>,
        config: CoordinatorConfig,
    ) -> Self {
        let inner = Inner {
            state: GridQueryState::new(config.page_size),
            rows: Vec::new(),
            total_count: 0,
            status: FetchStatus::Idle,
            notice: None,
            generation: 0,
            pending_sort: None,
            next_key: 0,
        };
        let (snapshots, _) = watch::channel(inner.snapshot());
        let shared = Arc::new(Shared {
            query,
            edits,
            inner: Mutex::new(inner),
            snapshots,
        });

        let sort_target = Arc::clone(&shared);
        let sort_debounce = Debouncer::spawn(config.debounce, move |model: SortModel| {
            sort_target.apply_sort(model);
        });
        let search_target = Arc::clone(&shared);
        let search_debounce = Debouncer::spawn(config.debounce, move |text: String| {
            search_target.apply_search(text);
        });

        Self {
            shared,
            pagination,
            exports,
            sort_debounce,
            search_debounce,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GridSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn grid(&self) -> &GridConfig {
        self.shared.query.grid()
    }

    pub fn editable_columns(&self) -> &[String] {
        self.shared.edits.editable_columns()
    }

    pub fn pending_changes(&self) -> Result<Vec<PendingChange>, RepoError> {
        self.shared.edits.pending()
    }

    /// Re-runs the current query.
    pub fn refresh(&self) -> JoinHandle<()> {
        let inner = self.shared.lock();
        self.shared.spawn_fetch(inner)
    }

    /// Takes the grid's raw filter model; null and malformed column entries are dropped.
    pub fn on_filter_ui_changed(&self, raw: &Value) -> JoinHandle<()> {
        self.set_filter_model(FilterModel::from_raw(raw))
    }

    pub fn set_filter_model(&self, filter_model: FilterModel) -> JoinHandle<()> {
        debug!(filters = filter_model.len(), "applying filter model");
        let mut inner = self.shared.lock();
        inner.state.filter_model = filter_model;
        self.shared.spawn_fetch(inner)
    }

    /// Returns whether the change was queued. A model equal to the latest one seen,
    /// pending or applied, is ignored.
    pub fn on_sort_ui_changed(&self, sort_model: SortModel) -> bool {
        {
            let mut inner = self.shared.lock();
            let latest = inner.pending_sort.as_ref().unwrap_or(&inner.state.sort_model);
            if *latest == sort_model {
                return false;
            }
            inner.pending_sort = Some(sort_model.clone());
        }
        self.sort_debounce.push(sort_model);
        true
    }

    pub fn on_search_box_changed(&self, text: impl Into<String>) {
        self.search_debounce.push(text.into());
    }

    /// Syncs page and size from the pager; fetches only when either moved.
    pub fn on_page_or_size_ui_changed(&self) -> Option<JoinHandle<()>> {
        let page = self.pagination.current_page().max(1);
        let page_size = self.pagination.page_size().max(1);

        let mut inner = self.shared.lock();
        if inner.state.current_page == page && inner.state.page_size == page_size {
            return None;
        }
        inner.state.current_page = page;
        inner.state.page_size = page_size;
        Some(self.shared.spawn_fetch(inner))
    }

    /// Returns the key of the added or edited row, if any row was touched.
    pub fn add_or_update(&self, draft: RowDraft) -> Option<RowKey> {
        let change = {
            let mut inner = self.shared.lock();
            let inner = &mut *inner;
            let mut next_key = inner.next_key;
            let change = self.shared.edits.add_or_update(&mut inner.rows, draft, || {
                next_key += 1;
                RowKey(next_key)
            })?;
            inner.next_key = next_key;
            self.shared.publish(inner);
            change
        };

        let key = change.key();
        self.shared.record_change(change);
        Some(key)
    }

    pub fn remove(&self, key: RowKey) -> bool {
        let change = {
            let mut inner = self.shared.lock();
            let Some(change) = self.shared.edits.remove(&mut inner.rows, key) else {
                return false;
            };
            self.shared.publish(&inner);
            change
        };

        self.shared.record_change(change);
        true
    }

    pub fn export_csv(&self, path: &Path) -> anyhow::Result<usize> {
        let rows = self.shared.lock().rows.clone();
        self.exports.export_csv(path, &rows)
    }

    /// Stops pending debounced sort and search changes.
    pub fn shutdown(&self) {
        info!("grid coordinator shutting down");
        self.sort_debounce.cancel();
        self.search_debounce.cancel();
    }
}
