use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::grid_state::{FetchStatus, GridQueryState, GridSnapshot};
use crate::domain::entities::row::RowDraft;
use crate::domain::entities::sort_model::SortModel;
use crate::ui::state::filter_inputs::FilterInputs;

/// Signals backing the issue grid view. The coordinator's snapshot is mirrored into
/// `snapshot`; everything else is view-only input state.
pub struct AppState {
    pub snapshot: Signal<GridSnapshot>,
    pub search_text: Signal<String>,
    pub filter_inputs: Signal<FilterInputs>,
    /// Sort model as shown in the headers, ahead of the debounced apply.
    pub header_sort: Signal<SortModel>,
    pub draft: Signal<Option<RowDraft>>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(page_size: u32) -> Self {
        Self {
            snapshot: use_signal(|| empty_snapshot(page_size)),
            search_text: use_signal(String::new),
            filter_inputs: use_signal(FilterInputs::default),
            header_sort: use_signal(SortModel::new),
            draft: use_signal(|| None::<RowDraft>),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}

pub fn empty_snapshot(page_size: u32) -> GridSnapshot {
    GridSnapshot {
        state: GridQueryState::new(page_size),
        rows: Vec::new(),
        total_count: 0,
        status: FetchStatus::Idle,
        notice: None,
    }
}

/// Status line text for a snapshot plus the count of edits not yet sent anywhere.
pub fn status_line(snapshot: &GridSnapshot, pending: usize) -> String {
    let mut line = match &snapshot.status {
        FetchStatus::Idle => "Ready".to_string(),
        FetchStatus::Loading => "Loading issues...".to_string(),
        FetchStatus::Ready => format!("{} issue(s)", snapshot.total_count),
        FetchStatus::Errored(message) => format!("Could not load issues: {message}"),
    };
    if let Some(notice) = &snapshot.notice {
        line.push_str(" | ");
        line.push_str(notice);
    }
    if pending > 0 {
        line.push_str(&format!(" | {pending} local change(s) not sent"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_reports_errors_and_pending_edits() {
        let mut snapshot = empty_snapshot(20);
        snapshot.status = FetchStatus::Errored("request timed out".to_string());
        snapshot.notice = Some("change kept on screen only: locked".to_string());

        assert_eq!(
            status_line(&snapshot, 2),
            "Could not load issues: request timed out | change kept on screen only: locked | 2 local change(s) not sent"
        );

        snapshot.status = FetchStatus::Ready;
        snapshot.total_count = 41;
        snapshot.notice = None;
        assert_eq!(status_line(&snapshot, 0), "41 issue(s)");
    }
}
