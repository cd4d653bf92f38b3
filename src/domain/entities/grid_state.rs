use crate::domain::entities::filter_model::FilterModel;
use crate::domain::entities::row::GridRow;
use crate::domain::entities::sort_model::SortModel;

/// Everything that decides which rows the backend returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridQueryState {
    pub filter_model: FilterModel,
    pub sort_model: SortModel,
    pub current_page: u32,
    pub page_size: u32,
}

impl GridQueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter_model: FilterModel::new(),
            sort_model: SortModel::new(),
            current_page: 1,
            page_size: page_size.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; the rows on screen are from an earlier response.
    Errored(String),
}

/// What the rendering layer draws.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub state: GridQueryState,
    pub rows: Vec<GridRow>,
    pub total_count: u64,
    pub status: FetchStatus,
    /// Last persistence-port failure, if the most recent local edit could not be saved.
    pub notice: Option<String>,
}

impl GridSnapshot {
    pub fn page_count(&self) -> u64 {
        let size = u64::from(self.state.page_size.max(1));
        self.total_count.div_ceil(size).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up_and_never_drops_below_one() {
        let mut snapshot = GridSnapshot {
            state: GridQueryState::new(20),
            rows: Vec::new(),
            total_count: 0,
            status: FetchStatus::Idle,
            notice: None,
        };
        assert_eq!(snapshot.page_count(), 1);

        snapshot.total_count = 41;
        assert_eq!(snapshot.page_count(), 3);
    }
}
