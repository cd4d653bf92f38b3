use std::sync::{Arc, Mutex, PoisonError};

use crate::usecase::ports::pagination::PaginationControl;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PagerPosition {
    page: u32,
    page_size: u32,
}

/// The pager widget's own position, shared between the view and the coordinator.
#[derive(Debug, Clone)]
pub struct Pager {
    position: Arc<Mutex<PagerPosition>>,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            position: Arc::new(Mutex::new(PagerPosition {
                page: 1,
                page_size: page_size.max(1),
            })),
        }
    }

    pub fn go_to(&self, page: u32, page_count: u64) {
        let last = u32::try_from(page_count.max(1)).unwrap_or(u32::MAX);
        self.with(|position| position.page = page.clamp(1, last));
    }

    /// Changing the size returns to the first page.
    pub fn set_page_size(&self, page_size: u32) {
        self.with(|position| {
            position.page_size = page_size.max(1);
            position.page = 1;
        });
    }

    fn with<R>(&self, f: impl FnOnce(&mut PagerPosition) -> R) -> R {
        let mut position = self.position.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut position)
    }
}

impl PaginationControl for Pager {
    fn current_page(&self) -> u32 {
        self.with(|position| position.page)
    }

    fn page_size(&self) -> u32 {
        self.with(|position| position.page_size)
    }
}
