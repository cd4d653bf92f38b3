/// The grid's pager, which owns the true page and size after a user action.
pub trait PaginationControl: Send + Sync {
    /// 1-based.
    fn current_page(&self) -> u32;

    fn page_size(&self) -> u32;
}
