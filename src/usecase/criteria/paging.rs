use crate::domain::entities::criteria::{PageOptions, ResponseFormat};

/// Row window for a 1-based page. Page 0 and size 0 are clamped to 1.
pub fn page_options(current_page: u32, page_size: u32) -> PageOptions {
    let page_size = page_size.max(1);
    let page_index = u64::from(current_page.max(1) - 1);
    PageOptions {
        response_format: ResponseFormat::Json,
        start_row: page_index * u64::from(page_size),
        row_count: page_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_row_is_zero_based_offset() {
        let third = page_options(3, 20);
        assert_eq!(third.start_row, 40);
        assert_eq!(third.row_count, 20);

        let first = page_options(1, 20);
        assert_eq!(first.start_row, 0);
        assert_eq!(first.row_count, 20);
        assert_eq!(first.response_format, ResponseFormat::Json);
    }

    #[test]
    fn degenerate_inputs_are_clamped() {
        let options = page_options(0, 0);
        assert_eq!(options.start_row, 0);
        assert_eq!(options.row_count, 1);
    }
}
