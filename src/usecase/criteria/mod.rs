pub mod filters;
pub mod paging;
pub mod sorts;

use crate::domain::entities::criteria::{Criteria, PageOptions};
use crate::domain::entities::filter_model::FilterModel;
use crate::domain::entities::sort_model::SortModelEntry;

pub use filters::translate_filters;
pub use paging::page_options;
pub use sorts::translate_sorts;

pub fn build_criteria(
    fields: &[String],
    summary_fields: &[String],
    filter_model: &FilterModel,
    sort_model: &[SortModelEntry],
    options: PageOptions,
) -> Criteria {
    Criteria {
        fields: fields.to_vec(),
        summary_fields: summary_fields.to_vec(),
        filters: translate_filters(filter_model),
        sorts: translate_sorts(sort_model),
        options,
    }
}
