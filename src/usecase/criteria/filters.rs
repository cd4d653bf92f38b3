use crate::domain::date_codec::encode;
use crate::domain::entities::criteria::{Comparison, FilterEntry};
use crate::domain::entities::filter_model::{ColumnFilter, DateFilter, FilterModel};

/// Converts the grid's filter model into backend clauses, in filter-model order.
pub fn translate_filters(model: &FilterModel) -> Vec<FilterEntry> {
    model
        .iter()
        .filter_map(|(column, filter)| translate_column(column, filter))
        .collect()
}

fn translate_column(column: &str, filter: &ColumnFilter) -> Option<FilterEntry> {
    match filter {
        ColumnFilter::Set { values } if values.is_empty() => None,
        ColumnFilter::Set { values } => Some(FilterEntry::with_value(
            column,
            Comparison::InList,
            values.join(","),
        )),
        ColumnFilter::Date(date) => Some(match *date {
            DateFilter::Equals(day) => FilterEntry::with_value(column, Comparison::EqualTo, encode(day)),
            DateFilter::NotNull => FilterEntry::is_not_null(column),
            DateFilter::IsNull => FilterEntry::is_null(column),
            DateFilter::GreaterThan(day) => {
                FilterEntry::with_value(column, Comparison::GreaterThan, encode(day))
            }
            DateFilter::LessThan(day) => {
                FilterEntry::with_value(column, Comparison::LessThan, encode(day))
            }
        }),
        ColumnFilter::Text { filter, .. } if !filter.is_empty() => Some(FilterEntry::with_value(
            column,
            Comparison::TextIsLike,
            filter.as_str(),
        )),
        ColumnFilter::Number { filter, .. } if !filter.is_empty() => Some(FilterEntry::with_value(
            column,
            Comparison::NumberEquals,
            filter.as_str(),
        )),
        ColumnFilter::Text { .. } | ColumnFilter::Number { .. } => None,
    }
}
