use std::collections::BTreeSet;

use crate::domain::date_codec::parse_filter_date;
use crate::domain::entities::criteria::SortDirection;
use crate::domain::entities::filter_model::{ColumnFilter, DateFilter, FilterModel};
use crate::domain::entities::sort_model::{SortModel, SortModelEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOp {
    #[default]
    Any,
    Equals,
    GreaterThan,
    LessThan,
    IsNull,
    NotNull,
}

impl DateOp {
    pub const ALL: [DateOp; 6] = [
        DateOp::Any,
        DateOp::Equals,
        DateOp::GreaterThan,
        DateOp::LessThan,
        DateOp::IsNull,
        DateOp::NotNull,
    ];

    pub fn value(self) -> &'static str {
        match self {
            DateOp::Any => "any",
            DateOp::Equals => "equals",
            DateOp::GreaterThan => "greaterThan",
            DateOp::LessThan => "lessThan",
            DateOp::IsNull => "is_null",
            DateOp::NotNull => "not_null",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateOp::Any => "Any",
            DateOp::Equals => "On",
            DateOp::GreaterThan => "After",
            DateOp::LessThan => "Before",
            DateOp::IsNull => "Blank",
            DateOp::NotNull => "Not blank",
        }
    }

    pub fn from_value(value: &str) -> Self {
        DateOp::ALL
            .into_iter()
            .find(|op| op.value() == value)
            .unwrap_or_default()
    }
}

/// What the user has typed or ticked in one column's filter cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterInput {
    Text(String),
    Set(BTreeSet<String>),
    Date { op: DateOp, value: String },
}

impl FilterInput {
    pub fn to_column_filter(&self) -> Option<ColumnFilter> {
        match self {
            FilterInput::Text(text) if text.trim().is_empty() => None,
            FilterInput::Text(text) => Some(ColumnFilter::text(text.trim())),
            FilterInput::Set(values) if values.is_empty() => None,
            FilterInput::Set(values) => Some(ColumnFilter::Set {
                values: values.iter().cloned().collect(),
            }),
            FilterInput::Date { op, value } => {
                let day = parse_filter_date(value);
                let date = match (op, day) {
                    (DateOp::IsNull, _) => DateFilter::IsNull,
                    (DateOp::NotNull, _) => DateFilter::NotNull,
                    (DateOp::Equals, Some(day)) => DateFilter::Equals(day),
                    (DateOp::GreaterThan, Some(day)) => DateFilter::GreaterThan(day),
                    (DateOp::LessThan, Some(day)) => DateFilter::LessThan(day),
                    _ => return None,
                };
                Some(ColumnFilter::Date(date))
            }
        }
    }
}

/// Filter cells in the order the user first touched them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    entries: Vec<(String, FilterInput)>,
}

impl FilterInputs {
    pub fn set(&mut self, column: &str, input: FilterInput) {
        match self.entries.iter_mut().find(|(key, _)| key == column) {
            Some((_, existing)) => *existing = input,
            None => self.entries.push((column.to_string(), input)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FilterInput> {
        self.entries
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, input)| input)
    }

    pub fn toggle_set_value(&mut self, column: &str, value: &str) {
        let mut values = match self.get(column) {
            Some(FilterInput::Set(values)) => values.clone(),
            _ => BTreeSet::new(),
        };
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        self.set(column, FilterInput::Set(values));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Only cells with a usable value become column filters. The search box's own
    /// filter is carried over so applying column filters does not drop it.
    pub fn to_filter_model(&self, carried: Option<(&str, &ColumnFilter)>) -> FilterModel {
        let mut model = FilterModel::new();
        if let Some((column, filter)) = carried {
            model.upsert(column, filter.clone());
        }
        for (column, input) in &self.entries {
            if let Some(filter) = input.to_column_filter() {
                model.upsert(column.clone(), filter);
            }
        }
        model
    }
}

/// Header click: cycles none -> asc -> desc -> none. Without `additive` the clicked
/// column becomes the only sort.
pub fn cycle_sort(model: &SortModel, column: &str, additive: bool) -> SortModel {
    let current = model
        .iter()
        .find(|entry| entry.col_id == column)
        .map(|entry| entry.sort);
    let next = match current {
        None => Some(SortDirection::Asc),
        Some(SortDirection::Asc) => Some(SortDirection::Desc),
        Some(SortDirection::Desc) => None,
    };

    let mut updated: SortModel = if additive {
        model.clone()
    } else {
        model
            .iter()
            .filter(|entry| entry.col_id == column)
            .cloned()
            .collect()
    };

    match (updated.iter().position(|entry| entry.col_id == column), next) {
        (Some(idx), Some(sort)) => updated[idx].sort = sort,
        (Some(idx), None) => {
            updated.remove(idx);
        }
        (None, Some(sort)) => updated.push(SortModelEntry::new(column, sort)),
        (None, None) => {}
    }
    updated
}
