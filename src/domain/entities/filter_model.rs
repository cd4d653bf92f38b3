use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::date_codec::parse_filter_date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("filter entry is not an object")]
    NotAnObject,

    #[error("date filter has no usable condition (type: {kind:?}, filter: {filter:?})")]
    UnsupportedDate {
        kind: Option<String>,
        filter: Option<String>,
    },

    #[error("date filter value {0:?} is not a date")]
    BadDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Equals(NaiveDate),
    GreaterThan(NaiveDate),
    LessThan(NaiveDate),
    IsNull,
    NotNull,
}

/// A single column's active filter, as configured in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    Set {
        values: Vec<String>,
    },
    Date(DateFilter),
    Text {
        condition: Option<String>,
        filter: String,
    },
    Number {
        condition: Option<String>,
        filter: String,
    },
}

impl ColumnFilter {
    pub fn text(filter: impl Into<String>) -> Self {
        ColumnFilter::Text {
            condition: Some("contains".to_string()),
            filter: filter.into(),
        }
    }

    /// Validates one raw grid filter object.
    ///
    /// `Ok(None)` means the column carries no usable value and contributes nothing.
    pub fn from_raw(raw: &Value) -> Result<Option<Self>, ValidationError> {
        let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;
        let filter_type = str_field(obj, "filterType");

        let values = set_values(obj);
        let set_like = matches!(filter_type, None | Some("set") | Some("date"));
        if !values.is_empty() && set_like {
            return Ok(Some(ColumnFilter::Set { values }));
        }

        if filter_type == Some("date") {
            return date_from_raw(obj).map(|date| Some(ColumnFilter::Date(date)));
        }

        let Some(filter) = raw_text(obj.get("filter")) else {
            return Ok(None);
        };
        let condition = str_field(obj, "type").map(str::to_string);
        let numeric = filter_type == Some("number") || condition.as_deref() == Some("number");

        Ok(Some(if numeric {
            ColumnFilter::Number { condition, filter }
        } else {
            ColumnFilter::Text { condition, filter }
        }))
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn set_values(obj: &Map<String, Value>) -> Vec<String> {
    obj.get("values")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| raw_text(Some(item))).collect())
        .unwrap_or_default()
}

fn raw_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn date_from_raw(obj: &Map<String, Value>) -> Result<DateFilter, ValidationError> {
    let kind = str_field(obj, "type");
    let filter = str_field(obj, "filter");
    let date_from = str_field(obj, "dateFrom").filter(|text| !text.is_empty());
    let parse = |text: &str| parse_filter_date(text).ok_or(ValidationError::BadDate(text.to_string()));

    match (kind, filter, date_from) {
        (Some("equals"), _, Some(text)) => Ok(DateFilter::Equals(parse(text)?)),
        (_, Some("not_null"), _) => Ok(DateFilter::NotNull),
        (_, Some("is_null"), _) => Ok(DateFilter::IsNull),
        (Some("greaterThan"), _, Some(text)) => Ok(DateFilter::GreaterThan(parse(text)?)),
        (Some("lessThan"), _, Some(text)) => Ok(DateFilter::LessThan(parse(text)?)),
        _ => Err(ValidationError::UnsupportedDate {
            kind: kind.map(str::to_string),
            filter: filter.map(str::to_string),
        }),
    }
}

/// Per-column filters in the order the columns were first filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterModel {
    entries: Vec<(String, ColumnFilter)>,
}

impl FilterModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from the grid's raw filter object.
    ///
    /// Null entries are dropped and malformed entries are skipped, so one bad column
    /// never blocks the rest.
    pub fn from_raw(raw: &Value) -> Self {
        let mut model = Self::new();
        let Some(columns) = raw.as_object() else {
            if !raw.is_null() {
                debug!(shape = %value_kind(raw), "ignoring non-object filter model");
            }
            return model;
        };

        for (column, entry) in columns {
            if entry.is_null() {
                continue;
            }
            match ColumnFilter::from_raw(entry) {
                Ok(Some(filter)) => model.upsert(column.clone(), filter),
                Ok(None) => {}
                Err(err) => debug!(column = %column, error = %err, "skipping column filter"),
            }
        }
        model
    }

    /// Replaces the column's filter in place, or appends it for a new column.
    pub fn upsert(&mut self, column: impl Into<String>, filter: ColumnFilter) {
        let column = column.into();
        match self.entries.iter_mut().find(|(key, _)| *key == column) {
            Some((_, existing)) => *existing = filter,
            None => self.entries.push((column, filter)),
        }
    }

    pub fn remove(&mut self, column: &str) -> Option<ColumnFilter> {
        let idx = self.entries.iter().position(|(key, _)| key == column)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnFilter> {
        self.entries
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, filter)| filter)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnFilter)> {
        self.entries
            .iter()
            .map(|(key, filter)| (key.as_str(), filter))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_filter_collects_values() {
        let filter = ColumnFilter::from_raw(&json!({"filterType": "set", "values": ["NSW", "VIC"]}))
            .expect("set filter should validate");

        assert_eq!(
            filter,
            Some(ColumnFilter::Set {
                values: vec!["NSW".to_string(), "VIC".to_string()]
            })
        );
    }

    #[test]
    fn set_values_win_over_date_fields() {
        let filter = ColumnFilter::from_raw(&json!({
            "filterType": "date",
            "type": "equals",
            "dateFrom": "2024-03-05",
            "values": ["A"]
        }))
        .expect("mixed filter should validate");

        assert_eq!(
            filter,
            Some(ColumnFilter::Set {
                values: vec!["A".to_string()]
            })
        );
    }

    #[test]
    fn date_filters_follow_rule_order() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        let cases = [
            (
                json!({"filterType": "date", "type": "equals", "dateFrom": "2024-03-05 00:00:00"}),
                DateFilter::Equals(day),
            ),
            (
                json!({"filterType": "date", "type": "greaterThan", "filter": "not_null"}),
                DateFilter::NotNull,
            ),
            (json!({"filterType": "date", "filter": "is_null"}), DateFilter::IsNull),
            (
                json!({"filterType": "date", "type": "greaterThan", "dateFrom": "2024-03-05"}),
                DateFilter::GreaterThan(day),
            ),
            (
                json!({"filterType": "date", "type": "lessThan", "dateFrom": "2024-03-05"}),
                DateFilter::LessThan(day),
            ),
        ];

        for (raw, expected) in cases {
            let parsed = ColumnFilter::from_raw(&raw).expect("date filter should validate");
            assert_eq!(parsed, Some(ColumnFilter::Date(expected)), "raw: {raw}");
        }
    }

    #[test]
    fn date_filter_without_condition_is_rejected() {
        let err = ColumnFilter::from_raw(&json!({"filterType": "date", "type": "inRange"}))
            .expect_err("inRange is not supported");
        assert!(matches!(err, ValidationError::UnsupportedDate { .. }));

        let err = ColumnFilter::from_raw(&json!({
            "filterType": "date", "type": "equals", "dateFrom": "yesterday"
        }))
        .expect_err("bad date should fail");
        assert_eq!(err, ValidationError::BadDate("yesterday".to_string()));
    }

    #[test]
    fn number_filters_are_detected_from_either_type_field() {
        let by_filter_type =
            ColumnFilter::from_raw(&json!({"filterType": "number", "type": "equals", "filter": 42}))
                .expect("number filter should validate");
        assert_eq!(
            by_filter_type,
            Some(ColumnFilter::Number {
                condition: Some("equals".to_string()),
                filter: "42".to_string()
            })
        );

        let by_type = ColumnFilter::from_raw(&json!({"type": "number", "filter": "7"}))
            .expect("number filter should validate");
        assert!(matches!(by_type, Some(ColumnFilter::Number { .. })));
    }

    #[test]
    fn empty_text_filter_contributes_nothing() {
        let parsed = ColumnFilter::from_raw(&json!({"filterType": "text", "filter": ""}))
            .expect("empty text should validate");
        assert_eq!(parsed, None);
    }

    #[test]
    fn from_raw_keeps_key_order_and_skips_bad_entries() {
        let model = FilterModel::from_raw(&json!({
            "issue_title": {"filterType": "text", "type": "contains", "filter": "leak"},
            "issue_seimpact": null,
            "issue_raiseddate": {"filterType": "date", "type": "inRange"},
            "issue_statustext": {"filterType": "set", "values": ["Completed"]},
            "issue_reference": 12
        }));

        let keys: Vec<&str> = model.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["issue_title", "issue_statustext"]);
    }

    #[test]
    fn upsert_replaces_in_place_and_remove_drops() {
        let mut model = FilterModel::new();
        model.upsert("a", ColumnFilter::text("one"));
        model.upsert("b", ColumnFilter::text("two"));
        model.upsert("a", ColumnFilter::text("three"));

        let keys: Vec<&str> = model.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(model.get("a"), Some(&ColumnFilter::text("three")));

        assert!(model.remove("a").is_some());
        assert!(model.remove("a").is_none());
        assert_eq!(model.len(), 1);
    }
}
