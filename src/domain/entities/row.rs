use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::domain::date_codec;

/// Client-local identity of a displayed row, stable until the next fetch replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Json(Value),
}

impl CellValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::String(text) => CellValue::Text(text),
            Value::Bool(flag) => CellValue::Bool(flag),
            Value::Number(number) => number
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(number.to_string())),
            other => CellValue::Json(other),
        }
    }

    /// Dates are written back in the codec's text form.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Text(text) => Value::String(text.clone()),
            CellValue::Number(number) => serde_json::Number::from_f64(*number)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Bool(flag) => Value::Bool(*flag),
            CellValue::Date(date) => Value::String(date_codec::encode(*date)),
            CellValue::Json(value) => value.clone(),
        }
    }

    /// Text shown in a grid cell or written to an export.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                format!("{}", *number as i64)
            }
            CellValue::Number(number) => number.to_string(),
            CellValue::Bool(flag) => flag.to_string(),
            CellValue::Date(date) => date_codec::encode(*date),
            CellValue::Json(value) => value.to_string(),
        }
    }
}

/// One issue record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub id: Option<i64>,
    pub cells: BTreeMap<String, CellValue>,
}

impl Row {
    pub fn from_json(object: Map<String, Value>) -> Self {
        let id = object.get("id").and_then(parse_id);
        let cells = object
            .into_iter()
            .map(|(name, value)| (name, CellValue::from_json(value)))
            .collect();
        Self { id, cells }
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: CellValue) {
        self.cells.insert(field.into(), value);
    }

    pub fn display(&self, field: &str) -> String {
        self.get(field).map(CellValue::display).unwrap_or_default()
    }

    pub fn to_json(&self) -> Value {
        let mut object: Map<String, Value> = self
            .cells
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        if let Some(id) = self.id {
            object.insert("id".to_string(), Value::from(id));
        }
        Value::Object(object)
    }
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// A row as held by the grid, tagged with its local identity.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub key: RowKey,
    pub row: Row,
}

/// Values entered in the add/edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowDraft {
    pub id: Option<i64>,
    pub fields: BTreeMap<String, String>,
}

impl RowDraft {
    pub fn from_row(row: &Row, editable: &[String]) -> Self {
        let fields = editable
            .iter()
            .map(|field| (field.clone(), row.display(field)))
            .collect();
        Self { id: row.id, fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_reads_numeric_or_text_id() {
        let Value::Object(numeric) = json!({"id": 7, "issue_title": "Leak"}) else {
            unreachable!()
        };
        let Value::Object(text) = json!({"id": "12", "issue_title": "Leak"}) else {
            unreachable!()
        };

        assert_eq!(Row::from_json(numeric).id, Some(7));
        assert_eq!(Row::from_json(text).id, Some(12));
    }

    #[test]
    fn display_formats_cells_for_the_grid() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        assert_eq!(CellValue::Date(date).display(), "05/03/2024");
        assert_eq!(CellValue::Number(42.0).display(), "42");
        assert_eq!(CellValue::Number(1.5).display(), "1.5");
        assert_eq!(CellValue::Null.display(), "");
    }
}
