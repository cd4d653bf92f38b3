use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::GridConfig;
use crate::domain::date_codec;
use crate::domain::entities::criteria::PageOptions;
use crate::domain::entities::filter_model::{value_kind, FilterModel};
use crate::domain::entities::row::{CellValue, Row};
use crate::domain::entities::sort_model::SortModelEntry;
use crate::usecase::criteria::build_criteria;
use crate::usecase::ports::transport::{QueryTransport, RawResponse, TransportError};

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("failed to encode criteria: {0}")]
    Encode(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("unexpected status {status}: {body_preview}")]
    Status { status: u16, body_preview: String },

    #[error("response body is not JSON: {body_preview}")]
    NotJson { body_preview: String },

    #[error("response has no data envelope (got {shape})")]
    MissingEnvelope { shape: String },

    #[error("response has no data.rows collection (data was {shape})")]
    MissingRows { shape: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub total_count: u64,
}

/// Runs one issue search: criteria in, decoded rows and total count out.
pub struct QueryService {
    transport: Arc<dyn QueryTransport>,
    grid: Arc<GridConfig>,
}

impl QueryService {
    pub fn new(transport: Arc<dyn QueryTransport>, grid: Arc<GridConfig>) -> Self {
        Self { transport, grid }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub async fn execute(
        &self,
        fields: &[String],
        filter_model: &FilterModel,
        sort_model: &[SortModelEntry],
        options: PageOptions,
    ) -> Result<QueryResult, FetchError> {
        let criteria = build_criteria(
            fields,
            &self.grid.summary_fields,
            filter_model,
            sort_model,
            options,
        );
        let criteria_json =
            serde_json::to_string(&criteria).map_err(|err| FetchError::Encode(err.to_string()))?;

        debug!(
            filters = criteria.filters.len(),
            sorts = criteria.sorts.len(),
            start_row = options.start_row,
            row_count = options.row_count,
            "issuing issue search"
        );

        let response = self
            .transport
            .post_criteria(criteria_json)
            .await
            .inspect_err(|err| error!(error = %err, "issue search request failed"))?;
        let result = parse_response(&response, &self.grid.date_field, &self.grid.count_key);
        match &result {
            Ok(result) => debug!(
                rows = result.rows.len(),
                total_count = result.total_count,
                "issue search returned"
            ),
            Err(err) => error!(status = response.status, error = %err, "invalid issue search response"),
        }
        result
    }
}

/// Validates the response envelope and decodes its rows.
pub fn parse_response(
    response: &RawResponse,
    date_field: &str,
    count_key: &str,
) -> Result<QueryResult, FetchError> {
    if !response.is_success() {
        return Err(FetchError::Status {
            status: response.status,
            body_preview: preview(&response.body),
        });
    }

    let envelope: Value = serde_json::from_str(&response.body).map_err(|_| FetchError::NotJson {
        body_preview: preview(&response.body),
    })?;

    let data = envelope
        .get("data")
        .filter(|data| data.is_object())
        .ok_or_else(|| FetchError::MissingEnvelope {
            shape: describe_shape(&envelope),
        })?;

    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::MissingRows {
            shape: describe_shape(data),
        })?;

    let total_count = envelope
        .get("summary")
        .and_then(|summary| summary.get(count_key))
        .map(parse_count)
        .unwrap_or(0);

    let rows = rows
        .iter()
        .filter_map(|item| match item {
            Value::Object(object) => Some(decode_row(Row::from_json(object.clone()), date_field)),
            other => {
                warn!(shape = %value_kind(other), "skipping non-object row");
                None
            }
        })
        .collect();

    Ok(QueryResult { rows, total_count })
}

/// Replaces the backend's date text with a date, or null when it cannot be read.
pub fn decode_row(mut row: Row, date_field: &str) -> Row {
    let decoded = match row.get(date_field) {
        None => None,
        Some(CellValue::Text(text)) if !text.trim().is_empty() => match date_codec::decode(text) {
            Ok(date) => Some(CellValue::Date(date)),
            Err(err) => {
                warn!(field = date_field, id = ?row.id, error = %err, "unreadable date, clearing");
                Some(CellValue::Null)
            }
        },
        Some(_) => Some(CellValue::Null),
    };
    if let Some(value) = decoded {
        row.set(date_field, value);
    }
    row
}

fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
            .unwrap_or(0),
        Value::String(text) => text.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn describe_shape(value: &Value) -> String {
    match value {
        Value::Object(object) => {
            let keys: Vec<&str> = object.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        other => value_kind(other).to_string(),
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
