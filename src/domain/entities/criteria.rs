use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Comparison {
    InList,
    EqualTo,
    GreaterThan,
    LessThan,
    IsNull,
    IsNotNull,
    TextIsLike,
    NumberEquals,
}

impl Comparison {
    pub fn takes_value(self) -> bool {
        !matches!(self, Comparison::IsNull | Comparison::IsNotNull)
    }
}

/// One backend filter clause.
///
/// The constructors keep `value1` present exactly when the comparison needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterEntry {
    pub name: String,
    pub comparison: Comparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value1: Option<String>,
}

impl FilterEntry {
    pub fn with_value(
        name: impl Into<String>,
        comparison: Comparison,
        value: impl Into<String>,
    ) -> Self {
        debug_assert!(comparison.takes_value());
        Self {
            name: name.into(),
            comparison,
            value1: Some(value.into()),
        }
    }

    pub fn is_null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparison: Comparison::IsNull,
            value1: None,
        }
    }

    pub fn is_not_null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comparison: Comparison::IsNotNull,
            value1: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortEntry {
    pub name: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
}

/// Row window sent with every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageOptions {
    #[serde(rename = "rf")]
    pub response_format: ResponseFormat,
    #[serde(rename = "startrow")]
    pub start_row: u64,
    #[serde(rename = "rows")]
    pub row_count: u32,
}

/// Full `ISSUE_SEARCH` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    #[serde(serialize_with = "serialize_named")]
    pub fields: Vec<String>,
    #[serde(serialize_with = "serialize_named")]
    pub summary_fields: Vec<String>,
    pub filters: Vec<FilterEntry>,
    pub sorts: Vec<SortEntry>,
    pub options: PageOptions,
}

#[derive(Serialize)]
struct NamedField<'a> {
    name: &'a str,
}

// The backend expects projections as `[{"name": "..."}]`.
fn serialize_named<S>(names: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(names.iter().map(|name| NamedField { name }))
}
