use serde::{Deserialize, Serialize};

use crate::domain::entities::criteria::SortDirection;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortModelEntry {
    pub col_id: String,
    pub sort: SortDirection,
}

impl SortModelEntry {
    pub fn new(col_id: impl Into<String>, sort: SortDirection) -> Self {
        Self {
            col_id: col_id.into(),
            sort,
        }
    }
}

/// Active column sorts, highest precedence first.
pub type SortModel = Vec<SortModelEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_the_grid_sort_model_shape() {
        let model: SortModel = serde_json::from_value(serde_json::json!([
            {"colId": "issue_title", "sort": "desc"},
            {"colId": "issue_reference", "sort": "asc"}
        ]))
        .expect("sort model should deserialize");

        assert_eq!(
            model,
            vec![
                SortModelEntry::new("issue_title", SortDirection::Desc),
                SortModelEntry::new("issue_reference", SortDirection::Asc),
            ]
        );
    }
}
