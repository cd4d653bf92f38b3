use crate::domain::entities::criteria::SortEntry;
use crate::domain::entities::sort_model::SortModelEntry;

/// Order-preserving: the first entry is the primary sort key.
pub fn translate_sorts(model: &[SortModelEntry]) -> Vec<SortEntry> {
    model
        .iter()
        .map(|entry| SortEntry {
            name: entry.col_id.clone(),
            direction: entry.sort,
        })
        .collect()
}
