use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::GridConfig;
use crate::domain::entities::row::GridRow;
use crate::infra::export::csv::export_rows_to_csv;

pub struct ExportService {
    grid: Arc<GridConfig>,
}

impl ExportService {
    pub fn new(grid: Arc<GridConfig>) -> Self {
        Self { grid }
    }

    pub fn export_csv(&self, path: &Path, rows: &[GridRow]) -> Result<usize> {
        let written = export_rows_to_csv(path, &self.grid, rows)?;
        info!(rows = written, path = %path.display(), "exported grid to csv");
        Ok(written)
    }
}

/// `issues-YYYYMMDD.csv` in `dir`.
pub fn default_export_path(dir: &Path, today: chrono::NaiveDate) -> PathBuf {
    dir.join(format!("issues-{}.csv", today.format("%Y%m%d")))
}
