use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::GridConfig;
use crate::domain::entities::row::GridRow;

/// Writes the displayed rows to `csv_path`, one column per projected field.
pub fn export_rows_to_csv(csv_path: &Path, grid: &GridConfig, rows: &[GridRow]) -> Result<usize> {
    let file = std::fs::File::create(csv_path)
        .with_context(|| format!("failed to create csv: {}", csv_path.display()))?;
    write_rows(file, grid, rows)
        .with_context(|| format!("failed to write csv: {}", csv_path.display()))
}

pub fn write_rows<W: Write>(writer: W, grid: &GridConfig, rows: &[GridRow]) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(grid.fields.iter().map(|field| grid.header_for(field)))
        .context("failed to write csv header")?;

    for grid_row in rows {
        writer
            .write_record(grid.fields.iter().map(|field| grid_row.row.display(field)))
            .context("failed to write csv record")?;
    }

    writer.flush().context("failed to flush csv")?;
    Ok(rows.len())
}
