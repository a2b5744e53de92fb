use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::tables::Table;

/// One `<table>.csv` per table, header row first.
pub fn write_csv(tables: &[Table], out_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(tables.len());
    for table in tables {
        let path = out_dir.join(format!("{}.csv", table.name));
        let mut wtr = csv::Writer::from_path(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record(table.columns.iter().map(|c| c.name))?;
        for row in &table.rows {
            wtr.write_record(row.iter().map(|c| c.as_field()))?;
        }
        wtr.flush()?;
        paths.push(path);
    }
    Ok(paths)
}
