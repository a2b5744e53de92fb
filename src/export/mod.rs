//! Batch conversion of canonical documents into JSON, CSV tables and a SQL script.

pub mod json;
pub mod relational;
pub mod tables;
pub mod tabular;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::document::read_document;
use crate::model::VendorRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    All,
    Json,
    Csv,
    Sql,
}

impl ExportFormat {
    fn includes(self, other: ExportFormat) -> bool {
        self == ExportFormat::All || self == other
    }
}

/// Files that are themselves export artifacts, never vendor documents.
const SKIPPED_PREFIXES: &[&str] = &["master_", "database_", crate::research::SUMMARY_PREFIX];

/// Parse every `*.md` document in `dir`, sorted by file name. Unreadable documents are
/// skipped with a warning; for a repeated vendor_id the first document wins.
pub fn load_documents(dir: &Path) -> Result<Vec<VendorRecord>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_vendor_document(p))
        .collect();
    paths.sort();

    let parsed: Vec<_> = paths
        .par_iter()
        .map(|p| (p, read_document(p)))
        .collect();

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(parsed.len());
    for (path, result) in parsed {
        match result {
            Ok(record) => {
                if seen.insert(record.vendor_id.clone()) {
                    records.push(record);
                } else {
                    warn!("Skipping {}: duplicate vendor_id {}", path.display(), record.vendor_id);
                }
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }
    info!("Loaded {} vendor documents from {}", records.len(), dir.display());
    Ok(records)
}

fn is_vendor_document(path: &Path) -> bool {
    let is_md = path.extension().is_some_and(|e| e == "md");
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    is_md && !SKIPPED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Write the requested formats into `out_dir`; returns every file written.
pub fn export_records(records: &[VendorRecord], out_dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    if format.includes(ExportFormat::Json) {
        written.push(json::write_json(records, out_dir)?);
    }
    if format.includes(ExportFormat::Csv) || format.includes(ExportFormat::Sql) {
        let tables = tables::build_tables(records);
        if format.includes(ExportFormat::Csv) {
            written.extend(tabular::write_csv(&tables, out_dir)?);
        }
        if format.includes(ExportFormat::Sql) {
            written.push(relational::write_sql(&tables, out_dir)?);
        }
    }
    info!("Exported {} vendors to {} files", records.len(), written.len());
    Ok(written)
}
