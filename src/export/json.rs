use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::VendorRecord;

pub const JSON_FILE: &str = "vendors_database.json";

/// All records as one pretty-printed JSON array.
pub fn write_json(records: &[VendorRecord], out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(JSON_FILE);
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::read_document;

    #[test]
    fn array_of_records() {
        let record = read_document(Path::new("tests/fixtures/acme_cloud.md")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_json(&[record.clone()], dir.path()).unwrap();

        let back: Vec<VendorRecord> = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(back, vec![record]);
    }
}
