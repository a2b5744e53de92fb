use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Tables reported by `get_stats`, in display order.
pub const STAT_TABLES: &[&str] = &[
    "vendors",
    "services",
    "products",
    "service_features",
    "product_features",
    "technology_stack",
    "industries",
    "geographic_presence",
    "integrations",
    "certifications",
    "pricing_info",
];

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

/// Execute a generated import script in one transaction.
pub fn apply_script(conn: &Connection, sql: &str) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql).context("Failed to apply SQL script")?;
    tx.commit()?;
    Ok(())
}

pub fn load_script(conn: &Connection, path: &Path) -> Result<()> {
    let sql = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    apply_script(conn, &sql)
}

pub struct OverviewRow {
    pub vendor_id: String,
    pub company_name: String,
    pub domain: String,
    pub services: usize,
    pub products: usize,
    pub pages: usize,
    pub email: String,
}

pub fn fetch_overview(conn: &Connection, limit: usize) -> Result<Vec<OverviewRow>> {
    let sql = format!(
        "SELECT v.vendor_id, COALESCE(v.company_name,''), COALESCE(v.domain,''),
                (SELECT COUNT(*) FROM services s WHERE s.vendor_id = v.vendor_id),
                (SELECT COUNT(*) FROM products p WHERE p.vendor_id = v.vendor_id),
                COALESCE(v.total_pages_scraped, 0), COALESCE(v.contact_email,'')
         FROM vendors v
         ORDER BY v.company_name COLLATE NOCASE, v.vendor_id
         LIMIT {}",
        limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(OverviewRow {
                vendor_id: row.get(0)?,
                company_name: row.get(1)?,
                domain: row.get(2)?,
                services: row.get(3)?,
                products: row.get(4)?,
                pages: row.get(5)?,
                email: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct Stats {
    pub counts: Vec<(&'static str, usize)>,
}

/// Row count per table; tables missing from the database count as zero.
pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let mut counts = Vec::with_capacity(STAT_TABLES.len());
    for table in STAT_TABLES {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |r| r.get(0),
        )?;
        let n: usize = if exists {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?
        } else {
            0
        };
        counts.push((*table, n));
    }
    Ok(Stats { counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::read_document;
    use crate::export::relational::render_sql;
    use crate::export::tables::build_tables;

    fn loaded() -> Connection {
        let record = read_document(Path::new("tests/fixtures/acme_cloud.md")).unwrap();
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        apply_script(&conn, &render_sql(&build_tables(&[record]))).unwrap();
        conn
    }

    #[test]
    fn overview_counts_offerings() {
        let conn = loaded();
        let rows = fetch_overview(&conn, 10).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.vendor_id, "acme_cloud");
        assert_eq!((r.services, r.products, r.pages), (2, 1, 4));
        assert_eq!(r.email, "sales@acme.example");
    }

    #[test]
    fn stats_per_table() {
        let conn = loaded();
        let stats = get_stats(&conn).unwrap();
        let get = |name: &str| stats.counts.iter().find(|(t, _)| *t == name).unwrap().1;
        assert_eq!(get("vendors"), 1);
        assert_eq!(get("services"), 2);
        assert_eq!(get("technology_stack"), 2);
        assert_eq!(get("certifications"), 0);
    }

    #[test]
    fn stats_on_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        let stats = get_stats(&conn).unwrap();
        assert!(stats.counts.iter().all(|(_, n)| *n == 0));
    }

    #[test]
    fn connect_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/vendors.sqlite");
        connect(&path).unwrap();
        assert!(path.exists());
    }
}
