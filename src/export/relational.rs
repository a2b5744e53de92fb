use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use super::tables::{Cell, Table};

pub const SQL_FILE: &str = "vendors_database.sql";

pub fn write_sql(tables: &[Table], out_dir: &Path) -> Result<PathBuf> {
    let path = out_dir.join(SQL_FILE);
    std::fs::write(&path, render_sql(tables)).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// SQLite-compatible import script: header comment, schema, then one INSERT per row.
pub fn render_sql(tables: &[Table]) -> String {
    let mut sql = String::new();
    sql.push_str("-- Vendor Database SQL Import Script\n");
    let _ = writeln!(sql, "-- Generated on: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));

    sql.push_str("-- Create tables\n");
    for table in tables {
        sql.push_str(&create_table(table));
        sql.push('\n');
    }

    sql.push_str("-- Insert vendor data\n");
    for table in tables {
        let columns: Vec<&str> = table.columns.iter().map(|c| c.name).collect();
        let columns = columns.join(", ");
        for row in &table.rows {
            let values: Vec<String> = row.iter().map(literal).collect();
            let _ = writeln!(sql, "INSERT INTO {} ({}) VALUES ({});", table.name, columns, values.join(", "));
        }
    }
    sql
}

fn create_table(table: &Table) -> String {
    let mut defs: Vec<String> = Vec::with_capacity(table.columns.len() + 2);
    if table.is_child {
        defs.push("id INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
    }
    for c in table.columns {
        if table.is_child && c.name == "vendor_id" {
            defs.push("vendor_id TEXT NOT NULL".to_string());
        } else {
            defs.push(format!("{} {}", c.name, c.sql_type));
        }
    }
    if table.is_child {
        defs.push("FOREIGN KEY (vendor_id) REFERENCES vendors(vendor_id)".to_string());
    }
    format!("CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n", table.name, defs.join(",\n    "))
}

fn literal(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Cell::Int(n) => n.to_string(),
        Cell::Null => "NULL".to_string(),
    }
}
