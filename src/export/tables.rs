//! Flat table view of vendor records, shared by the CSV and SQL writers.

use std::collections::BTreeSet;

use crate::model::{Offering, VendorRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Null,
}

impl Cell {
    /// CSV rendering: `Null` is an empty field.
    pub fn as_field(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Null => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<&String> for Cell {
    fn from(s: &String) -> Self {
        Cell::Text(s.clone())
    }
}

impl From<Option<&String>> for Cell {
    fn from(s: Option<&String>) -> Self {
        s.map_or(Cell::Null, Cell::from)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

const fn text(name: &'static str) -> Column {
    Column { name, sql_type: "TEXT" }
}

pub struct Table {
    pub name: &'static str,
    /// Child tables carry a surrogate id and a foreign key to `vendors`.
    pub is_child: bool,
    pub columns: &'static [Column],
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(name: &'static str, is_child: bool, columns: &'static [Column]) -> Self {
        Table {
            name,
            is_child,
            columns,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width for {}", self.name);
        self.rows.push(row);
    }
}

const VENDORS: &[Column] = &[
    Column {
        name: "vendor_id",
        sql_type: "TEXT PRIMARY KEY",
    },
    Column {
        name: "company_name",
        sql_type: "TEXT NOT NULL",
    },
    text("website"),
    text("domain"),
    text("description"),
    text("title"),
    text("contact_email"),
    text("contact_phone"),
    Column {
        name: "total_pages_scraped",
        sql_type: "INTEGER DEFAULT 0",
    },
    text("scraped_at"),
    text("last_updated"),
];

const SERVICES: &[Column] = &[
    text("vendor_id"),
    text("service_name"),
    text("category"),
    text("description"),
    text("url"),
    text("pricing"),
];

const PRODUCTS: &[Column] = &[
    text("vendor_id"),
    text("product_name"),
    text("category"),
    text("description"),
    text("url"),
    text("pricing"),
    text("target_audience"),
    text("requirements"),
    text("deployment"),
    text("support"),
];

const SERVICE_FEATURES: &[Column] = &[text("vendor_id"), text("service_name"), text("feature")];
const SERVICE_BENEFITS: &[Column] = &[text("vendor_id"), text("service_name"), text("benefit")];
const SERVICE_USE_CASES: &[Column] = &[text("vendor_id"), text("service_name"), text("use_case")];
const PRODUCT_FEATURES: &[Column] = &[text("vendor_id"), text("product_name"), text("feature")];
const PRODUCT_BENEFITS: &[Column] = &[text("vendor_id"), text("product_name"), text("benefit")];
const PRODUCT_USE_CASES: &[Column] = &[text("vendor_id"), text("product_name"), text("use_case")];

const TECHNOLOGY_STACK: &[Column] = &[text("vendor_id"), text("technology")];
const INDUSTRIES: &[Column] = &[text("vendor_id"), text("industry")];
const GEOGRAPHIC_PRESENCE: &[Column] = &[text("vendor_id"), text("region")];
const GENERAL_FEATURES: &[Column] = &[text("vendor_id"), text("feature")];
const GENERAL_BENEFITS: &[Column] = &[text("vendor_id"), text("benefit")];
const GENERAL_USE_CASES: &[Column] = &[text("vendor_id"), text("use_case")];
const INTEGRATIONS: &[Column] = &[text("vendor_id"), text("integration")];
const CERTIFICATIONS: &[Column] = &[text("vendor_id"), text("certification")];
const PRICING_INFO: &[Column] = &[text("vendor_id"), text("price")];

/// Every table, `vendors` first, in a fixed order.
pub fn build_tables(records: &[VendorRecord]) -> Vec<Table> {
    let mut vendors = Table::new("vendors", false, VENDORS);
    let mut services = Table::new("services", true, SERVICES);
    let mut products = Table::new("products", true, PRODUCTS);
    let mut service_lists = [
        Table::new("service_features", true, SERVICE_FEATURES),
        Table::new("service_benefits", true, SERVICE_BENEFITS),
        Table::new("service_use_cases", true, SERVICE_USE_CASES),
    ];
    let mut product_lists = [
        Table::new("product_features", true, PRODUCT_FEATURES),
        Table::new("product_benefits", true, PRODUCT_BENEFITS),
        Table::new("product_use_cases", true, PRODUCT_USE_CASES),
    ];
    let mut flat = [
        Table::new("technology_stack", true, TECHNOLOGY_STACK),
        Table::new("industries", true, INDUSTRIES),
        Table::new("geographic_presence", true, GEOGRAPHIC_PRESENCE),
        Table::new("general_features", true, GENERAL_FEATURES),
        Table::new("general_benefits", true, GENERAL_BENEFITS),
        Table::new("general_use_cases", true, GENERAL_USE_CASES),
        Table::new("integrations", true, INTEGRATIONS),
        Table::new("certifications", true, CERTIFICATIONS),
        Table::new("pricing_info", true, PRICING_INFO),
    ];

    for r in records {
        let id = Cell::from(&r.vendor_id);
        vendors.push(vec![
            id.clone(),
            Cell::from(&r.company_name),
            Cell::from(&r.website),
            Cell::from(&r.domain),
            Cell::from(&r.description),
            Cell::from(&r.title),
            Cell::from(r.contact_info.get("email")),
            Cell::from(r.contact_info.get("phone")),
            Cell::Int(i64::from(r.total_pages_scraped)),
            Cell::from(&r.scraped_at),
            Cell::from(&r.last_updated),
        ]);

        for s in &r.services {
            services.push(vec![
                id.clone(),
                Cell::from(&s.name),
                Cell::from(&s.category),
                Cell::from(&s.description),
                Cell::from(&s.url),
                Cell::from(s.pricing.as_ref()),
            ]);
            push_item_lists(&mut service_lists, &id, s);
        }

        for p in &r.products {
            products.push(vec![
                id.clone(),
                Cell::from(&p.name),
                Cell::from(&p.category),
                Cell::from(&p.description),
                Cell::from(&p.url),
                Cell::from(p.pricing.as_ref()),
                Cell::from(&p.target_audience),
                Cell::from(&p.requirements),
                Cell::from(&p.deployment),
                Cell::from(&p.support),
            ]);
            push_item_lists(&mut product_lists, &id, p);
        }

        let sets: [&BTreeSet<String>; 9] = [
            &r.technology_stack,
            &r.industry_focus,
            &r.geographic_presence,
            &r.features,
            &r.benefits,
            &r.use_cases,
            &r.integrations,
            &r.certifications,
            &r.pricing_info,
        ];
        for (table, set) in flat.iter_mut().zip(sets) {
            for item in set {
                table.push(vec![id.clone(), Cell::from(item)]);
            }
        }
    }

    let mut tables = vec![vendors, services, products];
    tables.extend(service_lists);
    tables.extend(product_lists);
    tables.extend(flat);
    tables
}

fn push_item_lists(tables: &mut [Table; 3], id: &Cell, o: &Offering) {
    let lists = [&o.features, &o.benefits, &o.use_cases];
    for (table, items) in tables.iter_mut().zip(lists) {
        for item in items {
            table.push(vec![id.clone(), Cell::from(&o.name), Cell::from(item)]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::read_document;

    fn fixture() -> VendorRecord {
        read_document(std::path::Path::new("tests/fixtures/acme_cloud.md")).unwrap()
    }

    fn table<'a>(tables: &'a [Table], name: &str) -> &'a Table {
        tables.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn one_row_per_fact() {
        let tables = build_tables(&[fixture()]);
        assert_eq!(tables.len(), 18);
        assert_eq!(tables[0].name, "vendors");

        let vendors = table(&tables, "vendors");
        assert_eq!(vendors.rows.len(), 1);
        assert_eq!(vendors.rows[0][6], Cell::from("sales@acme.example"));
        assert_eq!(vendors.rows[0][8], Cell::Int(4));

        let services = table(&tables, "services");
        assert_eq!(services.rows.len(), 2);
        assert_eq!(services.rows[0][5], Cell::from("$1,200 per month"));
        assert_eq!(services.rows[1][5], Cell::Null);

        assert_eq!(table(&tables, "service_features").rows.len(), 2);
        assert_eq!(table(&tables, "service_benefits").rows.len(), 1);
        assert_eq!(table(&tables, "product_features").rows.len(), 1);
        assert_eq!(table(&tables, "technology_stack").rows.len(), 2);
        assert_eq!(table(&tables, "geographic_presence").rows[0][1], Cell::from("Finland"));
        assert_eq!(table(&tables, "pricing_info").rows.len(), 2);
        assert!(table(&tables, "certifications").rows.is_empty());

        let products = table(&tables, "products");
        assert_eq!(products.rows[0][9], Cell::from("Business hours, phone and email"));
    }

    #[test]
    fn every_row_matches_its_columns() {
        for t in build_tables(&[fixture()]) {
            for row in &t.rows {
                assert_eq!(row.len(), t.columns.len(), "{}", t.name);
            }
            assert_eq!(t.is_child, t.name != "vendors");
        }
    }
}
