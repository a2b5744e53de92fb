use std::fmt::Write;

use crate::model::{Offering, VendorRecord};

use super::{
    escape, escape_label, flat_set, BASIC_INFORMATION, CONTACT_INFORMATION, FLAT_SECTIONS, FOOTER, METADATA,
    PRODUCTS, SERVICES_OFFERED,
};

/// Serialize a record into its canonical document.
pub fn render_document(record: &VendorRecord) -> String {
    let mut md = String::new();
    line(&mut md, &format!("# {}", escape(&record.company_name)));
    md.push('\n');

    section(&mut md, BASIC_INFORMATION);
    field(&mut md, "Vendor ID", &record.vendor_id);
    field(&mut md, "Company Name", &record.company_name);
    field(&mut md, "Website", &record.website);
    field(&mut md, "Domain", &record.domain);
    field(&mut md, "Description", &record.description);
    field(&mut md, "Title", &record.title);
    md.push('\n');

    if !record.contact_info.is_empty() {
        section(&mut md, CONTACT_INFORMATION);
        for (key, value) in &record.contact_info {
            field(&mut md, &escape_label(key), value);
        }
        md.push('\n');
    }

    for (name, offerings) in [
        (SERVICES_OFFERED, &record.services),
        (PRODUCTS, &record.products),
    ] {
        if offerings.is_empty() {
            continue;
        }
        section(&mut md, name);
        for (i, o) in offerings.iter().enumerate() {
            offering(&mut md, i + 1, o);
        }
    }

    for name in FLAT_SECTIONS {
        let Some(items) = flat_set(record, name) else {
            continue;
        };
        if items.is_empty() {
            continue;
        }
        section(&mut md, name);
        for item in items {
            line(&mut md, &format!("- {}", escape(item)));
        }
        md.push('\n');
    }

    section(&mut md, METADATA);
    field(&mut md, "Total Pages Scraped", &record.total_pages_scraped.to_string());
    field(&mut md, "Scraped At", &record.scraped_at);
    field(&mut md, "Last Updated", &record.last_updated);
    md.push('\n');

    line(&mut md, "---");
    line(&mut md, FOOTER);
    md
}

fn offering(md: &mut String, ordinal: usize, o: &Offering) {
    line(md, &format!("### {}. {}", ordinal, escape(&o.name)));
    field(md, "Category", &o.category);
    field(md, "URL", &o.url);
    field(md, "Description", &o.description);
    if let Some(p) = &o.pricing {
        field(md, "Pricing", p);
    }
    for (label, value) in [
        ("Target Audience", &o.target_audience),
        ("Requirements", &o.requirements),
        ("Deployment", &o.deployment),
        ("Support", &o.support),
    ] {
        if !value.is_empty() {
            field(md, label, value);
        }
    }
    for (label, items) in [
        ("Features", &o.features),
        ("Benefits", &o.benefits),
        ("Use Cases", &o.use_cases),
    ] {
        if items.is_empty() {
            continue;
        }
        line(md, &format!("- **{}**:", label));
        for item in items {
            line(md, &format!("  - {}", escape(item)));
        }
    }
    md.push('\n');
}

fn section(md: &mut String, name: &str) {
    line(md, &format!("## {}", name));
    md.push('\n');
}

fn field(md: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        line(md, &format!("- **{}**:", label));
    } else {
        line(md, &format!("- **{}**: {}", label, escape(value)));
    }
}

fn line(md: &mut String, text: &str) {
    let _ = writeln!(md, "{}", text);
}
