use std::path::Path;

use crate::model::{Offering, OfferingKind, VendorRecord};

use super::blocks::{classify_lines, Block};
use super::sections::{cluster_sections, split_offerings, Section, HEADER};
use super::{
    flat_set_mut, unescape, ParseError, BASIC_INFORMATION, CONTACT_INFORMATION, LIST_LABELS, METADATA,
    PRODUCTS, SERVICES_OFFERED,
};

pub fn read_document(path: &Path) -> Result<VendorRecord, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&text)
}

/// Three passes: lines -> blocks -> sections -> record. Missing sections and
/// fields keep their defaults.
pub fn parse_document(text: &str) -> Result<VendorRecord, ParseError> {
    let blocks = classify_lines(text);
    let sections = cluster_sections(&blocks);

    let title = sections
        .iter()
        .filter(|s| s.kind == HEADER)
        .flat_map(|s| &s.blocks)
        .find_map(|b| match b {
            Block::Title(t) => Some(t.clone()),
            _ => None,
        });
    let has_basic = sections.iter().any(|s| s.kind == BASIC_INFORMATION);
    if title.is_none() && !has_basic {
        return Err(ParseError::NotAVendorDocument);
    }

    let mut record = VendorRecord::default();
    let mut saw_company_name = false;

    for section in &sections {
        match section.kind.as_str() {
            BASIC_INFORMATION => {
                for (label, value) in fields(section) {
                    let slot = match label {
                        "Vendor ID" => &mut record.vendor_id,
                        "Company Name" => {
                            saw_company_name = true;
                            &mut record.company_name
                        }
                        "Website" => &mut record.website,
                        "Domain" => &mut record.domain,
                        "Description" => &mut record.description,
                        "Title" => &mut record.title,
                        _ => continue,
                    };
                    *slot = value.to_string();
                }
            }
            CONTACT_INFORMATION => {
                for (label, value) in fields(section) {
                    record
                        .contact_info
                        .entry(unescape(label))
                        .or_insert_with(|| value.to_string());
                }
            }
            SERVICES_OFFERED => {
                record.services.extend(offerings(section, OfferingKind::Service));
            }
            PRODUCTS => {
                record.products.extend(offerings(section, OfferingKind::Product));
            }
            METADATA => {
                for (label, value) in fields(section) {
                    match label {
                        "Total Pages Scraped" => {
                            record.total_pages_scraped = value.trim().parse().unwrap_or(0)
                        }
                        "Scraped At" => record.scraped_at = value.to_string(),
                        "Last Updated" => record.last_updated = value.to_string(),
                        _ => {}
                    }
                }
            }
            other => {
                if let Some(set) = flat_set_mut(&mut record, other) {
                    set.extend(section.blocks.iter().filter_map(|b| match b {
                        Block::Item(v) => Some(v.clone()),
                        _ => None,
                    }));
                }
            }
        }
    }

    if !saw_company_name {
        record.company_name = title.unwrap_or_default();
    }
    Ok(record)
}

fn fields(section: &Section) -> impl Iterator<Item = (&str, &str)> {
    section.blocks.iter().filter_map(|b| match b {
        Block::Field { label, value } => Some((label.as_str(), value.as_str())),
        _ => None,
    })
}

fn offerings(section: &Section, kind: OfferingKind) -> Vec<Offering> {
    split_offerings(&section.blocks)
        .into_iter()
        .map(|(name, blocks)| offering(kind, name, &blocks))
        .collect()
}

fn offering(kind: OfferingKind, name: String, blocks: &[Block]) -> Offering {
    let mut o = Offering::new(kind, name);
    let mut list: Option<&'static str> = None;

    for block in blocks {
        match block {
            Block::Field { label, value } => {
                list = LIST_LABELS.iter().copied().find(|l| *l == label.as_str());
                if list.is_some() {
                    continue;
                }
                let value = value.clone();
                match label.as_str() {
                    "Category" => o.category = value,
                    "URL" => o.url = value,
                    "Description" => o.description = value,
                    "Pricing" => o.pricing = Some(value),
                    "Target Audience" => o.target_audience = value,
                    "Requirements" => o.requirements = value,
                    "Deployment" => o.deployment = value,
                    "Support" => o.support = value,
                    _ => {}
                }
            }
            Block::SubItem(item) | Block::Item(item) => {
                let target = match list {
                    Some("Features") => &mut o.features,
                    Some("Benefits") => &mut o.benefits,
                    Some("Use Cases") => &mut o.use_cases,
                    _ => continue,
                };
                target.push(item.clone());
            }
            _ => {}
        }
    }
    o
}
