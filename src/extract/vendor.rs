//! Vendor-level facts gathered across every page of one vendor.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::html::PageContent;
use crate::model::{dedup_items, domain_of, VendorRecord};
use crate::rules::CompiledRules;

use super::{collect_items, contains_token, links, title_case};

/// Seed title without a trailing "- Home/About/Services/Contact…"; falls back to the
/// domain without its `.com`/`.fi` suffix, title-cased.
pub fn company_name(rules: &CompiledRules, title: &str, url: &str) -> String {
    let cleaned = rules.company_suffix.replace(title, "");
    let cleaned = cleaned.trim();
    if !cleaned.is_empty() {
        return cleaned.to_string();
    }
    let domain = domain_of(url);
    let bare = domain
        .strip_suffix(".com")
        .or_else(|| domain.strip_suffix(".fi"))
        .unwrap_or(&domain);
    title_case(bare)
}

/// Service keywords mentioned anywhere in the text, in keyword order.
pub fn mentioned_services(rules: &CompiledRules, text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    rules
        .mentioned_service_keywords
        .iter()
        .filter(|k| contains_token(&lower, &k.to_lowercase()))
        .map(|k| title_case(k))
        .collect()
}

/// Fill every vendor-level field of `record` from the vendor's pages (seed first).
pub fn apply_vendor_facts(record: &mut VendorRecord, rules: &CompiledRules, pages: &[PageContent]) {
    record.contact_info = contact_info(rules, pages);
    record.technology_stack = technology_stack(rules, pages);
    record.industry_focus = industry_focus(rules, &record.description, &record.title, pages);
    record.geographic_presence = geographic_presence(rules, pages);
    record.pricing_info = price_points(rules, pages);
    record.features = general_list(rules, &rules.general_features, pages, rules.general_list_cap);
    record.benefits = general_list(rules, &rules.general_benefits, pages, rules.general_list_cap);
    record.use_cases = general_list(rules, &rules.general_use_cases, pages, rules.general_list_cap);
    record.integrations = general_list(rules, &rules.integrations, pages, rules.integration_cap);
    record.certifications = general_list(rules, &rules.certifications, pages, rules.integration_cap);
}

/// First email, first phone and first profile link per social platform; earlier pages win.
pub fn contact_info(rules: &CompiledRules, pages: &[PageContent]) -> BTreeMap<String, String> {
    let mut contacts = BTreeMap::new();
    for page in pages {
        if !contacts.contains_key("email") {
            if let Some(m) = rules.email.find(&page.text) {
                contacts.insert("email".to_string(), m.as_str().to_string());
            }
        }
        if !contacts.contains_key("phone") {
            if let Some(caps) = rules.phone.captures(&page.text) {
                let phone: String = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
                let phone = if phone.is_empty() {
                    caps[0].to_string()
                } else {
                    phone
                };
                contacts.insert("phone".to_string(), phone);
            }
        }
        for (platform, url) in links::social_profiles(&page.links) {
            contacts.entry(platform).or_insert(url);
        }
    }
    contacts
}

/// Technology keywords appearing as whole tokens ("go" does not match "google").
pub fn technology_stack(rules: &CompiledRules, pages: &[PageContent]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for page in pages {
        let lower = page.text.to_lowercase();
        for tech in &rules.technology_keywords {
            if contains_token(&lower, &tech.to_lowercase()) {
                found.insert(title_case(tech));
            }
        }
    }
    found
}

pub fn industry_focus(
    rules: &CompiledRules,
    description: &str,
    title: &str,
    pages: &[PageContent],
) -> BTreeSet<String> {
    let mut all = format!("{} {}", description, title);
    for page in pages {
        all.push(' ');
        all.push_str(&page.text);
    }
    let lower = all.to_lowercase();
    rules
        .industry_keywords
        .iter()
        .filter(|k| lower.contains(&k.to_lowercase()))
        .map(|k| title_case(k))
        .collect()
}

/// Regions from language path markers; the first marker in a URL wins.
pub fn geographic_presence(rules: &CompiledRules, pages: &[PageContent]) -> BTreeSet<String> {
    pages
        .iter()
        .filter_map(|page| {
            rules
                .geo_markers
                .iter()
                .find(|m| page.url.contains(&m.path))
                .map(|m| m.region.clone())
        })
        .collect()
}

pub fn price_points(rules: &CompiledRules, pages: &[PageContent]) -> BTreeSet<String> {
    pages
        .iter()
        .flat_map(|page| rules.pricing.find_iter(&page.text))
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Accepted items across all pages, deduplicated in first-seen order, then capped.
fn general_list(
    rules: &CompiledRules,
    patterns: &[Regex],
    pages: &[PageContent],
    cap: usize,
) -> BTreeSet<String> {
    let mut items: Vec<String> = pages
        .iter()
        .flat_map(|page| collect_items(rules, patterns, &page.text))
        .collect();
    dedup_items(&mut items);
    items.into_iter().take(cap).collect()
}
