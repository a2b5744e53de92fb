use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferingKind {
    Service,
    Product,
}

impl OfferingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferingKind::Service => "service",
            OfferingKind::Product => "product",
        }
    }
}

/// A service or product found on a vendor site. Product-only fields stay empty for services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub kind: OfferingKind,
    pub name: String,
    pub category: String,
    pub description: String,
    pub url: String,
    pub pricing: Option<String>,
    pub features: Vec<String>,
    pub benefits: Vec<String>,
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub deployment: String,
    #[serde(default)]
    pub support: String,
}

impl Offering {
    pub fn new(kind: OfferingKind, name: impl Into<String>) -> Self {
        Offering {
            kind,
            name: name.into(),
            category: "general".to_string(),
            description: String::new(),
            url: String::new(),
            pricing: None,
            features: Vec::new(),
            benefits: Vec::new(),
            use_cases: Vec::new(),
            target_audience: String::new(),
            requirements: String::new(),
            deployment: String::new(),
            support: String::new(),
        }
    }

    /// Lowercased, trimmed name used as the merge key.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    fn normalize(&mut self) {
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.category);
        trim_in_place(&mut self.description);
        trim_in_place(&mut self.url);
        trim_in_place(&mut self.target_audience);
        trim_in_place(&mut self.requirements);
        trim_in_place(&mut self.deployment);
        trim_in_place(&mut self.support);
        if let Some(p) = self.pricing.as_mut() {
            trim_in_place(p);
        }
        if self.category.is_empty() {
            self.category = "general".to_string();
        }
        dedup_items(&mut self.features);
        dedup_items(&mut self.benefits);
        dedup_items(&mut self.use_cases);
    }
}

/// Everything learned about one vendor in a single research run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorRecord {
    pub vendor_id: String,
    pub company_name: String,
    pub website: String,
    pub domain: String,
    pub description: String,
    pub title: String,
    pub contact_info: BTreeMap<String, String>,
    pub services: Vec<Offering>,
    pub products: Vec<Offering>,
    pub technology_stack: BTreeSet<String>,
    pub industry_focus: BTreeSet<String>,
    pub geographic_presence: BTreeSet<String>,
    pub features: BTreeSet<String>,
    pub benefits: BTreeSet<String>,
    pub use_cases: BTreeSet<String>,
    pub integrations: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
    pub pricing_info: BTreeSet<String>,
    pub total_pages_scraped: u32,
    pub scraped_at: String,
    pub last_updated: String,
}

impl VendorRecord {
    /// Bring the record into the shape the canonical document can represent:
    /// trimmed text, lowercase contact keys, no empty or repeated list items,
    /// no nameless offerings.
    pub fn normalize(&mut self) {
        for field in [
            &mut self.vendor_id,
            &mut self.company_name,
            &mut self.website,
            &mut self.domain,
            &mut self.description,
            &mut self.title,
            &mut self.scraped_at,
            &mut self.last_updated,
        ] {
            trim_in_place(field);
        }

        self.contact_info = std::mem::take(&mut self.contact_info)
            .into_iter()
            .map(|(k, v)| (normalize_contact_key(&k), v.trim().to_string()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        for offerings in [&mut self.services, &mut self.products] {
            offerings.retain(|o| !o.name.trim().is_empty());
            offerings.iter_mut().for_each(Offering::normalize);
        }

        for set in [
            &mut self.technology_stack,
            &mut self.industry_focus,
            &mut self.geographic_presence,
            &mut self.features,
            &mut self.benefits,
            &mut self.use_cases,
            &mut self.integrations,
            &mut self.certifications,
            &mut self.pricing_info,
        ] {
            *set = std::mem::take(set)
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
}

/// Derive a stable identifier from a company name.
///
/// Lowercase, drop anything that is not alphanumeric, `_` or whitespace, join the
/// remaining words with `_`, cut at 50 characters.
pub fn vendor_id(company_name: &str) -> String {
    let cleaned: String = company_name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    let id: String = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(50)
        .collect();
    if id.is_empty() {
        "vendor".to_string()
    } else {
        id
    }
}

/// URL authority without a leading `www.`; empty when the URL does not parse.
pub fn domain_of(url: &str) -> String {
    let Ok(parsed) = url::Url::parse(url.trim()) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn normalize_contact_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

/// Trim items, drop empties and repeats, keep first-seen order.
pub fn dedup_items(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    *items = std::mem::take(items)
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_id_is_stable_and_clean() {
        let a = vendor_id("Acme & Sons, Inc.");
        let b = vendor_id("Acme & Sons, Inc.");
        assert_eq!(a, b);
        assert_eq!(a, "acme_sons_inc");
        assert!(a.len() <= 50);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn vendor_id_truncates_to_fifty() {
        let name = "word ".repeat(30);
        assert_eq!(vendor_id(&name).chars().count(), 50);
    }

    #[test]
    fn vendor_id_empty_name() {
        assert_eq!(vendor_id("  &&  "), "vendor");
    }

    #[test]
    fn domain_strips_www() {
        assert_eq!(domain_of("https://www.example.com/about"), "example.com");
        assert_eq!(domain_of("http://shop.example.fi:8080/x"), "shop.example.fi:8080");
        assert_eq!(domain_of("not a url"), "");
    }

    #[test]
    fn normalize_dedups_and_trims() {
        let mut svc = Offering::new(OfferingKind::Service, "  Support ");
        svc.features = vec![" a feature ".into(), "a feature".into(), "".into()];
        svc.category = String::new();
        let mut rec = VendorRecord {
            services: vec![svc, Offering::new(OfferingKind::Service, "   ")],
            ..Default::default()
        };
        rec.contact_info.insert("Email".into(), " x@y.com ".into());
        rec.technology_stack.insert(" Rust ".into());
        rec.technology_stack.insert("".into());
        rec.normalize();

        assert_eq!(rec.services.len(), 1);
        assert_eq!(rec.services[0].name, "Support");
        assert_eq!(rec.services[0].category, "general");
        assert_eq!(rec.services[0].features, vec!["a feature".to_string()]);
        assert_eq!(rec.contact_info.get("email").map(String::as_str), Some("x@y.com"));
        assert_eq!(rec.technology_stack.len(), 1);
        assert!(rec.technology_stack.contains("Rust"));
    }
}
