//! Page and offering classification by keyword containment.

use crate::model::OfferingKind;
use crate::rules::{CompiledOfferingRules, CompiledRules};

/// Does the lowercased URL or title contain one of the kind's page keywords?
pub fn is_page_of_kind(rules: &CompiledOfferingRules, url: &str, title: &str) -> bool {
    let url = url.to_lowercase();
    let title = title.to_lowercase();
    rules
        .page_keywords
        .iter()
        .any(|k| url.contains(k.as_str()) || title.contains(k.as_str()))
}

pub fn is_service_page(rules: &CompiledRules, url: &str, title: &str) -> bool {
    is_page_of_kind(&rules.service, url, title)
}

pub fn is_product_page(rules: &CompiledRules, url: &str, title: &str) -> bool {
    is_page_of_kind(&rules.product, url, title)
}

/// Kinds a page counts as. A page can be both (e.g. `/solutions/`).
pub fn page_kinds(rules: &CompiledRules, url: &str, title: &str) -> Vec<OfferingKind> {
    [OfferingKind::Service, OfferingKind::Product]
        .into_iter()
        .filter(|k| is_page_of_kind(rules.for_kind(*k), url, title))
        .collect()
}

/// First category token found in the lowercased text, else `general`.
pub fn category(rules: &CompiledOfferingRules, text: &str) -> String {
    let text = text.to_lowercase();
    rules
        .categories
        .iter()
        .find(|c| text.contains(c.as_str()))
        .cloned()
        .unwrap_or_else(|| "general".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifier_examples() {
        let rules = CompiledRules::default();
        assert!(is_service_page(&rules, "https://x.com/services/cloud", "Cloud"));
        assert!(is_product_page(&rules, "https://x.com/tuote/abc", "ABC"));
        assert!(!is_service_page(&rules, "https://x.com/blog/post", "Hello"));
        assert!(!is_product_page(&rules, "https://x.com/blog/post", "Hello"));
        assert!(is_service_page(&rules, "https://x.com/services/consulting", "Consulting Services"));
        assert!(!is_service_page(&rules, "https://x.com/blog/post-1", "Our Latest News"));
        assert!(!is_product_page(&rules, "https://x.com/blog/post-1", "Our Latest News"));
    }

    #[test]
    fn title_counts_too() {
        let rules = CompiledRules::default();
        assert!(is_product_page(&rules, "https://x.com/a", "Our Platform"));
        assert!(is_service_page(&rules, "https://x.com/a", "IT Consulting"));
    }

    #[test]
    fn solutions_is_both() {
        let rules = CompiledRules::default();
        let kinds = page_kinds(&rules, "https://x.com/solutions/edge", "Edge");
        assert_eq!(kinds, vec![OfferingKind::Service, OfferingKind::Product]);
    }

    #[test]
    fn category_first_match_wins() {
        let rules = CompiledRules::default();
        assert_eq!(category(&rules.service, "Cloud security training"), "training");
        assert_eq!(category(&rules.product, "Cloud security suite"), "security");
        assert_eq!(category(&rules.product, "Something else"), "general");
    }
}
