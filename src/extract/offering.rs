use crate::classify;
use crate::html::PageContent;
use crate::model::{dedup_items, Offering, OfferingKind};
use crate::rules::{CompiledOfferingRules, CompiledRules};

use super::{collect_items, first_labeled};

/// Build one offering candidate from a classified page. `fallback_name` is used
/// when the page title yields no name.
pub fn extract_offering(
    rules: &CompiledRules,
    kind: OfferingKind,
    page: &PageContent,
    fallback_name: &str,
) -> Offering {
    let kr = rules.for_kind(kind);
    let text = page.text.as_str();
    let name = offering_name(&page.title).unwrap_or_else(|| fallback_name.to_string());

    let mut o = Offering::new(kind, name);
    o.category = classify::category(kr, &format!("{} {}", page.url, page.title));
    o.description = description(kr, text);
    o.url = page.url.clone();
    o.pricing = pricing(rules, text);
    o.features = capped_items(rules, &kr.features, text, kr.list_cap);
    o.benefits = capped_items(rules, &kr.benefits, text, kr.list_cap);
    o.use_cases = capped_items(rules, &kr.use_cases, text, kr.list_cap);
    o.target_audience = first_labeled(&kr.target_audience, text);
    o.requirements = first_labeled(&kr.requirements, text);
    o.deployment = first_labeled(&kr.deployment, text);
    o.support = first_labeled(&kr.support, text);
    o
}

/// Page title cut at the first `" - "` or `" | "`; `None` when nothing is left.
pub fn offering_name(title: &str) -> Option<String> {
    let cut = [" - ", " | "]
        .iter()
        .filter_map(|sep| title.find(sep))
        .min()
        .unwrap_or(title.len());
    let name = title[..cut].trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub fn description(kr: &CompiledOfferingRules, text: &str) -> String {
    for re in &kr.description {
        if let Some(caps) = re.captures(text) {
            let m = caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str()).unwrap_or("");
            let found = collapse(m);
            if !found.is_empty() {
                return found;
            }
        }
    }
    let flat = collapse(text);
    if flat.chars().count() > kr.description_fallback_chars {
        let head: String = flat.chars().take(kr.description_fallback_chars).collect();
        format!("{}...", head.trim_end())
    } else {
        flat
    }
}

/// First price point in the text.
pub fn pricing(rules: &CompiledRules, text: &str) -> Option<String> {
    rules.pricing.find(text).map(|m| m.as_str().trim().to_string())
}

fn capped_items(
    rules: &CompiledRules,
    patterns: &[regex::Regex],
    text: &str,
    cap: usize,
) -> Vec<String> {
    let mut items = collect_items(rules, patterns, text);
    items.truncate(cap);
    dedup_items(&mut items);
    items
}

fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, title: &str, text: &str) -> PageContent {
        PageContent {
            url: url.into(),
            title: title.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn name_from_title() {
        assert_eq!(offering_name("Cloud Migration - Acme").as_deref(), Some("Cloud Migration"));
        assert_eq!(offering_name("Backup | Acme - Home").as_deref(), Some("Backup"));
        assert_eq!(offering_name("Wi-Fi Survey").as_deref(), Some("Wi-Fi Survey"));
        assert_eq!(offering_name(" - Acme"), None);
        assert_eq!(offering_name(""), None);
    }

    #[test]
    fn pricing_first_match_or_none() {
        let rules = CompiledRules::default();
        assert_eq!(
            pricing(&rules, "Plans from $49.99/month, enterprise $999 per year").as_deref(),
            Some("$49.99/month")
        );
        assert_eq!(
            pricing(&rules, "Plans start at $49.99/month for small teams.").as_deref(),
            Some("$49.99/month")
        );
        assert_eq!(pricing(&rules, "Contact us for a quote"), None);
    }

    #[test]
    fn description_prefers_sentence() {
        let rules = CompiledRules::default();
        let text = "Short.\nOur managed cloud migration service moves your workloads without downtime. More text.";
        let d = description(&rules.service, text);
        assert!(d.starts_with("Our managed cloud migration"), "{d}");
        assert!(d.ends_with('.'));
    }

    #[test]
    fn description_falls_back_to_prefix() {
        let rules = CompiledRules::default();
        let text = "x ".repeat(150);
        let d = description(&rules.service, &text);
        assert!(d.ends_with("..."));
        assert!(d.chars().count() <= 203);
        assert_eq!(description(&rules.service, "tiny"), "tiny");
    }

    #[test]
    fn service_page_fields() {
        let rules = CompiledRules::default();
        let text = "Cloud Migration\n\
            • Zero downtime cutover planning\n\
            • Zero downtime cutover planning\n\
            • Short\n\
            Benefits: lower hosting costs for every team\n\
            Ideal for: mid-sized retail companies\n\
            Starting at $1,200 per month.";
        let o = extract_offering(
            &rules,
            OfferingKind::Service,
            &page("https://acme.example/services/cloud", "Cloud Migration - Acme", text),
            "acme.example",
        );
        assert_eq!(o.name, "Cloud Migration");
        assert_eq!(o.category, "cloud");
        assert_eq!(o.features, vec!["Zero downtime cutover planning".to_string()]);
        assert_eq!(o.benefits, vec!["lower hosting costs for every team".to_string()]);
        assert_eq!(o.use_cases, vec!["mid-sized retail companies".to_string()]);
        assert_eq!(o.pricing.as_deref(), Some("$1,200 per month"));
        assert!(o.support.is_empty());
    }

    #[test]
    fn product_extras() {
        let rules = CompiledRules::default();
        let text = "Requirements: Windows Server 2019 or newer\n\
            Deployment: on-premises or private cloud\n\
            Technical support: business hours via phone and email";
        let o = extract_offering(
            &rules,
            OfferingKind::Product,
            &page("https://acme.example/products/vault", "", text),
            "acme.example",
        );
        assert_eq!(o.name, "acme.example");
        assert_eq!(o.requirements, "Windows Server 2019 or newer");
        assert_eq!(o.deployment, "on-premises or private cloud");
        assert_eq!(o.support, "business hours via phone and email");
        assert!(o.pricing.is_none());
    }

    #[test]
    fn feature_cap_applies() {
        let rules = CompiledRules::default();
        let text: String = (0..30).map(|i| format!("• distinct feature number {i}\n")).collect();
        let o = extract_offering(
            &rules,
            OfferingKind::Service,
            &page("https://a.example/services/x", "X", &text),
            "a",
        );
        assert_eq!(o.features.len(), 10);
        let p = extract_offering(
            &rules,
            OfferingKind::Product,
            &page("https://a.example/products/x", "X", &text),
            "a",
        );
        assert_eq!(p.features.len(), 15);
    }
}
