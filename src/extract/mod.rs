pub mod links;
pub mod offering;
pub mod vendor;

use regex::{Captures, Regex};

use crate::rules::CompiledRules;

pub use offering::{extract_offering, offering_name};
pub use vendor::{apply_vendor_facts, company_name, mentioned_services};

/// Capture group 1 when the pattern has one, else the whole match.
fn captured<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str())
        .unwrap_or("")
}

/// Every accepted candidate of every pattern, in pattern order then text order.
pub(crate) fn collect_items(rules: &CompiledRules, patterns: &[Regex], text: &str) -> Vec<String> {
    let mut items = Vec::new();
    for re in patterns {
        for caps in re.captures_iter(text) {
            let item = captured(&caps).trim();
            if rules.accepts_item(item) {
                items.push(item.to_string());
            }
        }
    }
    items
}

/// First non-empty capture among the patterns, tried in order; "" when none match.
pub(crate) fn first_labeled(patterns: &[Regex], text: &str) -> String {
    patterns
        .iter()
        .filter_map(|re| re.captures(text))
        .map(|caps| captured(&caps).trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Upper-case the first letter of every alphabetic run ("node.js" -> "Node.Js").
/// Keywords that already carry capitals are kept as written.
pub fn title_case(keyword: &str) -> String {
    if keyword.chars().any(char::is_uppercase) {
        return keyword.to_string();
    }
    let mut out = String::with_capacity(keyword.len());
    let mut at_start = true;
    for c in keyword.chars() {
        if at_start && c.is_alphabetic() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_start = !c.is_alphabetic();
    }
    out
}

/// `needle` occurs in `haystack` with no alphanumeric character on either side.
/// Both arguments are expected lowercased.
pub(crate) fn contains_token(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_like_keywords() {
        assert_eq!(title_case("node.js"), "Node.Js");
        assert_eq!(title_case("real estate"), "Real Estate");
        assert_eq!(title_case("c#"), "C#");
        assert_eq!(title_case("AI"), "AI");
    }

    #[test]
    fn token_matching() {
        assert!(contains_token("we use go and rust", "go"));
        assert!(!contains_token("search with google", "go"));
        assert!(contains_token("built on node.js.", "node.js"));
        assert!(contains_token("c# developers", "c#"));
        assert!(!contains_token("anything", ""));
    }

    #[test]
    fn length_filter_boundaries() {
        let rules = CompiledRules::default();
        let patterns = vec![Regex::new(r"(?m)^- (.+)$").unwrap()];
        let text = format!(
            "- {}\n- {}\n- {}\n- {}",
            "a".repeat(10),
            "b".repeat(11),
            "c".repeat(199),
            "d".repeat(200)
        );
        let items = collect_items(&rules, &patterns, &text);
        assert_eq!(items, vec!["b".repeat(11), "c".repeat(199)]);
    }
}
