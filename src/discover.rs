//! Choose which pages of a vendor site to visit.

use std::collections::HashSet;

use url::Url;

use crate::html::Link;

const RELEVANT: &[&str] = &[
    "services", "products", "solutions", "offerings", "portfolio", "about", "company", "team",
    "contact", "pricing", "plans", "features", "capabilities", "expertise", "industries",
];

const EXCLUDED: &[&str] = &[
    "blog", "news", "article", "post", "journal", "diary", "updates", "announcements", "press",
    "media",
];

const SKIPPED: &[&str] = &[
    "/login", "/signup", "/register", "/logout", "/search", "/cart", "/checkout", "/account",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".zip", ".rar", ".tar", ".gz", "javascript:",
    "mailto:", "tel:", "#", "?",
];

/// Seed first, then relevant same-host links, then relevant sitemap URLs; no
/// duplicates, at most `max_pages` entries.
pub fn candidate_pages(seed_url: &str, links: &[Link], sitemap: &[String], max_pages: usize) -> Vec<String> {
    let mut pages = vec![seed_url.to_string()];
    let mut seen: HashSet<String> = HashSet::from([normalized(seed_url)]);
    let Ok(seed) = Url::parse(seed_url) else {
        return pages;
    };

    let from_links = links.iter().map(|l| (l.url.as_str(), l.text.as_str()));
    let from_sitemap = sitemap.iter().map(|u| (u.as_str(), ""));

    for (url, text) in from_links.chain(from_sitemap) {
        if pages.len() >= max_pages {
            break;
        }
        if !is_valid_internal_link(url, &seed) || !is_relevant(url, text) {
            continue;
        }
        if seen.insert(normalized(url)) {
            pages.push(url.to_string());
        }
    }
    pages.truncate(max_pages.max(1));
    pages
}

fn is_valid_internal_link(url: &str, seed: &Url) -> bool {
    let lower = url.to_lowercase();
    if SKIPPED.iter().any(|p| lower.contains(p)) {
        return false;
    }
    match Url::parse(url) {
        Ok(u) => u.host_str() == seed.host_str() && u.port_or_known_default() == seed.port_or_known_default(),
        Err(_) => false,
    }
}

/// A relevant keyword in the path or link text, and no excluded one.
fn is_relevant(url: &str, text: &str) -> bool {
    let path = Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default();
    let text = text.to_lowercase();
    let has = |k: &&str| path.contains(*k) || text.contains(*k);
    RELEVANT.iter().any(has) && !EXCLUDED.iter().any(has)
}

fn normalized(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, text: &str) -> Link {
        Link {
            url: url.into(),
            text: text.into(),
        }
    }

    #[test]
    fn filters_links() {
        let links = vec![
            link("https://acme.example/services/cloud", "Cloud"),
            link("https://acme.example/blog/services-update", "Blog"),
            link("https://acme.example/x", "About us"),
            link("https://other.example/services", "Partner"),
            link("https://acme.example/products/guide.pdf", "Guide"),
            link("https://acme.example/pricing?plan=pro", "Pricing"),
            link("https://acme.example/services/cloud", "Cloud again"),
            link("mailto:sales@acme.example", "Contact"),
            link("https://acme.example/careers", "Careers"),
        ];
        let pages = candidate_pages("https://acme.example", &links, &[], 25);
        assert_eq!(
            pages,
            vec![
                "https://acme.example",
                "https://acme.example/services/cloud",
                "https://acme.example/x",
            ]
        );
    }

    #[test]
    fn sitemap_urls_after_links_and_capped() {
        let links = vec![link("https://acme.example/about", "About")];
        let sitemap = vec![
            "https://acme.example/".to_string(),
            "https://acme.example/products/vault".to_string(),
            "https://acme.example/solutions/edge".to_string(),
        ];
        let pages = candidate_pages("https://acme.example/", &links, &sitemap, 3);
        assert_eq!(
            pages,
            vec![
                "https://acme.example/",
                "https://acme.example/about",
                "https://acme.example/products/vault",
            ]
        );
    }

    #[test]
    fn unparseable_seed_yields_only_seed() {
        let pages = candidate_pages("not a url", &[link("https://a.example/services", "")], &[], 5);
        assert_eq!(pages, vec!["not a url"]);
    }
}
