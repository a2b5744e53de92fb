use std::collections::BTreeMap;

use url::Url;

use crate::html::Link;

/// First profile link per social platform, keyed by platform name.
pub fn social_profiles(links: &[Link]) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();
    for link in links {
        if let Some(platform) = classify_domain(&extract_domain(&link.url)) {
            found
                .entry(platform.to_string())
                .or_insert_with(|| link.url.clone());
        }
    }
    found
}

/// Lowercased host without a leading `www.`; empty for URLs without a host.
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_lowercase()))
        .unwrap_or_default()
}

fn classify_domain(domain: &str) -> Option<&'static str> {
    let is = |site: &str| domain == site || domain.ends_with(&format!(".{}", site));
    match domain {
        _ if is("linkedin.com") => Some("linkedin"),
        _ if is("twitter.com") || is("x.com") => Some("twitter"),
        _ if is("facebook.com") => Some("facebook"),
        _ if is("instagram.com") => Some("instagram"),
        _ if is("youtube.com") => Some("youtube"),
        _ if is("github.com") => Some("github"),
        _ => None,
    }
}
