use anyhow::{Context, Result};
use tracing::{debug, info};
use url::Url;

use crate::fetch::PageSource;

/// Fetch `<seed origin>/sitemap.xml` and return every `<loc>` URL in it.
pub async fn fetch_sitemap_urls(source: &dyn PageSource, seed_url: &str) -> Result<Vec<String>> {
    let sitemap_url = Url::parse(seed_url)
        .and_then(|u| u.join("/sitemap.xml"))
        .with_context(|| format!("invalid seed URL {}", seed_url))?;

    debug!("Fetching sitemap: {}", sitemap_url);
    let xml = source
        .fetch(sitemap_url.as_str())
        .await
        .context("Failed to fetch sitemap")?;

    let urls = parse_urlset(&xml)?;
    info!("{} URLs in {}", urls.len(), sitemap_url);
    Ok(urls)
}

/// Parse a urlset XML and return all <loc> URLs.
pub fn parse_urlset(xml: &str) -> Result<Vec<String>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_url = false;
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.local_name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => in_loc = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(e)) if in_loc => {
                let loc = e.unescape()?.trim().to_string();
                if !loc.is_empty() {
                    urls.push(loc);
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"loc" => in_loc = false,
                b"url" => in_url = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlset_locs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>https://acme.example/</loc><lastmod>2024-01-01</lastmod></url>
              <url><loc> https://acme.example/services/cloud?a=1&amp;b=2 </loc></url>
            </urlset>"#;
        let urls = parse_urlset(xml).unwrap();
        assert_eq!(
            urls,
            vec!["https://acme.example/", "https://acme.example/services/cloud?a=1&b=2"]
        );
    }

    #[test]
    fn sitemap_index_has_no_page_urls() {
        let xml = "<sitemapindex><sitemap><loc>https://acme.example/s1.xml</loc></sitemap></sitemapindex>";
        assert!(parse_urlset(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_urlset("<urlset><url><loc>x</url></urlset>").is_err());
    }
}
