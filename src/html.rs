//! Raw HTML -> page title, meta description, visible text and links.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use url::Url;

/// Elements whose content is never visible text.
const SKIPPED: &[&str] = &["head", "script", "style", "noscript", "template", "svg", "iframe"];

/// Elements rendered on their own line(s).
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tr", "ul",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// One fetched page reduced to what the extractors read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    /// Visible text, one block element per line, list items as `• item`.
    pub text: String,
    pub links: Vec<Link>,
}

impl PageContent {
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

pub fn parse_page(url: &str, html: &str) -> PageContent {
    let document = Html::parse_document(html);
    PageContent {
        url: url.to_string(),
        title: first_text(&document, "title"),
        meta_description: meta_description(&document),
        text: visible_text(&document),
        links: Url::parse(url)
            .map(|base| extract_links(&document, &base))
            .unwrap_or_default(),
    }
}

fn first_text(document: &Html, selector: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&sel)
        .next()
        .map(|el| collapse_ws(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn meta_description(document: &Html) -> String {
    let Ok(sel) = Selector::parse(r#"meta[name="description"], meta[name="Description"]"#) else {
        return String::new();
    };
    document
        .select(&sel)
        .find_map(|el| el.value().attr("content"))
        .map(collapse_ws)
        .unwrap_or_default()
}

fn visible_text(document: &Html) -> String {
    let mut raw = String::new();
    walk(document.root_element(), &mut raw);
    raw.lines()
        .map(collapse_ws)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn walk(el: ElementRef, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            // Source formatting newlines are not structure.
            out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if SKIPPED.contains(&name) {
                continue;
            }
            if name == "br" {
                out.push('\n');
                continue;
            }
            let block = BLOCKS.contains(&name);
            if block {
                out.push('\n');
            }
            if name == "li" {
                out.push_str("• ");
            }
            walk(child_el, out);
            if block {
                out.push('\n');
            }
        }
    }
}

fn extract_links(document: &Html, base: &Url) -> Vec<Link> {
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&sel)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            let url = base.join(href).ok()?;
            Some(Link {
                url: url.to_string(),
                text: collapse_ws(&el.text().collect::<String>()),
            })
        })
        .collect()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
