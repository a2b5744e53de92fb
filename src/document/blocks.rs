use std::sync::LazyLock;

use regex::Regex;

use super::unescape;

static OFFERING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^### (\d+)\.(?: (.*))?$").unwrap());
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^- \*\*([^*]*)\*\*:(.*)$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    SectionHeader(String),
    Offering { ordinal: usize, name: String },
    Field { label: String, value: String },
    Item(String),
    SubItem(String),
    Rule,
    Text(String),
    Empty,
}

/// Classify each line of a canonical document. Values come back unescaped.
pub fn classify_lines(document: &str) -> Vec<Block> {
    document.lines().map(classify_line).collect()
}

fn classify_line(raw: &str) -> Block {
    let line = raw.trim_end();
    if line.trim().is_empty() {
        return Block::Empty;
    }

    // ── Indented sub-list item: "  - value" ──
    if raw.starts_with("  ") {
        let inner = line.trim_start();
        if let Some(v) = inner.strip_prefix("- ") {
            return Block::SubItem(value(v));
        }
        if inner == "-" {
            return Block::SubItem(String::new());
        }
    }

    if let Some(caps) = OFFERING_RE.captures(line) {
        if let Ok(ordinal) = caps[1].parse() {
            return Block::Offering {
                ordinal,
                name: caps.get(2).map(|m| value(m.as_str())).unwrap_or_default(),
            };
        }
    }
    if let Some(h) = line.strip_prefix("## ") {
        return Block::SectionHeader(h.trim().to_string());
    }
    if let Some(t) = line.strip_prefix("# ") {
        return Block::Title(value(t));
    }
    if line == "#" {
        return Block::Title(String::new());
    }

    // ── Labeled field: "- **Label**: value" ──
    if let Some(caps) = FIELD_RE.captures(line) {
        return Block::Field {
            label: caps[1].trim().to_string(),
            value: value(&caps[2]),
        };
    }
    if let Some(v) = line.strip_prefix("- ") {
        return Block::Item(value(v));
    }
    if line == "-" {
        return Block::Item(String::new());
    }
    if line == "---" {
        return Block::Rule;
    }

    Block::Text(line.trim().to_string())
}

fn value(raw: &str) -> String {
    unescape(raw.trim())
}
