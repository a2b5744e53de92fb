//! The canonical vendor document: a markdown-flavoured text file that the
//! serializer writes and the deserializer reads back into the same record.

pub mod blocks;
pub mod read;
pub mod render;
pub mod sections;

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::VendorRecord;

pub use read::{parse_document, read_document};
pub use render::render_document;

pub const BASIC_INFORMATION: &str = "Basic Information";
pub const CONTACT_INFORMATION: &str = "Contact Information";
pub const SERVICES_OFFERED: &str = "Services Offered";
pub const PRODUCTS: &str = "Products";
pub const METADATA: &str = "Metadata";
pub const FOOTER: &str = "*Generated by vendor_scraper*";

/// Offering labels whose value is an indented sub-list rather than a scalar.
pub const LIST_LABELS: &[&str] = &["Features", "Benefits", "Use Cases"];

/// Flat bullet-list sections in document order.
pub const FLAT_SECTIONS: &[&str] = &[
    "Technology Stack",
    "Pricing Information",
    "Industry Focus",
    "Geographic Presence",
    "General Features",
    "General Benefits",
    "General Use Cases",
    "Integrations",
    "Certifications",
];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not a vendor document: no title line and no {BASIC_INFORMATION} section")]
    NotAVendorDocument,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn flat_set<'a>(record: &'a VendorRecord, section: &str) -> Option<&'a BTreeSet<String>> {
    Some(match section {
        "Technology Stack" => &record.technology_stack,
        "Pricing Information" => &record.pricing_info,
        "Industry Focus" => &record.industry_focus,
        "Geographic Presence" => &record.geographic_presence,
        "General Features" => &record.features,
        "General Benefits" => &record.benefits,
        "General Use Cases" => &record.use_cases,
        "Integrations" => &record.integrations,
        "Certifications" => &record.certifications,
        _ => return None,
    })
}

pub(crate) fn flat_set_mut<'a>(
    record: &'a mut VendorRecord,
    section: &str,
) -> Option<&'a mut BTreeSet<String>> {
    Some(match section {
        "Technology Stack" => &mut record.technology_stack,
        "Pricing Information" => &mut record.pricing_info,
        "Industry Focus" => &mut record.industry_focus,
        "Geographic Presence" => &mut record.geographic_presence,
        "General Features" => &mut record.features,
        "General Benefits" => &mut record.benefits,
        "General Use Cases" => &mut record.use_cases,
        "Integrations" => &mut record.integrations,
        "Certifications" => &mut record.certifications,
        _ => return None,
    })
}

/// Make a value safe to write as "the rest of a line".
///
/// `\` `\n` `\r` `\t` get backslash escapes, other non-space whitespace becomes
/// `\u{XXXX}`, a space at either end becomes `\s` and a leading `*` becomes `\*`.
pub fn escape(value: &str) -> String {
    escape_with(value, false)
}

/// [`escape`] for a `**label**`: every `*` becomes `\u{002A}` so the label can hold any text.
pub fn escape_label(label: &str) -> String {
    escape_with(label, true)
}

fn escape_with(value: &str, label: bool) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ' ' if i == 0 || i == last => out.push_str("\\s"),
            '*' if label => out.push_str("\\u{002A}"),
            '*' if i == 0 => out.push_str("\\*"),
            c if c.is_whitespace() && c != ' ' => {
                out.push_str(&format!("\\u{{{:04X}}}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]. Unknown escapes are kept literally.
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('s') => out.push(' '),
            Some('*') => out.push('*'),
            Some('u') if chars.peek() == Some(&'{') => {
                chars.next();
                let hex: String = chars.by_ref().take_while(|&h| h != '}').collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u{");
                        out.push_str(&hex);
                        out.push('}');
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_examples() {
        assert_eq!(escape("plain text"), "plain text");
        assert_eq!(escape(" padded "), "\\spadded\\s");
        assert_eq!(escape("a\nb\tc\\d"), "a\\nb\\tc\\\\d");
        assert_eq!(escape("**Bold**: x"), "\\**Bold**: x");
        assert_eq!(escape("nb\u{a0}sp"), "nb\\u{00A0}sp");
        assert_eq!(escape(" "), "\\s");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn unescape_inverts_escape() {
        for s in [
            "",
            " ",
            "  two  ",
            "line1\nline2\r\n",
            "\\s is not a space",
            "* starred",
            "tab\there",
            "ünïcødé\u{2028}sep",
            "trailing backslash\\",
        ] {
            assert_eq!(unescape(&escape(s)), s, "value {s:?}");
        }
    }

    #[test]
    fn labels_never_contain_stars() {
        assert_eq!(escape_label("sales*desk"), "sales\\u{002A}desk");
        assert_eq!(escape_label("*x*"), "\\u{002A}x\\u{002A}");
        for s in ["sales*desk", "**", " Email ", "a:b", ""] {
            assert!(!escape_label(s).contains('*'));
            assert_eq!(unescape(&escape_label(s)), s, "label {s:?}");
        }
    }

    #[test]
    fn unescape_keeps_unknown_sequences() {
        assert_eq!(unescape("a\\qb"), "a\\qb");
        assert_eq!(unescape("bad \\u{zz}"), "bad \\u{zz}");
    }
}
