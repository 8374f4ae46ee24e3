//! Literal Markdown delimiters for the elements the overlay editor can open.

use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl Delimiters {
    const NONE: Delimiters = Delimiters {
        prefix: "",
        suffix: "",
    };

    const fn new(prefix: &'static str, suffix: &'static str) -> Self {
        Self { prefix, suffix }
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }
}

const SYNTAX_TABLE: &[(&str, Delimiters)] = &[
    ("h1", Delimiters::new("# ", "")),
    ("h2", Delimiters::new("## ", "")),
    ("h3", Delimiters::new("### ", "")),
    ("strong", Delimiters::new("**", "**")),
    ("b", Delimiters::new("**", "**")),
    ("em", Delimiters::new("*", "*")),
    ("i", Delimiters::new("*", "*")),
    ("code", Delimiters::new("`", "`")),
    ("li", Delimiters::new("- ", "")),
];

static LOOSE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#{1,6}\s*").unwrap());
static LOOSE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s*").unwrap());

/// Delimiters for `tag`; empty for tags without Markdown syntax (e.g. `p`).
pub fn delimiters(tag: &str) -> Delimiters {
    SYNTAX_TABLE
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, d)| *d)
        .unwrap_or(Delimiters::NONE)
}

/// Tags that have an entry in the syntax table.
pub fn tags() -> impl Iterator<Item = &'static str> {
    SYNTAX_TABLE.iter().map(|(name, _)| *name)
}

/// `prefix + text + suffix` for `tag`.
pub fn wrap(tag: &str, text: &str) -> String {
    let d = delimiters(tag);
    format!("{}{}{}", d.prefix, text, d.suffix)
}

/// Remove the delimiters of `tag` from an edited value.
///
/// The exact delimiters are removed when present. Otherwise a looser match
/// is tried so `#Title` or `-  item` still come out clean.
pub fn strip(tag: &str, value: &str) -> String {
    let d = delimiters(tag);
    if d.is_empty() {
        return value.to_string();
    }

    if value.len() >= d.prefix.len() + d.suffix.len()
        && value.starts_with(d.prefix)
        && value.ends_with(d.suffix)
    {
        return value[d.prefix.len()..value.len() - d.suffix.len()].to_string();
    }

    match tag {
        "h1" | "h2" | "h3" => LOOSE_HEADING.replace(value, "").into_owned(),
        "li" => LOOSE_BULLET.replace(value, "").into_owned(),
        _ => {
            let trimmed = value.trim();
            let inner = trimmed
                .strip_prefix(d.prefix)
                .and_then(|rest| rest.strip_suffix(d.suffix));
            match inner {
                Some(inner) => inner.to_string(),
                None => value.to_string(),
            }
        }
    }
}
