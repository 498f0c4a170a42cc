use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Replace HTML tags with spaces. The editor output is an opaque fragment; this
/// is a plain tag-removal pass, not an HTML parser.
pub fn strip_tags(html: &str) -> String {
    HTML_TAG_RE.replace_all(html, " ").trim().to_string()
}

pub fn is_blank(html: &str) -> bool {
    strip_tags(html).is_empty()
}

pub fn word_count(html: &str) -> u32 {
    strip_tags(html).split_whitespace().count() as u32
}
