//! Text normalization applied before extraction. Line structure is kept
//! because the section extractor works line by line.

use once_cell::sync::Lazy;
use regex::Regex;

static BLOCK_TAGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<\s*(?:br|/p|/li|/div|/h[1-6])\s*/?\s*>").expect("block tag pattern is valid")
});
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static URLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").expect("url pattern is valid"));
static EMAILS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}]+").expect("space pattern is valid"));

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
];

/// Strips markup, URLs and e-mail addresses; collapses horizontal whitespace.
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n");
    let text = BLOCK_TAGS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, " ");

    let mut text = text.into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }

    let text = URLS.replace_all(&text, " ");
    let text = EMAILS.replace_all(&text, " ");

    let lines: Vec<String> = text
        .lines()
        .map(|line| SPACES.replace_all(line, " ").trim().to_string())
        .collect();

    lines.join("\n").trim().to_string()
}
