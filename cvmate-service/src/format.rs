//! Conversion of lightweight inline markup to HTML.
//!
//! Generated application text occasionally contains markdown-style
//! emphasis despite the prompts asking for plain text. A small fixed set
//! of markers is converted; everything else passes through untouched.

use std::sync::OnceLock;

use regex::Regex;

fn bold_star() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").unwrap())
}

fn bold_underscore() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__(.+?)__").unwrap())
}

fn italic_star() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.+?)\*").unwrap())
}

fn italic_underscore() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(.+?)_").unwrap())
}

/// Convert inline markdown emphasis and line breaks to HTML.
///
/// - `**text**` / `__text__` → `<strong>text</strong>`
/// - `*text*` / `_text_` → `<em>text</em>`
/// - `\n` → `<br>`
///
/// Pure, total function: unmatched or unbalanced markers are left as
/// literal characters. Bold runs before italic so `**x**` is never eaten
/// as two italics.
pub fn markdown_to_html(text: &str) -> String {
    let text = bold_star().replace_all(text, "<strong>$1</strong>");
    let text = bold_underscore().replace_all(&text, "<strong>$1</strong>");
    let text = italic_star().replace_all(&text, "<em>$1</em>");
    let text = italic_underscore().replace_all(&text, "<em>$1</em>");
    text.replace('\n', "<br>")
}
