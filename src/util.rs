//! Shared constants and small text helpers used across the pipeline.

use regex::Regex;
use std::sync::LazyLock;

/// Start-of-placeholder marker ("start of text").
pub const STX: char = '\u{0002}';
/// End-of-placeholder marker ("end of text").
pub const ETX: char = '\u{0003}';

/// Prefix of inline placeholders produced by the inline processor.
pub const INLINE_PLACEHOLDER_PREFIX: &str = "\u{0002}klzzwxh:";
/// Prefix of raw HTML placeholders produced by the html stash.
pub const HTML_PLACEHOLDER_PREFIX: &str = "\u{0002}wzxhzdk:";
/// Stand-in for `&` that must survive serialization untouched.
pub const AMP_SUBSTITUTE: &str = "\u{0002}amp\u{0003}";

/// Characters that a backslash turns into literals.
pub const ESCAPED_CHARS: &[char] = &[
    '\\', '`', '*', '_', '{', '}', '[', ']', '(', ')', '>', '#', '+', '-', '.', '!',
];

pub static INLINE_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{0002}klzzwxh:([0-9]+)\u{0003}").unwrap());

static BLOCK_LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(p|div|h[1-6]|blockquote|pre|table|dl|ol|ul|script|noscript|form|fieldset|iframe|math|hr|hr/|style|li|dd|dt|thead|tbody|tfoot|tr|th|td|section|footer|header|hgroup|group|figure|figcaption|aside|article|canvas|output|progress|video|nav|main|address)$",
    )
    .unwrap()
});

/// Returns true if `tag` names a block-level HTML element.
pub fn is_block_level(tag: &str) -> bool {
    BLOCK_LEVEL_RE.is_match(tag)
}

/// Builds the inline placeholder for stash id `id`.
pub fn inline_placeholder(id: usize) -> String {
    format!("{INLINE_PLACEHOLDER_PREFIX}{id:04}{ETX}")
}

/// Builds the raw HTML placeholder for stash index `index`.
pub fn html_placeholder(index: usize) -> String {
    format!("{HTML_PLACEHOLDER_PREFIX}{index}{ETX}")
}

/// Index of the raw HTML placeholder that makes up all of `text`.
pub fn html_placeholder_index(text: &str) -> Option<usize> {
    text.strip_prefix(HTML_PLACEHOLDER_PREFIX)?.strip_suffix(ETX)?.parse().ok()
}

/// Expands tabs to the next multiple of `tab_length` columns, line by line.
pub fn expand_tabs(text: &str, tab_length: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = tab_length - (column % tab_length);
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// Strips one pair of matching surrounding quotes.
pub fn dequote(text: &str) -> &str {
    let quoted = (text.starts_with('"') && text.ends_with('"')) || (text.starts_with('\'') && text.ends_with('\''));
    if quoted && text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

/// True when the text is empty or whitespace only.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
