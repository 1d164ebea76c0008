//! Text passes over the serialized output.

use crate::config::{Options, SafeMode};
use crate::context::Context;
use crate::registry::Registry;
use crate::util::{AMP_SUBSTITUTE, ETX, STX, is_block_level};
use regex::Regex;
use std::sync::LazyLock;

pub trait Postprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, text: String, ctx: &Context<'_>) -> String;
}

/// Builds the default postprocessor chain.
pub fn build_postprocessors(_options: &Options) -> Registry<Box<dyn Postprocessor>> {
    let mut registry: Registry<Box<dyn Postprocessor>> = Registry::new();
    registry.append("raw_html", Box::new(RawHtmlPostprocessor));
    registry.append("amp_substitute", Box::new(AmpSubstitutePostprocessor));
    registry.append("unescape", Box::new(UnescapePostprocessor));
    registry
}

static LEADING_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^</?([^ >]+)").unwrap());

/// Comments, processing instructions and block-level tags.
fn is_block_html(html: &str) -> bool {
    let Some(caps) = LEADING_TAG_RE.captures(html) else {
        return false;
    };
    let tag = &caps[1];
    tag.starts_with(['!', '?', '@', '%']) || is_block_level(tag)
}

fn escape_html(html: &str) -> String {
    html.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Puts the stashed raw HTML back, applying the safe mode to unsafe entries.
pub struct RawHtmlPostprocessor;

impl Postprocessor for RawHtmlPostprocessor {
    fn name(&self) -> &'static str {
        "raw_html"
    }

    fn run(&self, mut text: String, ctx: &Context<'_>) -> String {
        let options = ctx.options;
        for (index, (raw, safe)) in ctx.html_stash.iter().enumerate() {
            let html = if options.safe_mode.is_active() && !safe {
                match options.safe_mode {
                    SafeMode::Escape => escape_html(raw),
                    SafeMode::Remove => String::new(),
                    _ => options.html_replacement_text.clone(),
                }
            } else {
                raw.to_string()
            };

            let placeholder = ctx.html_stash.get_placeholder(index);
            if is_block_html(&html) && (safe || options.safe_mode == SafeMode::Default) {
                text = text.replace(&format!("<p>{placeholder}</p>"), &format!("{html}\n"));
            }
            text = text.replace(&placeholder, &html);
        }
        text
    }
}

/// Turns the ampersand stand-in back into `&`.
pub struct AmpSubstitutePostprocessor;

impl Postprocessor for AmpSubstitutePostprocessor {
    fn name(&self) -> &'static str {
        "amp_substitute"
    }

    fn run(&self, text: String, _ctx: &Context<'_>) -> String {
        text.replace(AMP_SUBSTITUTE, "&")
    }
}

static ESCAPED_CHAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!("{STX}([0-9]+){ETX}")).unwrap());

/// Restores backslash-escaped characters.
pub struct UnescapePostprocessor;

impl Postprocessor for UnescapePostprocessor {
    fn name(&self) -> &'static str {
        "unescape"
    }

    fn run(&self, text: String, _ctx: &Context<'_>) -> String {
        ESCAPED_CHAR_RE
            .replace_all(&text, |caps: &regex::Captures<'_>| {
                caps[1]
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(options: &Options, stash: &[(&str, bool)], text: &str) -> String {
        let patterns = Registry::new();
        let mut ctx = Context::new(options, &patterns);
        for (html, safe) in stash {
            ctx.html_stash.store(*html, *safe);
        }
        build_postprocessors(options)
            .iter()
            .fold(text.to_string(), |acc, p| p.run(acc, &ctx))
    }

    #[test]
    fn test_block_html_replaces_its_paragraph() {
        let out = run_with(
            &Options::default(),
            &[("<div>x</div>", false)],
            "<p>\u{2}wzxhzdk:0\u{3}</p>",
        );
        assert_eq!(out, "<div>x</div>\n");
    }

    #[test]
    fn test_safe_modes_on_unsafe_html() {
        let text = "<p>\u{2}wzxhzdk:0\u{3}</p>";
        let stash = [("<b>x</b>", false)];
        assert_eq!(
            run_with(&Options::with_safe_mode(SafeMode::Escape), &stash, text),
            "<p>&lt;b&gt;x&lt;/b&gt;</p>"
        );
        assert_eq!(run_with(&Options::with_safe_mode(SafeMode::Remove), &stash, text), "<p></p>");
        assert_eq!(
            run_with(&Options::with_safe_mode(SafeMode::Replace), &stash, text),
            "<p>[HTML_REMOVED]</p>"
        );
    }

    #[test]
    fn test_safe_entries_pass_through() {
        let out = run_with(&Options::with_safe_mode(SafeMode::Escape), &[("&copy;", true)], "a \u{2}wzxhzdk:0\u{3} b");
        assert_eq!(out, "a &copy; b");
    }

    #[test]
    fn test_comments_count_as_blocks() {
        assert!(is_block_html("<!-- note -->"));
        assert!(is_block_html("</table>"));
        assert!(!is_block_html("<span>"));
        assert!(!is_block_html("plain"));
    }

    #[test]
    fn test_amp_and_escapes() {
        let out = run_with(&Options::default(), &[], "\u{2}amp\u{3}#42; \u{2}42\u{3}");
        assert_eq!(out, "&#42; *");
    }
}
