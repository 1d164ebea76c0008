use super::{InlinePattern, PatternOutput, StashedNodes, group, handle_attributes, unescape};
use crate::context::Context;
use crate::etree::Element;
use crate::util::dequote;
use fancy_regex::{Captures, Regex};
use regex::Regex as PlainRegex;
use std::sync::LazyLock;
use url::{ParseError, Url};

const LOCLESS_SCHEMES: &[&str] = &["", "mailto", "news"];
const ALLOWED_SCHEMES: &[&str] = &["", "mailto", "news", "http", "https", "ftp", "ftps"];

/// Filters a link target when a safe mode is active.
///
/// Returns the URL unchanged when it passes, otherwise an empty string.
pub fn sanitize_url(raw: &str, ctx: &Context<'_>) -> String {
    if !ctx.options.safe_mode.is_active() {
        return raw.to_string();
    }
    if is_allowed_url(raw) {
        raw.to_string()
    } else {
        log::debug!("[rumdown-inline] Rejected url {raw:?}");
        String::new()
    }
}

fn is_allowed_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            let scheme = url.scheme();
            if !ALLOWED_SCHEMES.contains(&scheme) {
                return false;
            }
            if !LOCLESS_SCHEMES.contains(&scheme) && (url.host_str().is_none_or(str::is_empty) || !has_authority(raw)) {
                return false;
            }
            ![Some(url.path()), url.query(), url.fragment()]
                .into_iter()
                .flatten()
                .any(|part| part.contains(':'))
        }
        // Relative references have no scheme and no host of their own.
        Err(ParseError::RelativeUrlWithoutBase) => !relative_has_colon(raw),
        Err(_) => false,
    }
}

/// Whether `scheme:` is followed by `//` in the raw text. `http:host`
/// parses with a host but names no location.
fn has_authority(raw: &str) -> bool {
    raw.split_once(':').is_some_and(|(_, rest)| rest.starts_with("//"))
}

/// Colons are allowed only in the authority of a scheme-relative URL.
fn relative_has_colon(raw: &str) -> bool {
    let rest = match raw.strip_prefix("//") {
        Some(after) => after.find(['/', '?', '#']).map_or("", |i| &after[i..]),
        None => raw,
    };
    rest.contains(':')
}

/// Inline links: `[text](url "title")`.
pub struct LinkPattern {
    regex: &'static Regex,
}

impl LinkPattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for LinkPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let mut el = Element::with_text("a", group(caps, 2));

        let mut href = group(caps, 9);
        if href.starts_with('<') && href.ends_with('>') && href.len() >= 2 {
            href = &href[1..href.len() - 1];
        }
        let href = if href.is_empty() {
            String::new()
        } else {
            sanitize_url(&unescape(href.trim(), stash), ctx)
        };
        el.set("href", href);

        let title = group(caps, 13);
        if !title.is_empty() {
            el.set("title", dequote(&unescape(title, stash)));
        }
        Some(PatternOutput::Node(el))
    }
}

/// Inline images: `![alt](src "title")`.
pub struct ImagePattern {
    regex: &'static Regex,
}

impl ImagePattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for ImagePattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let mut el = Element::new("img");
        let parts: Vec<&str> = group(caps, 9).split_whitespace().collect();

        match parts.first() {
            Some(first) => {
                let src = first
                    .strip_prefix('<')
                    .and_then(|s| s.strip_suffix('>'))
                    .unwrap_or(first);
                el.set("src", sanitize_url(&unescape(src, stash), ctx));
            }
            None => el.set("src", ""),
        }
        if parts.len() > 1 {
            el.set("title", dequote(&unescape(&parts[1..].join(" "), stash)));
        }

        let alt = group(caps, 2);
        let alt = if ctx.options.enable_attributes {
            handle_attributes(alt, &mut el)
        } else {
            alt.to_string()
        };
        el.set("alt", unescape(&alt, stash));
        Some(PatternOutput::Node(el))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Link,
    Image,
}

static NEWLINE_CLEANUP_RE: LazyLock<PlainRegex> = LazyLock::new(|| PlainRegex::new(r"[ ]?\n").unwrap());

/// Reference links and images: `[text][id]`, `[text][]`, `[text]`.
///
/// Undefined ids leave the text untouched.
pub struct ReferencePattern {
    regex: &'static Regex,
    kind: ReferenceKind,
}

impl ReferencePattern {
    pub fn new(regex: &'static Regex, kind: ReferenceKind) -> Self {
        Self { regex, kind }
    }
}

impl InlinePattern for ReferencePattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let text = group(caps, 2);
        let id = match group(caps, 9) {
            "" => text,
            explicit => explicit,
        };
        let id = NEWLINE_CLEANUP_RE.replace_all(&id.to_lowercase(), " ").into_owned();
        let Some(reference) = ctx.references.get(&id).cloned() else {
            log::debug!("[rumdown-inline] Undefined reference {id:?}");
            return None;
        };

        let el = match self.kind {
            ReferenceKind::Link => {
                let mut el = Element::with_text("a", text);
                el.set("href", sanitize_url(&reference.url, ctx));
                if let Some(title) = reference.title {
                    el.set("title", title);
                }
                el
            }
            ReferenceKind::Image => {
                let mut el = Element::new("img");
                el.set("src", sanitize_url(&reference.url, ctx));
                if let Some(title) = reference.title {
                    el.set("title", title);
                }
                let alt = if ctx.options.enable_attributes {
                    handle_attributes(text, &mut el)
                } else {
                    text.to_string()
                };
                el.set("alt", unescape(&alt, stash));
                el
            }
        };
        Some(PatternOutput::Node(el))
    }
}
