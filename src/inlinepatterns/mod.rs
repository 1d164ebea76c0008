//! Inline patterns.
//!
//! Every pattern is compiled as `^(.*?)PATTERN(.*)$` so group 1 is the text
//! before the match and the last group the text after it. The pattern's own
//! groups therefore start at 2. A handler returns either a replacement
//! string or a new element; the inline processor stashes it behind a
//! placeholder.

mod auto;
mod html;
mod links;
mod simple;

pub use auto::{AutolinkPattern, AutomailPattern};
pub use html::HtmlPattern;
pub use links::{ImagePattern, LinkPattern, ReferenceKind, ReferencePattern, sanitize_url};
pub use simple::{BacktickPattern, DoubleTagPattern, EscapePattern, SimpleTagPattern, SimpleTextPattern, SubstituteTagPattern};

use crate::config::{Options, SafeMode};
use crate::context::Context;
use crate::etree::Element;
use crate::registry::Registry;
use crate::serializer::serialize_element;
use crate::util::{INLINE_PLACEHOLDER_RE, html_placeholder_index, inline_placeholder};
use fancy_regex::{Captures, Regex};
use std::sync::LazyLock;

const NOBRACKET: &str = r"[^\]\[]*";
const NOIMG: &str = r"(?<!!)";

/// Bracketed link text with up to six levels of nested brackets.
static BRK: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"\[({}{}{})\]",
        format!(r"{NOBRACKET}(\[").repeat(6),
        format!(r"{NOBRACKET}\])*").repeat(6),
        NOBRACKET,
    )
});

pub const BACKTICK_RE: &str = r"(?<!\\)(`+)(.+?)(?<!`)\2(?!`)";
pub const ESCAPE_RE: &str = r"\\(.)";
pub const EMPHASIS_RE: &str = r"(\*)([^\*]+)\2";
pub const STRONG_RE: &str = r"(\*{2}|_{2})(.+?)\2";
pub const EM_STRONG_RE: &str = r"(\*|_)\2\2(.+?)\2(.*?)\2\2";
pub const STRONG_EM_RE: &str = r"(\*|_)\2\2(.+?)\2\2(.*?)\2";
pub const SMART_EMPHASIS_RE: &str = r"(?<!\w)(_)(?!_)(.+?)(?<!_)\2(?!\w)";
pub const EMPHASIS_2_RE: &str = r"(_)(.+?)\2";
pub const AUTOLINK_RE: &str = r"<((?:[Ff]|[Hh][Tt])[Tt][Pp][Ss]?://[^>]*)>";
pub const AUTOMAIL_RE: &str = r"<([^> !]*@[^> ]*)>";
pub const HTML_RE: &str = r"(<([a-zA-Z/][^>]*?|!--.*?--)>)";
pub const ENTITY_RE: &str = r"(&[#a-zA-Z0-9]*;)";
pub const LINE_BREAK_RE: &str = "  \n";
pub const NOT_STRONG_RE: &str = r"((^| )(\*|_)( |$))";

pub fn link_re() -> String {
    format!(
        r#"{NOIMG}{}\(\s*(<.*?>|((?:(?:\(.*?\))|[^\(\)]))*?)\s*((['"])(.*?)\12\s*)?\)"#,
        *BRK
    )
}

pub fn image_link_re() -> String {
    format!(r#"!{}\s*\((<.*?>|([^")]+"[^"]*"|[^\)]*))\)"#, *BRK)
}

pub fn reference_re() -> String {
    format!(r"{NOIMG}{}\s?\[([^\]]*)\]", *BRK)
}

pub fn image_reference_re() -> String {
    format!(r"!{}\s?\[([^\]]*)\]", *BRK)
}

pub fn short_ref_re() -> String {
    format!(r"{NOIMG}\[([^\]]+)\]")
}

/// Wraps `pattern` into its full-string form.
pub fn compile(pattern: &str) -> Result<Regex, fancy_regex::Error> {
    Regex::new(&format!(r"(?s)^(.*?){pattern}(.*)$"))
}

/// What a pattern produced for one match.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternOutput {
    Text(String),
    Node(Element),
}

/// Per-run storage behind inline placeholders.
#[derive(Debug, Default)]
pub struct StashedNodes {
    nodes: Vec<Option<PatternOutput>>,
}

impl StashedNodes {
    /// Stores `output` and returns its placeholder.
    pub fn stash(&mut self, output: PatternOutput) -> String {
        self.nodes.push(Some(output));
        inline_placeholder(self.nodes.len() - 1)
    }

    pub fn get(&self, id: usize) -> Option<&PatternOutput> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.get(id).is_some()
    }

    /// Text entries are copied; elements are moved out.
    pub fn take(&mut self, id: usize) -> Option<PatternOutput> {
        let slot = self.nodes.get_mut(id)?;
        match slot {
            Some(PatternOutput::Text(text)) => Some(PatternOutput::Text(text.clone())),
            Some(PatternOutput::Node(_)) => slot.take(),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// One entry of the inline pattern chain.
pub trait InlinePattern: Send + Sync {
    /// The compiled `^(.*?)PATTERN(.*)$` expression.
    fn regex(&self) -> &Regex;

    /// Builds the replacement for a match, or `None` to leave the text as is.
    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, ctx: &mut Context<'_>) -> Option<PatternOutput>;
}

/// Text of group `index`, empty when the group did not take part.
pub(crate) fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

/// Replaces inline placeholders in `text` with the plain text they stand for.
pub fn unescape(text: &str, stash: &StashedNodes) -> String {
    INLINE_PLACEHOLDER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let id = caps[1].parse::<usize>().ok();
            match id.and_then(|id| stash.get(id)) {
                Some(PatternOutput::Text(value)) => value.clone(),
                Some(PatternOutput::Node(node)) => unescape(&node.itertext(), stash),
                None => String::new(),
            }
        })
        .into_owned()
}

/// Replaces inline placeholders in `text` with serialized markup.
///
/// Raw HTML already moved to the html stash is put back in place, so the
/// result never holds an html stash placeholder.
pub fn unescape_html(text: &str, stash: &StashedNodes, ctx: &Context<'_>) -> String {
    INLINE_PLACEHOLDER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let id = caps[1].parse::<usize>().ok();
            match id.and_then(|id| stash.get(id)) {
                Some(PatternOutput::Text(value)) => match html_placeholder_index(value).and_then(|i| ctx.html_stash.get(i)) {
                    Some((html, _)) => html.to_string(),
                    None => format!("\\{value}"),
                },
                // Placeholders inside a node always refer to earlier entries.
                Some(PatternOutput::Node(node)) => {
                    unescape_html(&serialize_element(node, ctx.options.output_format), stash, ctx)
                }
                None => String::new(),
            }
        })
        .into_owned()
}

static ATTR_RE: LazyLock<regex::Regex> = LazyLock::new(|| regex::Regex::new(r"\{@([^\}]*)=([^\}]*)\}").unwrap());

/// Moves `{@key=value}` annotations from `text` onto `element`.
pub fn handle_attributes(text: &str, element: &mut Element) -> String {
    ATTR_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            element.set(&caps[1], caps[2].replace('\n', " "));
            String::new()
        })
        .into_owned()
}

macro_rules! compiled {
    ($name:ident, $source:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| compile(&$source).unwrap());
    };
}

compiled!(BACKTICK, BACKTICK_RE);
compiled!(ESCAPE, ESCAPE_RE);
compiled!(REFERENCE, reference_re());
compiled!(LINK, link_re());
compiled!(IMAGE_LINK, image_link_re());
compiled!(IMAGE_REFERENCE, image_reference_re());
compiled!(SHORT_REFERENCE, short_ref_re());
compiled!(AUTOLINK, AUTOLINK_RE);
compiled!(AUTOMAIL, AUTOMAIL_RE);
compiled!(LINE_BREAK, LINE_BREAK_RE);
compiled!(HTML, HTML_RE);
compiled!(ENTITY, ENTITY_RE);
compiled!(NOT_STRONG, NOT_STRONG_RE);
compiled!(EM_STRONG, EM_STRONG_RE);
compiled!(STRONG_EM, STRONG_EM_RE);
compiled!(STRONG, STRONG_RE);
compiled!(EMPHASIS, EMPHASIS_RE);
compiled!(SMART_EMPHASIS, SMART_EMPHASIS_RE);
compiled!(EMPHASIS_2, EMPHASIS_2_RE);

/// Builds the default inline pattern chain for `options`.
pub fn build_inline_patterns(options: &Options) -> Registry<Box<dyn InlinePattern>> {
    let mut patterns: Registry<Box<dyn InlinePattern>> = Registry::new();
    patterns.append("backtick", Box::new(BacktickPattern::new(&BACKTICK)));
    patterns.append("escape", Box::new(EscapePattern::new(&ESCAPE)));
    patterns.append("reference", Box::new(ReferencePattern::new(&REFERENCE, ReferenceKind::Link)));
    patterns.append("link", Box::new(LinkPattern::new(&LINK)));
    patterns.append("image_link", Box::new(ImagePattern::new(&IMAGE_LINK)));
    patterns.append(
        "image_reference",
        Box::new(ReferencePattern::new(&IMAGE_REFERENCE, ReferenceKind::Image)),
    );
    patterns.append(
        "short_reference",
        Box::new(ReferencePattern::new(&SHORT_REFERENCE, ReferenceKind::Link)),
    );
    patterns.append("autolink", Box::new(AutolinkPattern::new(&AUTOLINK)));
    patterns.append("automail", Box::new(AutomailPattern::new(&AUTOMAIL)));
    patterns.append("linebreak", Box::new(SubstituteTagPattern::new(&LINE_BREAK, "br")));
    if options.safe_mode != SafeMode::Escape {
        patterns.append("html", Box::new(HtmlPattern::new(&HTML, false)));
    }
    patterns.append("entity", Box::new(HtmlPattern::new(&ENTITY, true)));
    patterns.append("not_strong", Box::new(SimpleTextPattern::new(&NOT_STRONG)));
    patterns.append("em_strong", Box::new(DoubleTagPattern::new(&EM_STRONG, "strong", "em")));
    patterns.append("strong_em", Box::new(DoubleTagPattern::new(&STRONG_EM, "em", "strong")));
    patterns.append("strong", Box::new(SimpleTagPattern::new(&STRONG, "strong")));
    patterns.append("emphasis", Box::new(SimpleTagPattern::new(&EMPHASIS, "em")));
    let emphasis2: &'static Regex = if options.smart_emphasis { &SMART_EMPHASIS } else { &EMPHASIS_2 };
    patterns.append("emphasis2", Box::new(SimpleTagPattern::new(emphasis2, "em")));
    log::debug!("[rumdown-inline] Built {} inline patterns", patterns.len());
    patterns
}
