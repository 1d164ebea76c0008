use super::{InlinePattern, PatternOutput, StashedNodes, group};
use crate::context::Context;
use crate::etree::Element;
use crate::util::{ESCAPED_CHARS, ETX, INLINE_PLACEHOLDER_PREFIX, STX};
use fancy_regex::{Captures, Regex};

/// Returns group 2 as plain text.
pub struct SimpleTextPattern {
    regex: &'static Regex,
}

impl SimpleTextPattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for SimpleTextPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, _stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let text = group(caps, 2);
        (text != INLINE_PLACEHOLDER_PREFIX).then(|| PatternOutput::Text(text.to_string()))
    }
}

/// Backslash escapes. Known characters become `STX codepoint ETX`.
pub struct EscapePattern {
    regex: &'static Regex,
}

impl EscapePattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for EscapePattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, _stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let c = group(caps, 2).chars().next()?;
        ESCAPED_CHARS
            .contains(&c)
            .then(|| PatternOutput::Text(format!("{STX}{}{ETX}", u32::from(c))))
    }
}

/// Wraps group 3 in `tag`.
pub struct SimpleTagPattern {
    regex: &'static Regex,
    tag: &'static str,
}

impl SimpleTagPattern {
    pub fn new(regex: &'static Regex, tag: &'static str) -> Self {
        Self { regex, tag }
    }
}

impl InlinePattern for SimpleTagPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, _stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        Some(PatternOutput::Node(Element::with_text(self.tag, group(caps, 3))))
    }
}

/// Replaces the match with an empty `tag`.
pub struct SubstituteTagPattern {
    regex: &'static Regex,
    tag: &'static str,
}

impl SubstituteTagPattern {
    pub fn new(regex: &'static Regex, tag: &'static str) -> Self {
        Self { regex, tag }
    }
}

impl InlinePattern for SubstituteTagPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, _caps: &Captures<'_>, _stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        Some(PatternOutput::Node(Element::new(self.tag)))
    }
}

/// Code spans. The content is final.
pub struct BacktickPattern {
    regex: &'static Regex,
}

impl BacktickPattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for BacktickPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, _stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let mut code = Element::with_text("code", group(caps, 3).trim());
        code.atomic = true;
        Some(PatternOutput::Node(code))
    }
}

/// Two nested tags, as in `***strong em***`. Group 4, when present, becomes
/// the inner element's tail.
pub struct DoubleTagPattern {
    regex: &'static Regex,
    outer: &'static str,
    inner: &'static str,
}

impl DoubleTagPattern {
    pub fn new(regex: &'static Regex, outer: &'static str, inner: &'static str) -> Self {
        Self { regex, outer, inner }
    }
}

impl InlinePattern for DoubleTagPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, _stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let mut outer = Element::new(self.outer);
        let inner = outer.sub_element(self.inner);
        inner.text = group(caps, 3).to_string();
        // prefix, delimiter, content, middle text, suffix
        if caps.len() == 6 {
            inner.tail = group(caps, 4).to_string();
        }
        Some(PatternOutput::Node(outer))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{BACKTICK, EM_STRONG, ESCAPE, NOT_STRONG, STRONG_EM};
    use super::*;
    use crate::config::Options;
    use crate::registry::Registry;

    fn run(pattern: &dyn InlinePattern, text: &str) -> Option<PatternOutput> {
        let options = Options::default();
        let registry = Registry::new();
        let mut ctx = Context::new(&options, &registry);
        let caps = pattern.regex().captures(text).unwrap().unwrap();
        pattern.handle_match(&caps, &StashedNodes::default(), &mut ctx)
    }

    #[test]
    fn test_escape_known_and_unknown() {
        let pattern = EscapePattern::new(&ESCAPE);
        assert_eq!(run(&pattern, r"\*"), Some(PatternOutput::Text("\u{2}42\u{3}".to_string())));
        assert_eq!(run(&pattern, r"\q"), None);
    }

    #[test]
    fn test_backtick_trims_and_is_atomic() {
        let Some(PatternOutput::Node(code)) = run(&BacktickPattern::new(&BACKTICK), "`` a*b ``") else {
            panic!("expected a node");
        };
        assert_eq!(code.text, "a*b");
        assert!(code.atomic);
    }

    #[test]
    fn test_double_tags() {
        let Some(PatternOutput::Node(el)) = run(&DoubleTagPattern::new(&EM_STRONG, "strong", "em"), "***a* b**") else {
            panic!("expected a node");
        };
        assert_eq!(el.tag, "strong");
        assert_eq!(el.children[0].tag, "em");
        assert_eq!(el.children[0].text, "a");
        assert_eq!(el.children[0].tail, " b");

        let Some(PatternOutput::Node(el)) = run(&DoubleTagPattern::new(&STRONG_EM, "em", "strong"), "***a** b*") else {
            panic!("expected a node");
        };
        assert_eq!(el.tag, "em");
        assert_eq!(el.children[0].tail, " b");
    }

    #[test]
    fn test_lone_marker_is_text() {
        assert_eq!(
            run(&SimpleTextPattern::new(&NOT_STRONG), "a * b"),
            Some(PatternOutput::Text(" * ".to_string()))
        );
    }
}
