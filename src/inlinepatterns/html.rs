use super::{InlinePattern, PatternOutput, StashedNodes, group, unescape_html};
use crate::context::Context;
use fancy_regex::{Captures, Regex};

/// Inline raw HTML and character entities, moved into the html stash.
///
/// `safe` entries survive every safe mode untouched.
pub struct HtmlPattern {
    regex: &'static Regex,
    safe: bool,
}

impl HtmlPattern {
    pub fn new(regex: &'static Regex, safe: bool) -> Self {
        Self { regex, safe }
    }
}

impl InlinePattern for HtmlPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let raw = unescape_html(group(caps, 2), stash, ctx);
        Some(PatternOutput::Text(ctx.html_stash.store(raw, self.safe)))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{ENTITY, HTML};
    use super::*;
    use crate::config::Options;
    use crate::registry::Registry;

    #[test]
    fn test_inline_html_is_stashed() {
        let options = Options::default();
        let registry = Registry::new();
        let mut ctx = Context::new(&options, &registry);
        let stash = StashedNodes::default();

        let caps = HTML.captures("a <span class=\"x\"> b").unwrap().unwrap();
        let out = HtmlPattern::new(&HTML, false).handle_match(&caps, &stash, &mut ctx);
        assert_eq!(out, Some(PatternOutput::Text(ctx.html_stash.get_placeholder(0))));
        assert_eq!(ctx.html_stash.get(0), Some(("<span class=\"x\">", false)));

        let caps = ENTITY.captures("AT&amp;T").unwrap().unwrap();
        HtmlPattern::new(&ENTITY, true).handle_match(&caps, &stash, &mut ctx);
        assert_eq!(ctx.html_stash.get(1), Some(("&amp;", true)));
    }
}
