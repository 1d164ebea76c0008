use super::{InlinePattern, PatternOutput, StashedNodes, group, unescape};
use crate::context::Context;
use crate::etree::Element;
use crate::util::AMP_SUBSTITUTE;
use fancy_regex::{Captures, Regex};
use std::fmt::Write;

/// `<http://example.com>`
pub struct AutolinkPattern {
    regex: &'static Regex,
}

impl AutolinkPattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for AutolinkPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let target = group(caps, 2);
        let mut el = Element::with_text("a", target);
        el.set("href", unescape(target, stash));
        el.atomic = true;
        Some(PatternOutput::Node(el))
    }
}

fn entity_name(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("quot"),
        '&' => Some("amp"),
        '<' => Some("lt"),
        '>' => Some("gt"),
        '\u{a0}' => Some("nbsp"),
        '\u{a9}' => Some("copy"),
        '\u{ae}' => Some("reg"),
        _ => None,
    }
}

/// `<someone@example.com>`, obfuscated as character references.
pub struct AutomailPattern {
    regex: &'static Regex,
}

impl AutomailPattern {
    pub fn new(regex: &'static Regex) -> Self {
        Self { regex }
    }
}

impl InlinePattern for AutomailPattern {
    fn regex(&self) -> &Regex {
        self.regex
    }

    fn handle_match(&self, caps: &Captures<'_>, stash: &StashedNodes, _ctx: &mut Context<'_>) -> Option<PatternOutput> {
        let email = unescape(group(caps, 2), stash);
        let email = email.strip_prefix("mailto:").unwrap_or(&email);

        let mut text = String::new();
        for c in email.chars() {
            match entity_name(c) {
                Some(name) => {
                    let _ = write!(text, "{AMP_SUBSTITUTE}{name};");
                }
                None => {
                    let _ = write!(text, "{AMP_SUBSTITUTE}#{};", u32::from(c));
                }
            }
        }
        let mut href = String::new();
        for c in "mailto:".chars().chain(email.chars()) {
            let _ = write!(href, "{AMP_SUBSTITUTE}#{};", u32::from(c));
        }

        let mut el = Element::with_text("a", text);
        el.set("href", href);
        el.atomic = true;
        Some(PatternOutput::Node(el))
    }
}

#[cfg(test)]
mod tests {
    use super::super::AUTOMAIL;
    use super::*;
    use crate::config::Options;
    use crate::registry::Registry;

    #[test]
    fn test_automail_encodes_every_character() {
        let options = Options::default();
        let registry = Registry::new();
        let mut ctx = Context::new(&options, &registry);
        let caps = AUTOMAIL.captures("<mailto:a@b>").unwrap().unwrap();
        let Some(PatternOutput::Node(el)) = AutomailPattern::new(&AUTOMAIL).handle_match(&caps, &StashedNodes::default(), &mut ctx) else {
            panic!("expected a node");
        };
        let amp = AMP_SUBSTITUTE;
        assert_eq!(el.text, format!("{amp}#97;{amp}#64;{amp}#98;"));
        assert!(el.get("href").is_some_and(|h| h.starts_with(&format!("{amp}#109;"))));
        assert!(el.atomic);
    }
}
