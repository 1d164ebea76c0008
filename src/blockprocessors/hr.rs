use super::BlockProcessor;
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static HR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ ]{0,3}(?:(?:-+[ ]{0,2}){3,}|(?:_+[ ]{0,2}){3,}|(?:\*+[ ]{0,2}){3,})[ ]*").unwrap()
});

/// Byte span of the first rule line in `block`, if that line holds nothing else.
fn find_rule(block: &str) -> Option<(usize, usize)> {
    let m = HR_RE.find(block)?;
    let ends_line = m.end() == block.len() || block[m.end()..].starts_with('\n');
    ends_line.then_some((m.start(), m.end()))
}

/// Horizontal rules.
pub struct HrProcessor;

impl BlockProcessor for HrProcessor {
    fn name(&self) -> &'static str {
        "hr"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        find_rule(block).is_some()
    }

    fn run(
        &self,
        parser: &BlockParser,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        let Some(block) = blocks.pop_front() else {
            return Ok(());
        };
        let Some((start, end)) = find_rule(&block) else {
            blocks.push_front(block);
            return Ok(());
        };

        let prelines = block[..start].trim_end_matches('\n');
        if !prelines.is_empty() {
            parser.parse_block(parent, prelines.to_string(), ctx)?;
        }
        parent.sub_element("hr");

        let postlines = block[end..].trim_start_matches('\n');
        if !postlines.is_empty() {
            blocks.push_front(postlines.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_variants() {
        assert!(find_rule("---").is_some());
        assert!(find_rule("* * *").is_some());
        assert!(find_rule("   ___   ").is_some());
        assert!(find_rule("para\n- - -\nmore").is_some());
    }

    #[test]
    fn test_not_a_rule() {
        assert!(find_rule("--").is_none());
        assert!(find_rule("--- text").is_none());
        assert!(find_rule("- item").is_none());
    }
}
