use super::BlockProcessor;
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static QUOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(^|\n)[ ]{0,3}>[ ]?(.*)").unwrap());

/// Strips the quote marker from one line.
fn clean(line: &str) -> &str {
    if line.trim() == ">" {
        return "";
    }
    match QUOTE_RE.captures(line) {
        Some(caps) => caps.get(2).map_or("", |m| m.as_str()),
        None => line,
    }
}

/// `>` block quotes. Consecutive quote blocks merge into one element.
pub struct BlockQuoteProcessor;

impl BlockProcessor for BlockQuoteProcessor {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        QUOTE_RE.is_match(block)
    }

    fn run(
        &self,
        parser: &BlockParser,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        let Some(mut block) = blocks.pop_front() else {
            return Ok(());
        };
        if let Some(m) = QUOTE_RE.find(&block) {
            // Lines before the quote are ordinary blocks.
            parser.parse_block(parent, block[..m.start()].to_string(), ctx)?;
            block = block[m.start()..].split('\n').map(clean).collect::<Vec<_>>().join("\n");
        }

        if !parent.last_child().is_some_and(|c| c.tag == "blockquote") {
            parent.sub_element("blockquote");
        }
        let Some(quote) = parent.last_child_mut() else {
            return Ok(());
        };
        ctx.state.set("blockquote");
        let result = parser.parse_chunk(quote, &block, ctx);
        ctx.state.reset();
        result
    }
}
