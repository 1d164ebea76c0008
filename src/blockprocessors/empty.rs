use super::BlockProcessor;
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use std::collections::VecDeque;

/// Consumes blank lines. Blank lines following a code block belong to it.
pub struct EmptyBlockProcessor;

impl BlockProcessor for EmptyBlockProcessor {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        block.is_empty() || block.starts_with('\n')
    }

    fn run(
        &self,
        _parser: &BlockParser,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        _ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        let Some(block) = blocks.pop_front() else {
            return Ok(());
        };
        let filler = if block.is_empty() {
            "\n\n"
        } else {
            let rest = &block[1..];
            if !rest.is_empty() {
                blocks.push_front(rest.to_string());
            }
            "\n"
        };
        if let Some(sibling) = parent.last_child_mut()
            && sibling.is_code_block()
            && let Some(code) = sibling.children.first_mut()
        {
            code.text.push_str(filler);
        }
        Ok(())
    }
}
