use super::BlockProcessor;
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use std::collections::VecDeque;

/// Fallback processor: everything else is a paragraph.
///
/// Inside a tight list the text is attached loosely, as the tail of the last
/// child or as the parent's own text, without a `p` wrapper.
pub struct ParagraphProcessor;

impl BlockProcessor for ParagraphProcessor {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn test(&self, _parent: &Element, _block: &str, _ctx: &Context<'_>) -> bool {
        true
    }

    fn run(
        &self,
        _parser: &BlockParser,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        let Some(block) = blocks.pop_front() else {
            return Ok(());
        };
        if block.trim().is_empty() {
            return Ok(());
        }

        if !ctx.state.is_state("list") {
            parent.sub_element("p").text = block.trim_start().to_string();
            return Ok(());
        }

        if let Some(sibling) = parent.last_child_mut() {
            sibling.tail.push('\n');
            sibling.tail.push_str(&block);
        } else if parent.text.is_empty() {
            parent.text = block.trim_start().to_string();
        } else {
            parent.text.push('\n');
            parent.text.push_str(&block);
        }
        Ok(())
    }
}
