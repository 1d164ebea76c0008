use super::{BlockProcessor, detab};
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use std::collections::VecDeque;

/// Indented code blocks.
pub struct CodeBlockProcessor {
    tab_length: usize,
    indent: String,
}

impl CodeBlockProcessor {
    pub fn new(tab_length: usize) -> Self {
        Self {
            tab_length,
            indent: " ".repeat(tab_length),
        }
    }
}

impl BlockProcessor for CodeBlockProcessor {
    fn name(&self) -> &'static str {
        "code"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        block.starts_with(&self.indent)
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
        let (body, rest) = detab(&block, self.tab_length);

        if parent.last_child().is_some_and(Element::is_code_block) {
            // Continue the previous block; the blank line between them is kept.
            if let Some(code) = parent.last_child_mut().and_then(|pre| pre.children.first_mut()) {
                code.text = format!("{}\n{}\n", code.text, body.trim_end());
            }
        } else {
            let pre = parent.sub_element("pre");
            let code = pre.sub_element("code");
            code.text = format!("{}\n", body.trim_end());
            code.atomic = true;
        }

        if !rest.is_empty() {
            blocks.push_front(rest);
        }
        Ok(())
    }
}
