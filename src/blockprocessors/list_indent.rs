use super::{BlockProcessor, descend_last, is_list_tag, loose_detab};
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use std::collections::VecDeque;

/// Indented continuation blocks that belong to a list item.
///
/// Runs before the code block processor so that indented text following a
/// list nests into the matching `li` instead of becoming code.
pub struct ListIndentProcessor {
    tab_length: usize,
    indent: String,
}

impl ListIndentProcessor {
    pub fn new(tab_length: usize) -> Self {
        Self {
            tab_length,
            indent: " ".repeat(tab_length),
        }
    }

    /// Nesting level of `block` relative to `parent`, plus how many last
    /// children to follow to reach the element that receives it.
    fn get_level(&self, parent: &Element, block: &str, ctx: &Context<'_>) -> (usize, usize) {
        let spaces = block.len() - block.trim_start_matches(' ').len();
        let indent_level = spaces / self.tab_length;
        let mut level = usize::from(ctx.state.is_state("list"));
        let mut depth = 0;
        let mut current = parent;
        while indent_level > level {
            match current.last_child() {
                Some(child) if is_list_tag(&child.tag) || child.tag == "li" => {
                    if is_list_tag(&child.tag) {
                        level += 1;
                    }
                    depth += 1;
                    current = child;
                }
                _ => break,
            }
        }
        (level, depth)
    }
}

impl BlockProcessor for ListIndentProcessor {
    fn name(&self) -> &'static str {
        "indent"
    }

    fn test(&self, parent: &Element, block: &str, ctx: &Context<'_>) -> bool {
        block.starts_with(&self.indent)
            && !ctx.state.is_state("detabbed")
            && (parent.tag == "li" || parent.last_child().is_some_and(|c| is_list_tag(&c.tag)))
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
        let (level, depth) = self.get_level(parent, &block, ctx);
        let block = loose_detab(&block, level, self.tab_length);

        ctx.state.set("detabbed");
        let result = self.place(parser, parent, depth, block, ctx);
        ctx.state.reset();
        result
    }
}

impl ListIndentProcessor {
    fn place(
        &self,
        parser: &BlockParser,
        parent: &mut Element,
        depth: usize,
        block: String,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        if parent.tag == "li" {
            // A nested list whose first item was already parsed takes the block.
            let nested_list = parent.last_child().is_some_and(|c| is_list_tag(&c.tag));
            return match parent.last_child_mut() {
                Some(list) if nested_list => parser.parse_block(list, block, ctx),
                _ => parser.parse_block(parent, block, ctx),
            };
        }

        let sibling = descend_last(parent, depth);
        if sibling.tag == "li" {
            return parser.parse_block(sibling, block, ctx);
        }

        if sibling.last_child().is_some_and(|c| c.tag == "li") {
            let Some(item) = sibling.last_child_mut() else {
                return Ok(());
            };
            if !item.text.is_empty() {
                let text = std::mem::take(&mut item.text);
                item.insert(0, Element::with_text("p", text));
            }
            return parser.parse_chunk(item, &block, ctx);
        }

        let item = sibling.sub_element("li");
        parser.parse_block(item, block, ctx)
    }
}
