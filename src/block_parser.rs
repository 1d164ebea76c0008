//! Recursive block parser.
//!
//! Text is cut into blocks at blank lines. For every block the processor
//! chain is consulted in priority order; the first processor whose `test`
//! accepts the front block runs and may push leftover text back onto the
//! queue. Processors recurse into the parser for nested content.

use crate::blockprocessors::BlockProcessor;
use crate::context::Context;
use crate::error::{MarkdownError, MarkdownResult};
use crate::etree::Element;
use crate::registry::Registry;
use std::collections::VecDeque;

/// Tag of the root element handed to the tree processors.
pub const ROOT_TAG: &str = "div";

pub struct BlockParser {
    pub processors: Registry<Box<dyn BlockProcessor>>,
}

impl BlockParser {
    pub fn new(processors: Registry<Box<dyn BlockProcessor>>) -> Self {
        Self { processors }
    }

    /// Parses the whole document into a fresh root element.
    pub fn parse_document(&self, lines: &[String], ctx: &mut Context<'_>) -> MarkdownResult<Element> {
        let mut root = Element::new(ROOT_TAG);
        self.parse_chunk(&mut root, &lines.join("\n"), ctx)?;
        Ok(root)
    }

    /// Splits `text` at blank lines and parses the blocks into `parent`.
    pub fn parse_chunk(&self, parent: &mut Element, text: &str, ctx: &mut Context<'_>) -> MarkdownResult<()> {
        let mut blocks: VecDeque<String> = text.split("\n\n").map(String::from).collect();
        self.parse_blocks(parent, &mut blocks, ctx)
    }

    /// Convenience for the common single-block recursion.
    pub fn parse_block(&self, parent: &mut Element, block: String, ctx: &mut Context<'_>) -> MarkdownResult<()> {
        let mut blocks = VecDeque::from([block]);
        self.parse_blocks(parent, &mut blocks, ctx)
    }

    /// Runs the processor chain until the queue is empty.
    pub fn parse_blocks(
        &self,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        while let Some(front) = blocks.front() {
            let Some(processor) = self.processors.iter().find(|p| p.test(parent, front, ctx)) else {
                log::warn!("[rumdown-block] No block processor accepted {front:?}; dropping it");
                blocks.pop_front();
                continue;
            };

            let queued = blocks.len();
            let snapshot = front.clone();
            processor.run(self, parent, blocks, ctx)?;

            let stalled = blocks.len() > queued || (blocks.len() == queued && blocks.front() == Some(&snapshot));
            if stalled {
                return Err(MarkdownError::StalledProcessor {
                    processor: processor.name().to_string(),
                    block: snapshot,
                });
            }
        }
        Ok(())
    }
}
