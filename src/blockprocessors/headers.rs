use super::BlockProcessor;
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

static HASH_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\n)(?P<level>#{1,6})(?P<header>.*?)#*(?:\n|$)").unwrap());

static SETEXT_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\n]*\n[=-]+[ ]*(?:\n|$)").unwrap());

/// ATX headers (`# Title`), which may sit anywhere inside a block.
pub struct HashHeaderProcessor;

impl BlockProcessor for HashHeaderProcessor {
    fn name(&self) -> &'static str {
        "hash_header"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        HASH_HEADER_RE.is_match(block)
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
        let Some(caps) = HASH_HEADER_RE.captures(&block) else {
            log::warn!("[rumdown-block] We've got a problem header: {block:?}");
            return Ok(());
        };
        let (start, end) = caps.get(0).map_or((0, 0), |m| (m.start(), m.end()));
        let level = caps.name("level").map_or(1, |m| m.as_str().len());
        let header = caps.name("header").map_or("", |m| m.as_str()).trim().to_string();

        let before = &block[..start];
        if !before.is_empty() {
            parser.parse_block(parent, before.to_string(), ctx)?;
        }
        parent.sub_element(format!("h{level}")).text = header;

        let after = &block[end..];
        if !after.is_empty() {
            blocks.push_front(after.to_string());
        }
        Ok(())
    }
}

/// Underlined headers (`Title\n=====`).
pub struct SetextHeaderProcessor;

impl BlockProcessor for SetextHeaderProcessor {
    fn name(&self) -> &'static str {
        "setext_header"
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        SETEXT_HEADER_RE.is_match(block)
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
        let lines: Vec<&str> = block.split('\n').collect();
        let level = if lines.get(1).is_some_and(|l| l.starts_with('=')) { 1 } else { 2 };
        parent.sub_element(format!("h{level}")).text = lines[0].trim().to_string();
        if lines.len() > 2 {
            blocks.push_front(lines[2..].join("\n"));
        }
        Ok(())
    }
}
