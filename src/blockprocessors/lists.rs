use super::{BlockProcessor, is_list_tag};
use crate::block_parser::BlockParser;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use regex::Regex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::LazyLock;

static OL_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( *)\d+\.[ ]+(.*)").unwrap());
static UL_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( *)[*+-][ ]+(.*)").unwrap());
/// Any item marker; group 3 holds the ordinal of numbered items.
static CHILD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^( *)((\d+)\.|[*+-])[ ]+(.*)").unwrap());

fn leading_spaces(caps: &regex::Captures<'_>) -> usize {
    caps.get(1).map_or(0, |m| m.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }

    fn item_re(self) -> &'static Regex {
        match self {
            ListKind::Ordered => &OL_ITEM_RE,
            ListKind::Unordered => &UL_ITEM_RE,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Ordered and unordered lists.
///
/// A list that directly follows another list of the same kind (only blank
/// lines between) continues it as a loose list.
pub struct ListProcessor {
    kind: ListKind,
    tab_length: usize,
    lazy_ol: bool,
    indent: String,
}

impl ListProcessor {
    pub fn new(kind: ListKind, tab_length: usize, lazy_ol: bool) -> Self {
        Self {
            kind,
            tab_length,
            lazy_ol,
            indent: " ".repeat(tab_length),
        }
    }

    /// Splits a block into item texts and returns them with the first ordinal.
    fn get_items(&self, block: &str) -> (Vec<String>, String) {
        let mut items: Vec<String> = Vec::new();
        let mut start = "1".to_string();
        for line in block.split('\n') {
            let caps = CHILD_RE.captures(line);
            let spaces = caps.as_ref().map_or(0, leading_spaces);
            match caps {
                Some(caps) if spaces < self.tab_length => {
                    if items.is_empty() && self.kind == ListKind::Ordered {
                        if let Some(ordinal) = caps.get(3) {
                            start = ordinal.as_str().to_string();
                        }
                    }
                    items.push(caps.get(4).map_or("", |m| m.as_str()).to_string());
                }
                Some(_) if spaces < self.tab_length * 2 => match items.last_mut() {
                    // Nested list marker: keep it with its item, indentation intact.
                    Some(last) if last.starts_with(&self.indent) => {
                        last.push('\n');
                        last.push_str(line);
                    }
                    _ => items.push(line.to_string()),
                },
                _ => match items.last_mut() {
                    Some(last) => {
                        last.push('\n');
                        last.push_str(line);
                    }
                    None => items.push(line.to_string()),
                },
            }
        }
        (items, start)
    }

    fn parse_items(
        &self,
        parser: &BlockParser,
        list: &mut Element,
        items: impl Iterator<Item = String>,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()> {
        for item in items {
            if item.starts_with(&self.indent) && list.has_children() {
                if let Some(last) = list.last_child_mut() {
                    parser.parse_block(last, item, ctx)?;
                }
            } else {
                let li = list.sub_element("li");
                parser.parse_block(li, item, ctx)?;
            }
        }
        Ok(())
    }

    /// Turns the last item of an existing list into a loose item.
    fn loosen_last_item(item: &mut Element) {
        if !item.text.is_empty() {
            let text = std::mem::take(&mut item.text);
            item.insert(0, Element::with_text("p", text));
        }
        if let Some(last) = item.last_child_mut() {
            if !last.tail.is_empty() {
                let tail = std::mem::take(&mut last.tail);
                item.sub_element("p").text = tail.trim_start().to_string();
            }
        }
    }
}

impl BlockProcessor for ListProcessor {
    fn name(&self) -> &'static str {
        match self.kind {
            ListKind::Ordered => "olist",
            ListKind::Unordered => "ulist",
        }
    }

    fn test(&self, _parent: &Element, block: &str, _ctx: &Context<'_>) -> bool {
        self.kind
            .item_re()
            .captures(block)
            .is_some_and(|caps| leading_spaces(&caps) < self.tab_length)
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
        let (items, start) = self.get_items(&block);
        let mut items = items.into_iter();

        let continues_sibling = parent.last_child().is_some_and(|c| c.tag == self.kind.tag());
        let list: &mut Element = if continues_sibling {
            let Some(list) = parent.last_child_mut() else {
                return Ok(());
            };
            if let Some(item) = list.last_child_mut() {
                Self::loosen_last_item(item);
            }
            let li = list.sub_element("li");
            ctx.state.set("looselist");
            let first = items.next().map_or(Ok(()), |first| parser.parse_block(li, first, ctx));
            ctx.state.reset();
            first?;
            list
        } else if is_list_tag(&parent.tag) {
            parent
        } else {
            let list = parent.sub_element(self.kind.tag());
            if self.kind == ListKind::Ordered && !self.lazy_ol && start != "1" {
                list.set("start", start);
            }
            list
        };

        ctx.state.set("list");
        let result = self.parse_items(parser, list, items, ctx);
        ctx.state.reset();
        result
    }
}
