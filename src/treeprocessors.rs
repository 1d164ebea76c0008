//! Passes over the finished block tree.
//!
//! `inline` expands inline markup inside every text and tail; `prettify`
//! adds the newlines that make the serialized output readable.

use crate::config::Options;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use crate::inlinepatterns::{InlinePattern, PatternOutput, StashedNodes, handle_attributes};
use crate::registry::Registry;
use crate::util::{INLINE_PLACEHOLDER_PREFIX, INLINE_PLACEHOLDER_RE, is_blank, is_block_level};

pub trait Treeprocessor: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, root: &mut Element, ctx: &mut Context<'_>) -> MarkdownResult<()>;
}

/// Builds the default tree processor chain.
pub fn build_treeprocessors(_options: &Options) -> Registry<Box<dyn Treeprocessor>> {
    let mut registry: Registry<Box<dyn Treeprocessor>> = Registry::new();
    registry.append("inline", Box::new(InlineProcessor));
    registry.append("prettify", Box::new(PrettifyTreeprocessor));
    registry
}

/// Runs the inline pattern chain over every text and tail in the tree.
pub struct InlineProcessor;

impl Treeprocessor for InlineProcessor {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn run(&self, root: &mut Element, ctx: &mut Context<'_>) -> MarkdownResult<()> {
        let patterns = ctx.inline_patterns;
        let mut inliner = Inliner {
            patterns,
            ctx,
            stash: StashedNodes::default(),
        };
        inliner.process_tree(root);
        log::debug!("[rumdown-inline] Resolved {} stashed inline nodes", inliner.stash.len());
        Ok(())
    }
}

/// State of one inline run.
struct Inliner<'r, 'c, 'a> {
    patterns: &'r Registry<Box<dyn InlinePattern>>,
    ctx: &'c mut Context<'a>,
    stash: StashedNodes,
}

impl Inliner<'_, '_, '_> {
    /// Applies patterns from `pattern_index` on until none matches.
    fn handle_inline(&mut self, mut data: String, mut pattern_index: usize) -> String {
        let patterns = self.patterns;
        let mut start = 0;
        while let Some(pattern) = patterns.at(pattern_index) {
            let (next, matched, next_start) = self.apply_pattern(pattern.as_ref(), data, pattern_index, start);
            data = next;
            // A declined match must move the scan forward.
            if matched && (next_start == 0 || next_start > start) {
                start = next_start;
            } else {
                pattern_index += 1;
                start = 0;
            }
        }
        data
    }

    /// Tries one pattern at `start`. Returns the new text, whether the
    /// pattern matched, and where to resume.
    fn apply_pattern(
        &mut self,
        pattern: &dyn InlinePattern,
        data: String,
        pattern_index: usize,
        start: usize,
    ) -> (String, bool, usize) {
        let caps = match pattern.regex().captures(&data[start..]) {
            Ok(Some(caps)) => caps,
            Ok(None) => return (data, false, 0),
            Err(err) => {
                log::warn!("[rumdown-inline] Pattern #{pattern_index} gave up: {err}");
                return (data, false, 0);
            }
        };
        let last = caps.len() - 1;
        let prefix = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let (suffix, suffix_start) = caps.get(last).map_or((String::new(), 0), |m| (m.as_str().to_string(), m.start()));

        let output = pattern.handle_match(&caps, &self.stash, self.ctx);
        drop(caps);

        let output = match output {
            None => return (data, true, start + suffix_start),
            Some(PatternOutput::Node(mut node)) if !node.atomic => {
                node.text = self.handle_inline(std::mem::take(&mut node.text), pattern_index + 1);
                if !node.tail.is_empty() {
                    node.tail = self.handle_inline(std::mem::take(&mut node.tail), pattern_index);
                }
                for child in &mut node.children {
                    if !child.atomic && !child.text.is_empty() {
                        child.text = self.handle_inline(std::mem::take(&mut child.text), pattern_index + 1);
                    }
                    if !child.tail.is_empty() {
                        child.tail = self.handle_inline(std::mem::take(&mut child.tail), pattern_index);
                    }
                }
                PatternOutput::Node(node)
            }
            Some(other) => other,
        };

        let placeholder = self.stash.stash(output);
        (format!("{}{prefix}{placeholder}{suffix}", &data[..start]), true, 0)
    }

    /// Splits placeholder-laden `data` into elements.
    ///
    /// Literal runs go to the tail of the previous result, or to `parent`'s
    /// text (`is_text`) or tail when there is no result yet.
    fn process_placeholders(&mut self, data: &str, parent: &mut Element, is_text: bool) -> Vec<Element> {
        let mut result: Vec<Element> = Vec::new();
        let mut start = 0;
        loop {
            let Some(offset) = data[start..].find(INLINE_PLACEHOLDER_PREFIX) else {
                link_text(&mut result, parent, is_text, &data[start..]);
                break;
            };
            let index = start + offset;
            let found = find_placeholder(data, index).filter(|(id, _)| self.stash.contains(*id));
            let Some((id, end)) = found else {
                let end = index + INLINE_PLACEHOLDER_PREFIX.len();
                link_text(&mut result, parent, is_text, &data[start..end]);
                start = end;
                continue;
            };

            link_text(&mut result, parent, is_text, &data[start..index]);
            match self.stash.take(id) {
                Some(PatternOutput::Text(text)) => link_text(&mut result, parent, is_text, &text),
                Some(PatternOutput::Node(node)) => result.push(self.expand_node(node)),
                None => {}
            }
            start = end;
        }
        result
    }

    /// Expands placeholders left in a stashed element's own text and in its
    /// children's text and tails.
    fn expand_node(&mut self, mut node: Element) -> Element {
        let children = std::mem::take(&mut node.children);
        let mut expanded = Vec::with_capacity(children.len());

        // Atomic text may still hold placeholders from earlier patterns.
        if !is_blank(&node.text) {
            let text = std::mem::take(&mut node.text);
            expanded = self.process_placeholders(&text, &mut node, true);
        }
        for mut child in children {
            let mut after = Vec::new();
            if !is_blank(&child.tail) {
                let tail = std::mem::take(&mut child.tail);
                after = self.process_placeholders(&tail, &mut child, false);
            }
            if !is_blank(&child.text) {
                let text = std::mem::take(&mut child.text);
                let inner = self.process_placeholders(&text, &mut child, true);
                child.children.splice(0..0, inner);
            }
            expanded.push(child);
            expanded.extend(after);
        }
        node.children = expanded;
        node
    }

    /// Walks the tree with an explicit worklist of child-index paths.
    ///
    /// Each entry carries how many leading children were created by the
    /// inline pass; those are already fully expanded and are skipped.
    fn process_tree(&mut self, root: &mut Element) {
        let enable_attributes = self.ctx.options.enable_attributes;
        let mut stack: Vec<(Vec<usize>, usize)> = vec![(Vec::new(), 0)];

        while let Some((path, skip)) = stack.pop() {
            let Some(current) = root.descendant_mut(&path) else {
                continue;
            };
            let mut i = skip;
            while i < current.children.len() {
                let had_children = current.children[i].has_children();
                let mut created = 0;

                let child = &mut current.children[i];
                if !child.atomic && !child.text.is_empty() {
                    let text = std::mem::take(&mut child.text);
                    let data = self.handle_inline(text, 0);
                    let mut new_children = self.process_placeholders(&data, child, true);
                    if enable_attributes {
                        child.text = handle_attributes(&std::mem::take(&mut child.text), child);
                        for new_child in &mut new_children {
                            new_child.tail = handle_attributes(&std::mem::take(&mut new_child.tail), child);
                            new_child.text = handle_attributes(&std::mem::take(&mut new_child.text), new_child);
                        }
                    }
                    created = new_children.len();
                    child.children.splice(0..0, new_children);
                }

                let mut inserted = 0;
                if !child.tail.is_empty() {
                    let tail = std::mem::take(&mut child.tail);
                    let data = self.handle_inline(tail, 0);
                    let mut dummy = Element::new("d");
                    let siblings = self.process_placeholders(&data, &mut dummy, false);
                    current.children[i].tail = dummy.tail;
                    inserted = siblings.len();
                    current.children.splice(i + 1..i + 1, siblings);
                }

                if had_children {
                    let mut child_path = path.clone();
                    child_path.push(i);
                    stack.push((child_path, created));
                }
                i += 1 + inserted;
            }
        }
    }
}

fn link_text(result: &mut [Element], parent: &mut Element, is_text: bool, text: &str) {
    if text.is_empty() {
        return;
    }
    match result.last_mut() {
        Some(last) => last.tail.push_str(text),
        None if is_text => parent.text.push_str(text),
        None => parent.tail.push_str(text),
    }
}

/// Parses the placeholder starting at `index`; returns its id and end.
fn find_placeholder(data: &str, index: usize) -> Option<(usize, usize)> {
    let caps = INLINE_PLACEHOLDER_RE.captures(&data[index..])?;
    let whole = caps.get(0)?;
    if whole.start() != 0 {
        return None;
    }
    let id = caps.get(1)?.as_str().parse().ok()?;
    Some((id, index + whole.end()))
}

/// Adds line breaks around block-level elements.
pub struct PrettifyTreeprocessor;

impl PrettifyTreeprocessor {
    fn prettify(element: &mut Element) {
        if is_block_level(&element.tag) && element.tag != "code" && element.tag != "pre" {
            let first_is_block = element.children.first().is_some_and(|c| is_block_level(&c.tag));
            if is_blank(&element.text) && first_is_block {
                element.text = "\n".to_string();
            }
            for child in &mut element.children {
                if is_block_level(&child.tag) {
                    Self::prettify(child);
                }
            }
        }
        if is_blank(&element.tail) {
            element.tail = "\n".to_string();
        }
    }
}

impl Treeprocessor for PrettifyTreeprocessor {
    fn name(&self) -> &'static str {
        "prettify"
    }

    fn run(&self, root: &mut Element, _ctx: &mut Context<'_>) -> MarkdownResult<()> {
        Self::prettify(root);
        root.walk_mut(&mut |el: &mut Element| {
            if el.tag == "br" {
                if is_blank(&el.tail) {
                    el.tail = "\n".to_string();
                } else {
                    el.tail.insert(0, '\n');
                }
            } else if el.is_code_block() {
                if let Some(code) = el.children.first_mut() {
                    code.text = format!("{}\n", code.text.trim_end());
                }
            }
        });
        Ok(())
    }
}
