//! Per-conversion state.
//!
//! Every `convert` call builds a fresh [`Context`] and threads it by `&mut`
//! through the preprocessors, the block parser, the tree processors and the
//! postprocessors.

use crate::config::Options;
use crate::inlinepatterns::InlinePattern;
use crate::registry::Registry;
use crate::util::html_placeholder;
use std::collections::HashMap;

/// Raw HTML pulled out of the text stream, in order of appearance.
#[derive(Debug, Default, Clone)]
pub struct HtmlStash {
    blocks: Vec<(String, bool)>,
}

impl HtmlStash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `html` and returns the placeholder that stands in for it.
    pub fn store(&mut self, html: impl Into<String>, safe: bool) -> String {
        self.blocks.push((html.into(), safe));
        let index = self.blocks.len() - 1;
        log::debug!("[rumdown-stash] Stored raw html #{index} (safe: {safe})");
        html_placeholder(index)
    }

    pub fn get_placeholder(&self, index: usize) -> String {
        html_placeholder(index)
    }

    pub fn get(&self, index: usize) -> Option<(&str, bool)> {
        self.blocks.get(index).map(|(html, safe)| (html.as_str(), *safe))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.blocks.iter().map(|(html, safe)| (html.as_str(), *safe))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}

/// A link reference definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub url: String,
    pub title: Option<String>,
}

/// Reference table keyed by lower-cased id.
#[derive(Debug, Default, Clone)]
pub struct References {
    refs: HashMap<String, LinkReference>,
}

impl References {
    pub fn insert(&mut self, id: &str, url: impl Into<String>, title: Option<String>) {
        self.refs.insert(
            id.to_lowercase(),
            LinkReference {
                url: url.into(),
                title,
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&LinkReference> {
        self.refs.get(id)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Stack of parser modes such as `"list"` or `"detabbed"`.
#[derive(Debug, Default, Clone)]
pub struct BlockParserState {
    stack: Vec<&'static str>,
}

impl BlockParserState {
    pub fn set(&mut self, state: &'static str) {
        self.stack.push(state);
    }

    pub fn reset(&mut self) {
        self.stack.pop();
    }

    /// Tests the top of the stack.
    pub fn is_state(&self, state: &str) -> bool {
        self.stack.last().is_some_and(|top| *top == state)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Mutable state of one conversion plus read-only access to its options
/// and the inline pattern chain.
pub struct Context<'a> {
    pub options: &'a Options,
    pub inline_patterns: &'a Registry<Box<dyn InlinePattern>>,
    pub html_stash: HtmlStash,
    pub references: References,
    pub state: BlockParserState,
}

impl<'a> Context<'a> {
    pub fn new(options: &'a Options, inline_patterns: &'a Registry<Box<dyn InlinePattern>>) -> Self {
        Self {
            options,
            inline_patterns,
            html_stash: HtmlStash::new(),
            references: References::default(),
            state: BlockParserState::default(),
        }
    }
}
