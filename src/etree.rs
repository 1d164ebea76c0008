//! The document tree.
//!
//! A parent owns its children by value. There are no back-pointers: code that
//! rewrites the tree navigates by position in a parent's child list.

use serde::Serialize;
use std::collections::BTreeMap;

fn is_false(value: &bool) -> bool {
    !*value
}

/// A node of the document tree.
///
/// `text` is the content before the first child, `tail` the content after
/// this element's closing point and before the next sibling. An empty string
/// means "no text". When `atomic` is set the text is final and never scanned
/// by inline patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tail: String,
    #[serde(skip_serializing_if = "is_false")]
    pub atomic: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// Appends a new child with `tag` and returns it.
    pub fn sub_element(&mut self, tag: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Inserts `child` at `index`, clamped to the end of the child list.
    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn last_child(&self) -> Option<&Element> {
        self.children.last()
    }

    pub fn last_child_mut(&mut self) -> Option<&mut Element> {
        self.children.last_mut()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True for a `pre` whose first child is `code`.
    pub fn is_code_block(&self) -> bool {
        self.tag == "pre" && self.children.first().is_some_and(|c| c.tag == "code")
    }

    /// Follows `path` (child indices) down from this element.
    pub fn descendant_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?;
        }
        Some(current)
    }

    /// Concatenated text content of this element and its descendants,
    /// excluding this element's own tail.
    pub fn itertext(&self) -> String {
        enum Piece<'a> {
            Node(&'a Element),
            Text(&'a str),
        }

        let mut out = String::new();
        let mut stack = vec![Piece::Node(self)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Node(el) => {
                    out.push_str(&el.text);
                    for child in el.children.iter().rev() {
                        stack.push(Piece::Text(&child.tail));
                        stack.push(Piece::Node(child));
                    }
                }
            }
        }
        out
    }

    /// Depth-first, document-order iterator over this element and its
    /// descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let el = stack.pop()?;
            stack.extend(el.children.iter().rev());
            Some(el)
        })
    }

    /// Calls `f` on this element and every descendant in document order.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        let mut stack: Vec<&mut Element> = vec![self];
        while let Some(el) = stack.pop() {
            f(&mut *el);
            stack.extend(el.children.iter_mut().rev());
        }
    }
}
