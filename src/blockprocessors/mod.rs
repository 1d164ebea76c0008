//! Block processors and the default processor chain.

mod blockquote;
mod code;
mod empty;
mod headers;
mod hr;
mod list_indent;
mod lists;
mod paragraph;

pub use blockquote::BlockQuoteProcessor;
pub use code::CodeBlockProcessor;
pub use empty::EmptyBlockProcessor;
pub use headers::{HashHeaderProcessor, SetextHeaderProcessor};
pub use hr::HrProcessor;
pub use list_indent::ListIndentProcessor;
pub use lists::{ListKind, ListProcessor};
pub use paragraph::ParagraphProcessor;

use crate::block_parser::BlockParser;
use crate::config::Options;
use crate::context::Context;
use crate::error::MarkdownResult;
use crate::etree::Element;
use crate::registry::Registry;
use std::collections::VecDeque;

/// One link of the block-level chain of responsibility.
pub trait BlockProcessor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this processor handles `block` under `parent`.
    fn test(&self, parent: &Element, block: &str, ctx: &Context<'_>) -> bool;

    /// Consumes the front of `blocks`, adding structure to `parent`.
    fn run(
        &self,
        parser: &BlockParser,
        parent: &mut Element,
        blocks: &mut VecDeque<String>,
        ctx: &mut Context<'_>,
    ) -> MarkdownResult<()>;
}

/// Builds the default block processor chain for `options`.
pub fn build_block_parser(options: &Options) -> BlockParser {
    let tab_length = options.tab_length;
    let mut processors: Registry<Box<dyn BlockProcessor>> = Registry::new();
    processors.append("empty", Box::new(EmptyBlockProcessor));
    processors.append("indent", Box::new(ListIndentProcessor::new(tab_length)));
    processors.append("code", Box::new(CodeBlockProcessor::new(tab_length)));
    processors.append("hash_header", Box::new(HashHeaderProcessor));
    processors.append("setext_header", Box::new(SetextHeaderProcessor));
    processors.append("hr", Box::new(HrProcessor));
    processors.append(
        "olist",
        Box::new(ListProcessor::new(ListKind::Ordered, tab_length, options.lazy_ol)),
    );
    processors.append(
        "ulist",
        Box::new(ListProcessor::new(ListKind::Unordered, tab_length, options.lazy_ol)),
    );
    processors.append("quote", Box::new(BlockQuoteProcessor));
    processors.append("paragraph", Box::new(ParagraphProcessor));
    BlockParser::new(processors)
}

/// Removes one indentation level from the leading lines of `text`.
///
/// Stops at the first line that is neither indented nor blank and returns
/// `(detabbed, rest)`.
pub fn detab(text: &str, tab_length: usize) -> (String, String) {
    let indent = " ".repeat(tab_length);
    let lines: Vec<&str> = text.split('\n').collect();
    let mut detabbed: Vec<&str> = Vec::new();
    for line in &lines {
        if let Some(stripped) = line.strip_prefix(indent.as_str()) {
            detabbed.push(stripped);
        } else if line.trim().is_empty() {
            detabbed.push("");
        } else {
            break;
        }
    }
    let rest = lines[detabbed.len()..].join("\n");
    (detabbed.join("\n"), rest)
}

/// Removes `level` indentation levels from every line that has them.
pub fn loose_detab(text: &str, level: usize, tab_length: usize) -> String {
    let indent = " ".repeat(tab_length * level);
    text.split('\n')
        .map(|line| line.strip_prefix(indent.as_str()).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn is_list_tag(tag: &str) -> bool {
    tag == "ul" || tag == "ol"
}

/// Follows the last child `depth` times.
pub(crate) fn descend_last(mut element: &mut Element, depth: usize) -> &mut Element {
    for _ in 0..depth {
        if element.children.is_empty() {
            break;
        }
        let last = element.children.len() - 1;
        element = &mut element.children[last];
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detab_stops_at_unindented_line() {
        let (body, rest) = detab("    code\n\n    more\nplain\n    again", 4);
        assert_eq!(body, "code\n\nmore");
        assert_eq!(rest, "plain\n    again");
    }

    #[test]
    fn test_detab_consumes_everything() {
        let (body, rest) = detab("  a\n  b", 2);
        assert_eq!(body, "a\nb");
        assert_eq!(rest, "");
    }

    #[test]
    fn test_loose_detab_multiple_levels() {
        assert_eq!(loose_detab("        a\n    b\nc", 2, 4), "a\n    b\nc");
        assert_eq!(loose_detab("    a\n    b", 1, 4), "a\nb");
    }

    #[test]
    fn test_default_chain_order() {
        let parser = build_block_parser(&Options::default());
        let names: Vec<&str> = parser.processors.names().collect();
        assert_eq!(
            names,
            vec![
                "empty",
                "indent",
                "code",
                "hash_header",
                "setext_header",
                "hr",
                "olist",
                "ulist",
                "quote",
                "paragraph"
            ]
        );
    }
}
