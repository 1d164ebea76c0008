//! The converter facade.

use crate::block_parser::ROOT_TAG;
use crate::blockprocessors::build_block_parser;
use crate::config::{Options, SafeMode};
use crate::context::Context;
use crate::error::{MarkdownError, MarkdownResult};
use crate::etree::Element;
use crate::extensions::{Extension, Registries, extension_by_name};
use crate::inlinepatterns::build_inline_patterns;
use crate::postprocessors::build_postprocessors;
use crate::preprocessors::build_preprocessors;
use crate::serializer::serialize_children;
use crate::treeprocessors::build_treeprocessors;

/// A configured converter.
///
/// All per-document state lives in a [`Context`] created by each call, so
/// one instance can convert any number of documents, from several threads
/// at once.
pub struct Markdown {
    options: Options,
    registries: Registries,
    extensions: Vec<String>,
}

impl Markdown {
    /// Builds every registry for `options` and applies the extensions it names.
    pub fn new(options: Options) -> MarkdownResult<Self> {
        options.validate()?;
        let registries = Registries {
            preprocessors: build_preprocessors(&options),
            block_parser: build_block_parser(&options),
            inline_patterns: build_inline_patterns(&options),
            treeprocessors: build_treeprocessors(&options),
            postprocessors: build_postprocessors(&options),
        };
        let mut markdown = Self {
            options,
            registries,
            extensions: Vec::new(),
        };
        for name in markdown.options.extensions.clone() {
            let extension = extension_by_name(&name).ok_or(MarkdownError::UnknownExtension(name))?;
            markdown.register(extension.as_ref())?;
        }
        Ok(markdown)
    }

    /// Applies one more extension.
    pub fn with_extension(mut self, extension: impl Extension) -> MarkdownResult<Self> {
        self.register(&extension)?;
        Ok(self)
    }

    fn register(&mut self, extension: &dyn Extension) -> MarkdownResult<()> {
        if self.extensions.iter().any(|e| e == extension.name()) {
            log::debug!("[rumdown] Extension '{}' already registered", extension.name());
            return Ok(());
        }
        extension.extend(&mut self.registries, &self.options)?;
        self.extensions.push(extension.name().to_string());
        log::debug!("[rumdown] Registered extension '{}'", extension.name());
        Ok(())
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Names of the applied extensions, in registration order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// The processed element tree, before serialization.
    pub fn tree(&self, text: &str) -> MarkdownResult<Element> {
        if text.trim().is_empty() {
            return Ok(Element::new(ROOT_TAG));
        }
        let mut ctx = Context::new(&self.options, &self.registries.inline_patterns);
        self.build_tree(text, &mut ctx)
    }

    /// Converts `text` to (X)HTML.
    pub fn convert(&self, text: &str) -> MarkdownResult<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }
        let mut ctx = Context::new(&self.options, &self.registries.inline_patterns);
        let root = self.build_tree(text, &mut ctx)?;

        let mut output = serialize_children(&root, self.options.output_format).trim().to_string();
        for postprocessor in self.registries.postprocessors.iter() {
            output = postprocessor.run(output, &ctx);
        }
        Ok(output.trim().to_string())
    }

    fn build_tree(&self, text: &str, ctx: &mut Context<'_>) -> MarkdownResult<Element> {
        let mut lines: Vec<String> = text.split('\n').map(String::from).collect();
        for preprocessor in self.registries.preprocessors.iter() {
            lines = preprocessor.run(lines, ctx);
        }
        log::debug!(
            "[rumdown] Preprocessed {} lines, {} raw html blocks, {} references",
            lines.len(),
            ctx.html_stash.len(),
            ctx.references.len()
        );

        let mut root = self.registries.block_parser.parse_document(&lines, ctx)?;
        for treeprocessor in self.registries.treeprocessors.iter() {
            treeprocessor.run(&mut root, ctx)?;
        }
        Ok(root)
    }
}

/// Converts `text` with default options and the given safe mode.
pub fn markdown_to_html(text: &str, safe_mode: SafeMode) -> MarkdownResult<String> {
    Markdown::new(Options::with_safe_mode(safe_mode))?.convert(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::TableExtension;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_input() {
        assert_eq!(markdown_to_html("", SafeMode::Default).unwrap(), "");
        assert_eq!(markdown_to_html("  \n\t\n", SafeMode::Default).unwrap(), "");
    }

    #[test]
    fn test_heading_and_inline() {
        let html = markdown_to_html("# Title\n\nSome *em* and **strong**.", SafeMode::Default).unwrap();
        assert_eq!(html, "<h1>Title</h1>\n<p>Some <em>em</em> and <strong>strong</strong>.</p>");
    }

    #[test]
    fn test_unknown_extension() {
        let options = Options {
            extensions: vec!["nope".to_string()],
            ..Default::default()
        };
        assert!(matches!(Markdown::new(options), Err(MarkdownError::UnknownExtension(name)) if name == "nope"));
    }

    #[test]
    fn test_invalid_tab_length() {
        let options = Options {
            tab_length: 0,
            ..Default::default()
        };
        assert!(matches!(Markdown::new(options), Err(MarkdownError::Config(_))));
    }

    #[test]
    fn test_extension_registered_once() {
        let options = Options {
            extensions: vec!["tables".to_string()],
            ..Default::default()
        };
        let md = Markdown::new(options).unwrap().with_extension(TableExtension).unwrap();
        assert_eq!(md.extensions(), ["tables".to_string()]);
        let names: Vec<&str> = md.registries().block_parser.processors.names().collect();
        assert_eq!(names.iter().filter(|n| **n == "table").count(), 1);
        let table = names.iter().position(|n| *n == "table");
        let hash = names.iter().position(|n| *n == "hash_header");
        assert!(table < hash);
    }

    #[test]
    fn test_converter_is_reusable() {
        let md = Markdown::new(Options::default()).unwrap();
        let first = md.convert("[a][x]\n\n[x]: /one").unwrap();
        let second = md.convert("[a][x]").unwrap();
        assert_eq!(first, "<p><a href=\"/one\">a</a></p>");
        assert_eq!(second, "<p>[a][x]</p>");
    }
}
