//! Optional syntax that plugs into the processor registries.

mod tables;

pub use tables::{TableExtension, TableProcessor};

use crate::block_parser::BlockParser;
use crate::config::Options;
use crate::error::MarkdownResult;
use crate::inlinepatterns::InlinePattern;
use crate::postprocessors::Postprocessor;
use crate::preprocessors::Preprocessor;
use crate::registry::Registry;
use crate::treeprocessors::Treeprocessor;

/// Every stage of a converter, open for extension.
pub struct Registries {
    pub preprocessors: Registry<Box<dyn Preprocessor>>,
    pub block_parser: BlockParser,
    pub inline_patterns: Registry<Box<dyn InlinePattern>>,
    pub treeprocessors: Registry<Box<dyn Treeprocessor>>,
    pub postprocessors: Registry<Box<dyn Postprocessor>>,
}

pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inserts this extension's processors relative to existing entries.
    fn extend(&self, registries: &mut Registries, options: &Options) -> MarkdownResult<()>;
}

/// Names accepted by `extension_by_name`.
pub const BUILTIN_EXTENSIONS: &[&str] = &["tables"];

/// Resolves a bundled extension by name (case-insensitive).
pub fn extension_by_name(name: &str) -> Option<Box<dyn Extension>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "tables" | "table" => Some(Box::new(TableExtension)),
        _ => None,
    }
}
