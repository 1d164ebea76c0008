pub mod block_parser;
pub mod blockprocessors;
pub mod config;
pub mod context;
pub mod error;
pub mod etree;
pub mod exit_codes;
pub mod extensions;
pub mod inlinepatterns;
pub mod markdown;
pub mod postprocessors;
pub mod preprocessors;
pub mod registry;
pub mod serializer;
pub mod treeprocessors;
pub mod util;

pub use crate::config::{Config, Options, OutputFormat, SafeMode};
pub use crate::error::{MarkdownError, MarkdownResult};
pub use crate::etree::Element;
pub use crate::extensions::{Extension, Registries};
pub use crate::markdown::{Markdown, markdown_to_html};
