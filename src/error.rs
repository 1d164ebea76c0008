use crate::config::ConfigError;
use crate::registry::RegistryError;

/// Errors a conversion can end with.
///
/// Irregular markup is never an error; these cover broken invariants and
/// setup mistakes only.
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    /// A block processor fired without consuming anything
    #[error("Block processor '{processor}' made no progress on block {block:?}")]
    StalledProcessor { processor: String, block: String },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Unknown extension: {0}")]
    UnknownExtension(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type MarkdownResult<T> = Result<T, MarkdownError>;
