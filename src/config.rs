//!
//! This module defines configuration structures, loading logic, and defaults for rumdown.
//! Configuration comes from `.rumdown.toml` / `rumdown.toml` files and CLI overrides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Policy applied to raw HTML and link targets found in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SafeMode {
    /// Raw HTML passes through untouched and URLs are not filtered
    #[default]
    #[serde(alias = "off", alias = "none", alias = "false")]
    Default,
    /// Raw HTML is written as escaped text
    Escape,
    /// Raw HTML is dropped
    Remove,
    /// Raw HTML is replaced by the configured replacement text
    Replace,
}

impl SafeMode {
    /// True when any filtering is active.
    pub fn is_active(self) -> bool {
        self != SafeMode::Default
    }
}

impl fmt::Display for SafeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafeMode::Default => write!(f, "default"),
            SafeMode::Escape => write!(f, "escape"),
            SafeMode::Remove => write!(f, "remove"),
            SafeMode::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for SafeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" | "off" | "none" | "false" | "" => Ok(SafeMode::Default),
            "escape" => Ok(SafeMode::Escape),
            "remove" => Ok(SafeMode::Remove),
            "replace" | "true" => Ok(SafeMode::Replace),
            _ => Err(format!("Unknown safe mode: {s}")),
        }
    }
}

/// Serialization dialect of the produced markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "xhtml", alias = "xhtml1")]
    Xhtml,
    #[serde(rename = "html", alias = "html4", alias = "html5")]
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Xhtml => write!(f, "xhtml"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xhtml" | "xhtml1" => Ok(OutputFormat::Xhtml),
            "html" | "html4" | "html5" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown output format: {s}")),
        }
    }
}

fn default_tab_length() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_replacement_text() -> String {
    "[HTML_REMOVED]".to_string()
}

/// Conversion options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Options {
    /// How raw HTML and URLs are treated
    pub safe_mode: SafeMode,

    /// XHTML (`<br />`) or HTML (`<br>`) output
    pub output_format: OutputFormat,

    /// Width of one indentation level, in spaces
    #[serde(default = "default_tab_length")]
    pub tab_length: usize,

    /// Ignore the first number of ordered lists (never write `start=`)
    pub lazy_ol: bool,

    /// Only treat `_` as emphasis at word boundaries
    #[serde(default = "default_true")]
    pub smart_emphasis: bool,

    /// Enable `{@key=value}` attribute annotations
    #[serde(default = "default_true")]
    pub enable_attributes: bool,

    /// Text written in place of raw HTML in `replace` safe mode
    #[serde(default = "default_replacement_text")]
    pub html_replacement_text: String,

    /// Parse Markdown inside raw HTML blocks carrying a `markdown` attribute
    pub markdown_in_html: bool,

    /// Extensions to enable, by name
    pub extensions: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            safe_mode: SafeMode::Default,
            output_format: OutputFormat::Xhtml,
            tab_length: default_tab_length(),
            lazy_ol: false,
            smart_emphasis: true,
            enable_attributes: true,
            html_replacement_text: default_replacement_text(),
            markdown_in_html: false,
            extensions: Vec::new(),
        }
    }
}

impl Options {
    /// Options with the given safe mode and defaults otherwise.
    pub fn with_safe_mode(safe_mode: SafeMode) -> Self {
        Self {
            safe_mode,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_length == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tab-length".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub global: Options,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Configuration file already exists
    #[error("Configuration file already exists at {path}")]
    FileExists { path: String },

    /// A setting holds an unusable value
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Config file names searched for, in order of precedence
pub const CONFIG_FILES: &[&str] = &[".rumdown.toml", "rumdown.toml"];

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("{path}: {e}")))?;
        config.global.validate()?;
        Ok(config)
    }

    /// Load a single configuration file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            source: e,
            path: path.to_string(),
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load configuration from an explicit path or by walking up from the
    /// current directory. `isolated` disables discovery.
    pub fn load_with_discovery(config_path: Option<&str>, isolated: bool) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            log::debug!("[rumdown-config] Explicit config_path provided: {path:?}");
            return Self::load(path);
        }
        if isolated {
            log::debug!("[rumdown-config] Skipping auto-discovery due to --no-config flag");
            return Ok(Config::default());
        }
        let start_dir = match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                log::debug!("[rumdown-config] Failed to get current directory: {e}");
                return Ok(Config::default());
            }
        };
        match Self::discover_config_upward(&start_dir) {
            Some(path) => {
                log::debug!("[rumdown-config] Loading discovered config file: {}", path.display());
                Self::load(&path.to_string_lossy())
            }
            None => {
                log::debug!("[rumdown-config] No configuration file found via upward traversal");
                Ok(Config::default())
            }
        }
    }

    /// Discover a configuration file by traversing up from `start_dir`.
    /// Stops at the first directory containing `.git`.
    pub fn discover_config_upward(start_dir: &Path) -> Option<PathBuf> {
        const MAX_DEPTH: usize = 100;

        let mut current_dir = start_dir.to_path_buf();
        for _ in 0..MAX_DEPTH {
            log::debug!("[rumdown-config] Searching for config in: {}", current_dir.display());
            for name in CONFIG_FILES {
                let candidate = current_dir.join(name);
                if candidate.is_file() {
                    log::debug!("[rumdown-config] Found config file: {}", candidate.display());
                    return Some(candidate);
                }
            }
            if current_dir.join(".git").exists() {
                log::debug!("[rumdown-config] Stopping at .git directory");
                return None;
            }
            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => {
                    log::debug!("[rumdown-config] Reached filesystem root");
                    return None;
                }
            }
        }
        log::debug!("[rumdown-config] Maximum traversal depth reached");
        None
    }
}

/// Create a default configuration file at the specified path
pub fn create_default_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        return Err(ConfigError::FileExists { path: path.to_string() });
    }

    let default_config = r#"# rumdown configuration file

[global]
# How raw HTML and link targets are treated: default, escape, remove, replace
safe-mode = "default"

# Serialization dialect: xhtml or html
output-format = "xhtml"

# Width of one indentation level (lists, code blocks)
tab-length = 4

# Never write start= on ordered lists
lazy-ol = false

# Only treat `_` as emphasis at word boundaries
smart-emphasis = true

# Allow {@key=value} attribute annotations
enable-attributes = true

# Text used by the "replace" safe mode
html-replacement-text = "[HTML_REMOVED]"

# Parse Markdown inside raw HTML blocks marked with markdown="1"
markdown-in-html = false

# Extensions to enable
# extensions = ["tables"]
"#;

    fs::write(path, default_config).map_err(|err| ConfigError::IoError {
        source: err,
        path: path.to_string(),
    })
}
