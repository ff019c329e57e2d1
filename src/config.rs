//! Configuration model and config-file loading
//!
//! Precedence: built-in defaults < config file < CLI flags. List options
//! (`include`, `ignore.customPatterns`) are concatenated, file first.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::render::OutputStyle;
use crate::core::tokenizer::TokenModel;
use crate::error::PackError;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "repopack.config.json";

/// Stem of the default output file name
pub const DEFAULT_OUTPUT_STEM: &str = "repopack-output";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IgnoreConfig {
    pub use_gitignore: bool,
    pub use_default_patterns: bool,
    pub custom_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_default_patterns: true,
            custom_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub style: OutputStyle,
    /// Output path, relative to the working directory. Defaults to
    /// `repopack-output.<ext>` with the extension following the style.
    pub file_path: Option<PathBuf>,
    pub header_text: Option<String>,
    pub instruction_file_path: Option<PathBuf>,
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
    pub show_line_numbers: bool,
    pub top_files_length: usize,
    pub copy_to_clipboard: bool,
    pub include_empty_directories: bool,
    pub max_tokens_per_part: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: OutputStyle::Plain,
            file_path: None,
            header_text: None,
            instruction_file_path: None,
            remove_comments: false,
            remove_empty_lines: false,
            show_line_numbers: false,
            top_files_length: 5,
            copy_to_clipboard: false,
            include_empty_directories: false,
            max_tokens_per_part: None,
        }
    }
}

impl OutputConfig {
    /// The configured output path, or the style's default file name
    pub fn resolved_file_path(&self) -> PathBuf {
        self.file_path.clone().unwrap_or_else(|| {
            PathBuf::from(format!("{}.{}", DEFAULT_OUTPUT_STEM, self.style.extension()))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityConfig {
    pub enable_security_check: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_security_check: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenCountConfig {
    pub encoding: TokenModel,
}

/// The merged configuration consumed by the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackConfig {
    pub include: Vec<String>,
    pub ignore: IgnoreConfig,
    pub output: OutputConfig,
    pub security: SecurityConfig,
    pub token_count: TokenCountConfig,
}

/// Values coming from the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub include: Vec<String>,
    pub ignore: Vec<String>,
    pub use_gitignore: Option<bool>,
    pub use_default_patterns: Option<bool>,
    pub style: Option<OutputStyle>,
    pub output: Option<PathBuf>,
    pub header_text: Option<String>,
    pub instruction_file_path: Option<PathBuf>,
    pub remove_comments: Option<bool>,
    pub remove_empty_lines: Option<bool>,
    pub show_line_numbers: Option<bool>,
    pub top_files_length: Option<usize>,
    pub copy_to_clipboard: Option<bool>,
    pub include_empty_directories: Option<bool>,
    pub max_tokens_per_part: Option<usize>,
    pub security_check: Option<bool>,
    pub encoding: Option<TokenModel>,
}

/// Parse a config file
pub fn load_config_file(path: &Path) -> Result<PackConfig, PackError> {
    let text = fs::read_to_string(path).map_err(|e| PackError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| PackError::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load the explicit config file, or `repopack.config.json` in `cwd` when
/// present. An explicit path that does not exist is an error.
pub fn load_file_config(cwd: &Path, explicit: Option<&Path>) -> Result<PackConfig, PackError> {
    match explicit {
        Some(path) => {
            let full = cwd.join(path);
            debug!(path = %full.display(), "loading config file");
            load_config_file(&full)
        }
        None => {
            let default_path = cwd.join(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                debug!(path = %default_path.display(), "loading config file");
                load_config_file(&default_path)
            } else {
                Ok(PackConfig::default())
            }
        }
    }
}

/// Apply CLI overrides on top of a file config
pub fn merge_config(mut config: PackConfig, cli: CliOverrides) -> PackConfig {
    config.include.extend(cli.include);
    config.ignore.custom_patterns.extend(cli.ignore);

    if let Some(v) = cli.use_gitignore {
        config.ignore.use_gitignore = v;
    }
    if let Some(v) = cli.use_default_patterns {
        config.ignore.use_default_patterns = v;
    }

    let output = &mut config.output;
    if let Some(v) = cli.style {
        output.style = v;
    }
    if let Some(v) = cli.output {
        output.file_path = Some(v);
    }
    if let Some(v) = cli.header_text {
        output.header_text = Some(v);
    }
    if let Some(v) = cli.instruction_file_path {
        output.instruction_file_path = Some(v);
    }
    if let Some(v) = cli.remove_comments {
        output.remove_comments = v;
    }
    if let Some(v) = cli.remove_empty_lines {
        output.remove_empty_lines = v;
    }
    if let Some(v) = cli.show_line_numbers {
        output.show_line_numbers = v;
    }
    if let Some(v) = cli.top_files_length {
        output.top_files_length = v;
    }
    if let Some(v) = cli.copy_to_clipboard {
        output.copy_to_clipboard = v;
    }
    if let Some(v) = cli.include_empty_directories {
        output.include_empty_directories = v;
    }
    if let Some(v) = cli.max_tokens_per_part {
        output.max_tokens_per_part = Some(v);
    }

    if let Some(v) = cli.security_check {
        config.security.enable_security_check = v;
    }
    if let Some(v) = cli.encoding {
        config.token_count.encoding = v;
    }

    config
}
