//! Error taxonomy for the packing pipeline
//!
//! Only fatal conditions live here. Per-file problems (unreadable file, bad
//! encoding, tokenizer hiccup, scanner failure) are logged and degraded inside
//! the stage that hit them and never become a `PackError`.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort a pack operation
#[derive(Debug, Error)]
pub enum PackError {
    /// An include or ignore pattern could not be compiled
    #[error("invalid glob pattern `{pattern}`: {message}")]
    Glob { pattern: String, message: String },

    /// The directory walk failed
    #[error("failed to discover files under {}: {message}", root.display())]
    Discovery { root: PathBuf, message: String },

    /// The instruction file is missing or unreadable
    #[error("failed to read instruction file {}: {source}", path.display())]
    InstructionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered output could not be written
    #[error("failed to write output file {}: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file could not be read or parsed
    #[error("invalid config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The BPE encoding could not be loaded
    #[error("failed to load tokenizer encoding {encoding}: {message}")]
    Tokenizer { encoding: String, message: String },
}
