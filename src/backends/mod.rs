//! Backends module - Filesystem-facing collaborators
//!
//! Provides:
//! - discover: include/ignore resolution over a directory walk
//! - output: output writing, instruction file, clipboard

pub mod discover;
pub mod output;
