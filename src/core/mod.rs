//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Pipeline data model (RawFile, ProcessedFile, PackResult, ...)
//! - Path normalization and deterministic ordering
//! - Directory tree building and rendering
//! - File acquisition (binary detection, charset decoding)
//! - Token counting for LLM context budgeting
//! - Rendering to plain/xml/markdown

pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod tree;
pub mod util;
