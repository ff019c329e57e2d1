//! Pipeline data model
//!
//! Every stage hands a full, ordered list to the next. Paths are relative to
//! the scan root and always use '/' as separator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decoded text of one discovered file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFile {
    pub path: String,
    pub content: String,
}

impl RawFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// A file after comment/blank-line/line-number transformation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    pub path: String,
    pub content: String,
}

impl ProcessedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Suspected secrets found in one file. Its presence excludes the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFinding {
    pub file_path: String,
    pub messages: Vec<String>,
}

/// A contiguous, order-preserving slice of the processed file list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSplit {
    pub part_number: usize,
    pub token_count: usize,
    pub included_files: Vec<ProcessedFile>,
}

/// Per-file character and token counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetrics {
    pub path: String,
    pub char_count: usize,
    pub token_count: usize,
}

/// Summary of one written output part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSummary {
    pub part_number: usize,
    pub token_count: usize,
    pub files: Vec<String>,
    pub output_path: String,
}

/// The single externally visible result of a pack operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackResult {
    pub total_files: usize,
    pub total_characters: usize,
    pub total_tokens: usize,
    pub file_char_counts: BTreeMap<String, usize>,
    pub file_token_counts: BTreeMap<String, usize>,
    /// Largest files by character count, display order on ties
    pub top_files: Vec<FileMetrics>,
    pub suspicious_files: Vec<ScanFinding>,
    /// Files in final display order
    pub included_files: Vec<String>,
    pub parts: Vec<PartSummary>,
}
