//! File content acquisition
//!
//! Reads discovered files in display order and turns them into text:
//! - binary files are detected (extension/signature first, then content sniffing) and dropped
//! - oversized files are dropped
//! - the character encoding is detected and decoded to UTF-8
//!
//! Nothing in here is fatal. A file that cannot be read or decoded is logged
//! and left out of the batch.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::model::RawFile;
use crate::core::paths::join_normalized;

/// Default maximum file size in bytes (50 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Number of leading bytes inspected when sniffing for binary content
const SNIFF_LEN: usize = 8192;

/// Extensions that are always treated as binary
const BINARY_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tif", "tiff", "psd", "heic", "avif",
    // audio/video
    "mp3", "mp4", "wav", "ogg", "flac", "avi", "mov", "mkv", "webm", "m4a",
    // archives
    "zip", "gz", "tgz", "bz2", "xz", "7z", "rar", "tar", "zst", "jar", "war",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt",
    // fonts
    "ttf", "otf", "woff", "woff2", "eot",
    // executables and objects
    "exe", "dll", "so", "dylib", "o", "a", "lib", "bin", "class", "pyc", "pyo", "wasm",
    // data
    "sqlite", "db", "dat", "pack", "idx",
];

/// Leading magic numbers of common binary formats. Only signatures that
/// cannot start a plain-text file belong here.
const BINARY_SIGNATURES: &[&[u8]] = &[
    b"\x89PNG\r\n\x1a\n",
    b"\xff\xd8\xff",
    b"GIF87a",
    b"GIF89a",
    b"PK\x03\x04",
    b"\x1f\x8b",
    b"%PDF-",
    b"\x7fELF",
    b"\xca\xfe\xba\xbe",
    b"\x00asm",
    b"7z\xbc\xaf\x27\x1c",
];

/// Configuration for file reading
#[derive(Debug, Clone)]
pub struct FileReadConfig {
    /// Files larger than this are skipped
    pub max_file_size: u64,
}

impl Default for FileReadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// Why a file was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Binary,
    TooLarge,
    Unreadable,
    Undecodable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Binary => "BINARY_FILE",
            SkipReason::TooLarge => "FILE_SKIPPED_SIZE",
            SkipReason::Unreadable => "FILE_UNREADABLE",
            SkipReason::Undecodable => "FILE_SKIPPED_ENCODING",
        }
    }
}

/// Outcome of reading one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReadResult {
    Text(String),
    Skipped(SkipReason),
}

/// Fast check by extension. `None` means inconclusive.
fn binary_by_extension(path: &Path) -> Option<bool> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if BINARY_EXTENSIONS.contains(&ext.as_str()) {
        Some(true)
    } else {
        None
    }
}

/// Check a magic-number signature at the start of the content
fn has_binary_signature(bytes: &[u8]) -> bool {
    BINARY_SIGNATURES.iter().any(|sig| bytes.starts_with(sig))
}

/// Content sniffing on the leading bytes.
///
/// A NUL byte is conclusive. Otherwise the sample is binary when more than
/// 10% of it is non-whitespace ASCII control characters. UTF-16 BOMs are text.
pub fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    if sample.is_empty() {
        return false;
    }
    if sample.starts_with(b"\xff\xfe") || sample.starts_with(b"\xfe\xff") {
        return false;
    }
    if has_binary_signature(sample) {
        return true;
    }
    if sample.contains(&0) {
        return true;
    }
    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c | 0x1b))
        .count();
    control * 10 > sample.len()
}

/// Decode raw bytes to text.
///
/// Valid UTF-8 (with or without BOM) is used directly. Anything else goes
/// through statistical charset detection. Returns `None` when decoding
/// produced malformed sequences.
pub fn decode_bytes(bytes: &[u8]) -> Option<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (!had_errors).then(|| text.into_owned());
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!(encoding = encoding.name(), "detected non-UTF-8 charset");

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    (!had_errors).then(|| text.into_owned())
}

/// Read and classify a single file
pub fn read_file_with_config(path: &Path, config: &FileReadConfig) -> FileReadResult {
    if binary_by_extension(path) == Some(true) {
        return FileReadResult::Skipped(SkipReason::Binary);
    }

    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file metadata");
            return FileReadResult::Skipped(SkipReason::Unreadable);
        }
    };
    if metadata.len() > config.max_file_size {
        warn!(
            path = %path.display(),
            size = metadata.len(),
            limit = config.max_file_size,
            "file exceeds size limit"
        );
        return FileReadResult::Skipped(SkipReason::TooLarge);
    }

    let bytes = match read_file_bytes(path) {
        Ok(b) => b,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read file");
            return FileReadResult::Skipped(SkipReason::Unreadable);
        }
    };

    if looks_binary(&bytes) {
        return FileReadResult::Skipped(SkipReason::Binary);
    }

    match decode_bytes(&bytes) {
        Some(text) => FileReadResult::Text(text),
        None => {
            warn!(path = %path.display(), "cannot decode file content");
            FileReadResult::Skipped(SkipReason::Undecodable)
        }
    }
}

fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = fs::File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Read every candidate path under `root`, preserving order.
///
/// The result is a subsequence of `paths`: binary, oversized, unreadable and
/// undecodable files are dropped.
pub fn collect_files(root: &Path, paths: &[String], config: &FileReadConfig) -> Vec<RawFile> {
    let mut files = Vec::with_capacity(paths.len());

    for relative in paths {
        let full_path = join_normalized(root, relative);
        match read_file_with_config(&full_path, config) {
            FileReadResult::Text(content) => files.push(RawFile::new(relative.clone(), content)),
            FileReadResult::Skipped(SkipReason::Binary) => {
                debug!(path = %relative, "skipping binary file");
            }
            FileReadResult::Skipped(reason) => {
                debug!(path = %relative, reason = reason.as_str(), "skipping file");
            }
        }
    }

    files
}
