//! Path normalization and ordering
//!
//! Ensures all paths are normalized to use '/' as separator, are relative to
//! root, and come out in one deterministic display order on every platform.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Join a '/'-separated relative path onto a base directory
pub fn join_normalized(base: &Path, relative: &str) -> PathBuf {
    base.join(relative.replace('/', std::path::MAIN_SEPARATOR_STR))
}

/// Compare two relative paths in display order.
///
/// Segments are compared one by one. At the first differing segment, an entry
/// that is still a directory on one side sorts before a file on the other;
/// otherwise segments compare case-sensitively by code point. When one path
/// runs out first, the shorter path wins.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('/').collect();
    let b_parts: Vec<&str> = b.split('/').collect();

    for (i, (a_seg, b_seg)) in a_parts.iter().zip(b_parts.iter()).enumerate() {
        if a_seg == b_seg {
            continue;
        }
        let a_is_dir = i + 1 < a_parts.len();
        let b_is_dir = i + 1 < b_parts.len();
        if a_is_dir != b_is_dir {
            return if a_is_dir {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        return a_seg.cmp(b_seg);
    }

    a_parts.len().cmp(&b_parts.len())
}

/// Sort paths into display order. Identical paths keep their input order.
pub fn sort_paths(mut paths: Vec<String>) -> Vec<String> {
    paths.sort_by(|a, b| compare_paths(a, b));
    paths
}
