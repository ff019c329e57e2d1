//! Character/token accounting and token-bounded output splitting

use std::collections::BTreeMap;
use tracing::debug;

use crate::core::model::{FileMetrics, OutputSplit, ProcessedFile};
use crate::core::tokenizer::Tokenizer;
use crate::core::util::{map_bounded, Concurrency};

/// Aggregate counts for a processed file list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackMetrics {
    pub total_files: usize,
    pub total_characters: usize,
    pub total_tokens: usize,
    /// One entry per file, in display order
    pub files: Vec<FileMetrics>,
}

impl PackMetrics {
    pub fn char_counts(&self) -> BTreeMap<String, usize> {
        self.files
            .iter()
            .map(|m| (m.path.clone(), m.char_count))
            .collect()
    }

    pub fn token_counts(&self) -> BTreeMap<String, usize> {
        self.files
            .iter()
            .map(|m| (m.path.clone(), m.token_count))
            .collect()
    }

    /// The `n` largest files by character count. Ties keep display order.
    pub fn top_files(&self, n: usize) -> Vec<FileMetrics> {
        let mut sorted: Vec<&FileMetrics> = self.files.iter().collect();
        sorted.sort_by(|a, b| b.char_count.cmp(&a.char_count));
        sorted.into_iter().take(n).cloned().collect()
    }
}

/// Count characters and tokens for every file
pub fn calculate_metrics(
    files: &[ProcessedFile],
    tokenizer: &Tokenizer,
    concurrency: Concurrency,
    progress: &(dyn Fn(&str) + Sync),
) -> PackMetrics {
    let total = files.len();
    let per_file = map_bounded(files, concurrency, |i, file| {
        progress(&format!("Calculating metrics... ({}/{}) {}", i + 1, total, file.path));
        FileMetrics {
            path: file.path.clone(),
            char_count: file.content.chars().count(),
            token_count: tokenizer.count_labeled(&file.content, &file.path),
        }
    });

    let metrics = PackMetrics {
        total_files: per_file.len(),
        total_characters: per_file.iter().map(|m| m.char_count).sum(),
        total_tokens: per_file.iter().map(|m| m.token_count).sum(),
        files: per_file,
    };
    debug!(
        files = metrics.total_files,
        chars = metrics.total_characters,
        tokens = metrics.total_tokens,
        model = %tokenizer.model(),
        "metrics calculated"
    );
    metrics
}

/// Partition `files` into parts of at most `max_tokens` tokens each.
///
/// Parts are filled greedily in order. A file is never split: a file larger
/// than the ceiling becomes a part of its own. `token_counts[i]` belongs to
/// `files[i]`.
pub fn split_into_parts(
    files: &[ProcessedFile],
    token_counts: &[usize],
    max_tokens: usize,
) -> Vec<OutputSplit> {
    let mut parts: Vec<OutputSplit> = Vec::new();
    let mut current: Vec<ProcessedFile> = Vec::new();
    let mut current_tokens = 0usize;

    for (file, &tokens) in files.iter().zip(token_counts) {
        if !current.is_empty() && current_tokens + tokens > max_tokens {
            parts.push(OutputSplit {
                part_number: parts.len() + 1,
                token_count: current_tokens,
                included_files: std::mem::take(&mut current),
            });
            current_tokens = 0;
        }
        current.push(file.clone());
        current_tokens += tokens;
    }

    if !current.is_empty() {
        parts.push(OutputSplit {
            part_number: parts.len() + 1,
            token_count: current_tokens,
            included_files: current,
        });
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::TokenModel;

    fn files(n: usize) -> Vec<ProcessedFile> {
        (1..=n)
            .map(|i| ProcessedFile::new(format!("f{}", i), format!("content {}", i)))
            .collect()
    }

    fn part_paths(part: &OutputSplit) -> Vec<&str> {
        part.included_files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_split_three_files_of_four_tokens() {
        let files = files(3);
        let parts = split_into_parts(&files, &[4, 4, 4], 10);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].part_number, 1);
        assert_eq!(parts[0].token_count, 8);
        assert_eq!(part_paths(&parts[0]), vec!["f1", "f2"]);
        assert_eq!(parts[1].part_number, 2);
        assert_eq!(parts[1].token_count, 4);
        assert_eq!(part_paths(&parts[1]), vec!["f3"]);
    }

    #[test]
    fn test_oversized_file_gets_own_part() {
        let files = files(3);
        let parts = split_into_parts(&files, &[3, 25, 3], 10);
        assert_eq!(parts.len(), 3);
        assert_eq!(part_paths(&parts[1]), vec!["f2"]);
        assert_eq!(parts[1].token_count, 25);
    }

    #[test]
    fn test_split_bound_and_reconstruction() {
        let files = files(9);
        let counts = [5, 1, 7, 2, 2, 12, 4, 4, 3];
        let max = 8;
        let parts = split_into_parts(&files, &counts, max);

        for (i, part) in parts.iter().enumerate() {
            assert_eq!(part.part_number, i + 1);
            if part.included_files.len() > 1 {
                assert!(part.token_count <= max);
            }
        }

        let rebuilt: Vec<ProcessedFile> = parts
            .into_iter()
            .flat_map(|p| p.included_files)
            .collect();
        assert_eq!(rebuilt, files);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_into_parts(&[], &[], 10).is_empty());
    }

    #[test]
    fn test_calculate_metrics() {
        let files = vec![
            ProcessedFile::new("a.txt", "hello world"),
            ProcessedFile::new("b.txt", "héllo"),
        ];
        let tokenizer = Tokenizer::new(TokenModel::Heuristic).unwrap();
        let metrics = calculate_metrics(&files, &tokenizer, Concurrency::new(2), &|_: &str| {});
        assert_eq!(metrics.total_files, 2);
        assert_eq!(metrics.files[1].char_count, 5);
        assert_eq!(metrics.total_characters, 16);
        assert_eq!(
            metrics.total_tokens,
            metrics.files.iter().map(|m| m.token_count).sum::<usize>()
        );
        assert_eq!(metrics.char_counts().get("a.txt"), Some(&11));
    }

    #[test]
    fn test_top_files_stable_on_ties() {
        let metrics = PackMetrics {
            files: vec![
                FileMetrics { path: "a".into(), char_count: 5, token_count: 1 },
                FileMetrics { path: "b".into(), char_count: 9, token_count: 2 },
                FileMetrics { path: "c".into(), char_count: 5, token_count: 1 },
            ],
            ..Default::default()
        };
        let top: Vec<_> = metrics.top_files(2).into_iter().map(|m| m.path).collect();
        assert_eq!(top, vec!["b", "a"]);
    }
}
