//! Pack flow - discover, read, scan, transform, count, render, write
//!
//! Every stage hands a complete ordered list to the next. Nothing touches the
//! filesystem until all output artefacts are rendered in memory.

use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

use crate::backends::discover::FileDiscoverer;
use crate::backends::output::{
    copy_to_clipboard, read_instruction, split_output_path, write_outputs, OutputArtifact,
};
use crate::config::PackConfig;
use crate::core::file_reader::{collect_files, FileReadConfig};
use crate::core::model::{OutputSplit, PackResult, PartSummary, RawFile};
use crate::core::render::{RenderContext, RenderNotes, Renderer};
use crate::core::tokenizer::Tokenizer;
use crate::core::tree::generate_tree_string;
use crate::core::util::{now_rfc3339, Concurrency};
use crate::error::PackError;
use crate::flows::metrics::{calculate_metrics, split_into_parts};
use crate::security::rules::RuleSet;
use crate::security::scanner::run_security_check;
use crate::transform::{process_files, TransformOptions};

/// Pack the directory `root` according to `config`.
///
/// `cwd` anchors relative output, instruction and config paths. `progress`
/// receives short human-readable status lines and may be called from worker
/// threads.
pub fn pack(
    root: &Path,
    cwd: &Path,
    config: &PackConfig,
    concurrency: Concurrency,
    progress: &(dyn Fn(&str) + Sync),
) -> Result<PackResult, PackError> {
    progress("Searching for files...");
    let discoverer = FileDiscoverer::new(root, cwd, config)?;
    let discovery = discoverer.discover()?;

    progress("Collecting files...");
    let raw_files = collect_files(discoverer.root(), &discovery.files, &FileReadConfig::default());

    let suspicious_files = if config.security.enable_security_check {
        run_security_check(&raw_files, &RuleSet::builtin(), concurrency, progress)
    } else {
        Vec::new()
    };
    let excluded: HashSet<&str> = suspicious_files.iter().map(|f| f.file_path.as_str()).collect();
    for finding in &suspicious_files {
        warn!(path = %finding.file_path, findings = finding.messages.len(), "excluding suspicious file");
    }
    let safe_files: Vec<RawFile> = raw_files
        .into_iter()
        .filter(|f| !excluded.contains(f.path.as_str()))
        .collect();

    progress("Processing files...");
    let options = TransformOptions {
        remove_comments: config.output.remove_comments,
        remove_empty_lines: config.output.remove_empty_lines,
        show_line_numbers: config.output.show_line_numbers,
    };
    let processed = process_files(&safe_files, &options);

    let tokenizer = Tokenizer::new(config.token_count.encoding)?;
    let metrics = calculate_metrics(&processed, &tokenizer, concurrency, progress);
    drop(tokenizer);

    let token_counts: Vec<usize> = metrics.files.iter().map(|m| m.token_count).collect();
    let mut parts = match config.output.max_tokens_per_part.filter(|max| *max > 0) {
        Some(max) => split_into_parts(&processed, &token_counts, max),
        None => Vec::new(),
    };
    if parts.len() <= 1 {
        parts = vec![OutputSplit {
            part_number: 1,
            token_count: metrics.total_tokens,
            included_files: processed.clone(),
        }];
    }

    let instruction = match &config.output.instruction_file_path {
        Some(path) => Some(read_instruction(cwd, path)?),
        None => None,
    };

    progress("Writing output file...");
    let tree_paths: Vec<String> = discovery
        .files
        .iter()
        .filter(|p| !excluded.contains(p.as_str()))
        .cloned()
        .collect();
    let tree = generate_tree_string(&tree_paths, &discovery.empty_dirs);
    let notes = RenderNotes {
        comments_removed: options.remove_comments,
        empty_lines_removed: options.remove_empty_lines,
        line_numbers: options.show_line_numbers,
        security_check: config.security.enable_security_check,
    };
    let renderer = Renderer::new(config.output.style);
    let generated_at = now_rfc3339();
    let base_path = cwd.join(config.output.resolved_file_path());
    let total_parts = parts.len();

    let artifacts: Vec<OutputArtifact> = parts
        .iter()
        .map(|part| {
            let is_last = part.part_number == total_parts;
            let ctx = RenderContext {
                generated_at: generated_at.clone(),
                tree: tree.clone(),
                files: &part.included_files,
                header_text: config.output.header_text.clone(),
                instruction: if is_last { instruction.clone() } else { None },
                part: (total_parts > 1).then_some((part.part_number, total_parts)),
                notes,
            };
            let path = if total_parts > 1 {
                split_output_path(&base_path, part.part_number)
            } else {
                base_path.clone()
            };
            OutputArtifact {
                path,
                content: renderer.render(&ctx),
            }
        })
        .collect();

    write_outputs(&artifacts)?;

    if config.output.copy_to_clipboard {
        match artifacts.as_slice() {
            [single] => {
                progress("Copying output to clipboard...");
                copy_to_clipboard(&single.content);
            }
            _ => warn!(parts = artifacts.len(), "split output is not copied to the clipboard"),
        }
    }

    info!(
        files = metrics.total_files,
        tokens = metrics.total_tokens,
        parts = total_parts,
        "pack finished"
    );

    Ok(PackResult {
        total_files: metrics.total_files,
        total_characters: metrics.total_characters,
        total_tokens: metrics.total_tokens,
        file_char_counts: metrics.char_counts(),
        file_token_counts: metrics.token_counts(),
        top_files: metrics.top_files(config.output.top_files_length),
        suspicious_files,
        included_files: processed.iter().map(|f| f.path.clone()).collect(),
        parts: parts
            .iter()
            .zip(&artifacts)
            .map(|(part, artifact)| PartSummary {
                part_number: part.part_number,
                token_count: part.token_count,
                files: part.included_files.iter().map(|f| f.path.clone()).collect(),
                output_path: artifact.path.display().to_string(),
            })
            .collect(),
    })
}
