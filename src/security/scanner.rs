//! Concurrent secret scanning over acquired files

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::model::{RawFile, ScanFinding};
use crate::core::util::{map_bounded, Concurrency};
use crate::security::rules::RuleSet;

/// Lowercase extension used to scope rules. Dotfiles such as `.npmrc` use
/// their name without the leading dot.
fn extension_tag(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    match name.rsplit_once('.') {
        Some(("", rest)) => rest.to_ascii_lowercase(),
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Describe every rule match in `content`, one message per matching line
pub fn scan_content(path: &str, content: &str, rules: &RuleSet) -> Vec<String> {
    let ext = extension_tag(path);
    let mut messages = Vec::new();

    for rule in rules.rules().iter().filter(|r| r.applies_to(&ext)) {
        // Matches arrive in order, so the line count only ever moves forward
        let mut counted_to = 0usize;
        let mut line = 1usize;
        let mut last_line = 0usize;
        for m in rule.pattern.find_iter(content) {
            line += content[counted_to..m.start()].matches('\n').count();
            counted_to = m.start();
            if line == last_line {
                continue;
            }
            last_line = line;
            messages.push(format!("[{}] {} (line {})", rule.id, rule.description, line));
        }
    }

    messages
}

/// Run `detector` over one file. A panic is logged and reported as no findings.
pub fn scan_file_with<D>(file: &RawFile, detector: D) -> Vec<String>
where
    D: FnOnce(&str, &str) -> Vec<String>,
{
    match catch_unwind(AssertUnwindSafe(|| detector(&file.path, &file.content))) {
        Ok(messages) => messages,
        Err(_) => {
            warn!(path = %file.path, "secret scan failed, treating file as clean");
            Vec::new()
        }
    }
}

/// Scan one file against `rules`. A detector failure is logged and reported as no findings.
pub fn scan_file_safe(file: &RawFile, rules: &RuleSet) -> Vec<String> {
    scan_file_with(file, |path, content| scan_content(path, content, rules))
}

fn run_scan_with<D>(
    files: &[RawFile],
    concurrency: Concurrency,
    progress: &(dyn Fn(&str) + Sync),
    detector: D,
) -> Vec<ScanFinding>
where
    D: Fn(&str, &str) -> Vec<String> + Sync + Send,
{
    let total = files.len();
    let slots = map_bounded(files, concurrency, |i, file| {
        progress(&format!("Running security check... ({}/{}) {}", i + 1, total, file.path));
        scan_file_with(file, &detector)
    });

    let findings: Vec<ScanFinding> = files
        .iter()
        .zip(slots)
        .filter(|(_, messages)| !messages.is_empty())
        .map(|(file, messages)| ScanFinding {
            file_path: file.path.clone(),
            messages,
        })
        .collect();

    debug!(scanned = total, suspicious = findings.len(), "security check finished");
    findings
}

/// Scan every file with at most `concurrency` scans in flight.
///
/// Findings come back in input order. Files without findings are omitted.
pub fn run_security_check(
    files: &[RawFile],
    rules: &RuleSet,
    concurrency: Concurrency,
    progress: &(dyn Fn(&str) + Sync),
) -> Vec<ScanFinding> {
    run_scan_with(files, concurrency, progress, |path, content| {
        scan_content(path, content, rules)
    })
}
