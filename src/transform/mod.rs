//! Transform module - Per-file text transformation
//!
//! Provides:
//! - comments: comment grammars dispatched by extension
//! - python: docstring-aware Python handler
//!
//! The transformation is a pure function of (path, content, options).

pub mod comments;
pub mod python;

use crate::core::model::{ProcessedFile, RawFile};
use comments::Grammar;

/// Which optional transformations to apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
    pub show_line_numbers: bool,
}

fn extension_of(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// Drop lines that contain only whitespace
pub fn remove_empty_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim trailing whitespace on every line and around the whole text
pub fn trim_whitespace(content: &str) -> String {
    content
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Prefix each line with its number, right-aligned to the widest number
pub fn add_line_numbers(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let width = lines.len().to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {}", i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Transform one file
pub fn process_content(path: &str, content: &str, options: &TransformOptions) -> String {
    let mut text = if options.remove_comments {
        Grammar::for_extension(extension_of(path)).strip(content)
    } else {
        content.to_string()
    };

    if options.remove_empty_lines {
        text = remove_empty_lines(&text);
    }

    text = trim_whitespace(&text);

    if options.show_line_numbers {
        text = add_line_numbers(&text);
    }

    text
}

/// Transform every surviving file, preserving order
pub fn process_files(files: &[RawFile], options: &TransformOptions) -> Vec<ProcessedFile> {
    files
        .iter()
        .map(|f| ProcessedFile::new(f.path.clone(), process_content(&f.path, &f.content, options)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> TransformOptions {
        TransformOptions {
            remove_comments: true,
            remove_empty_lines: true,
            show_line_numbers: false,
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("src/main.rs"), "rs");
        assert_eq!(extension_of("a.b/c"), "");
        assert_eq!(extension_of(".gitignore"), "");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
    }

    #[test]
    fn test_js_comment_removed() {
        let out = process_content("b.js", "// comment\nconst x=1;", &all_on());
        assert_eq!(out, "const x=1;");
    }

    #[test]
    fn test_always_trims_whitespace() {
        let out = process_content("a.txt", "\n\n  line one   \nline two\t\n\n", &TransformOptions::default());
        assert_eq!(out, "line one\nline two");
    }

    #[test]
    fn test_unknown_extension_keeps_comments() {
        let out = process_content("notes.txt", "// not stripped\n# either", &all_on());
        assert_eq!(out, "// not stripped\n# either");
    }

    #[test]
    fn test_empty_lines_kept_unless_requested() {
        let input = "a\n\n  \nb";
        assert_eq!(process_content("x.txt", input, &TransformOptions::default()), "a\n\n\nb");
        let opts = TransformOptions {
            remove_empty_lines: true,
            ..Default::default()
        };
        assert_eq!(process_content("x.txt", input, &opts), "a\nb");
    }

    #[test]
    fn test_line_numbers_padded_to_widest() {
        let content = (1..=10).map(|i| format!("l{}", i)).collect::<Vec<_>>().join("\n");
        let opts = TransformOptions {
            show_line_numbers: true,
            ..Default::default()
        };
        let out = process_content("x.txt", &content, &opts);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " 1: l1");
        assert_eq!(lines[9], "10: l10");
    }

    #[test]
    fn test_python_pipeline() {
        let input = "def foo():\n    '''doc'''\n    x = \"a # b\"  # trailing\n\n    return x\n";
        let out = process_content("m.py", input, &all_on());
        assert_eq!(out, "def foo():\n    x = \"a # b\"\n    return x");
    }

    #[test]
    fn test_deterministic() {
        let input = "/* a */\nfn main() {} // b\n";
        let opts = all_on();
        assert_eq!(
            process_content("m.rs", input, &opts),
            process_content("m.rs", input, &opts)
        );
    }

    #[test]
    fn test_process_files_preserves_order() {
        let files = vec![RawFile::new("z.rs", "z"), RawFile::new("a.rs", "a")];
        let processed = process_files(&files, &TransformOptions::default());
        let paths: Vec<_> = processed.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["z.rs", "a.rs"]);
    }
}
