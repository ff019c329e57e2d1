//! Comment grammars
//!
//! Each supported language family maps to one [`Grammar`]. Stripping is a
//! single pass over the text that tracks string literals so comment markers
//! inside strings are kept. This is an approximation, not a parser: unusual
//! quoting (unbalanced quote-like sequences, heredocs, regex literals) can
//! confuse it.

use crate::transform::python;

/// A comment grammar, selected by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `//` and `/* */` (C, C++, C#, Java, JS/TS, Go, Rust, Swift, Kotlin, ...)
    CStyle,
    /// `#` line comments (shell, YAML, TOML, Perl, R, ...)
    Hash,
    /// `--` and `/* */`
    Sql,
    /// `<!-- -->`
    Markup,
    /// `#` plus `=begin`/`=end` blocks
    Ruby,
    /// `/* */` only
    Css,
    /// `//` and `/* */` with CSS-style strings
    Sass,
    /// Dedicated handler that understands docstrings
    Python,
    /// Markup, then style, then script (Vue/Svelte single-file components)
    Composite,
    /// Leave the content untouched
    Identity,
}

impl Grammar {
    /// Pick the grammar for a file extension (case-insensitive)
    pub fn for_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "c" | "h" | "cpp" | "cc" | "cxx" | "hpp" | "hh" | "cs" | "java" | "js" | "mjs"
            | "cjs" | "jsx" | "ts" | "mts" | "cts" | "tsx" | "go" | "rs" | "swift" | "kt"
            | "kts" | "scala" | "dart" | "php" | "groovy" | "proto" => Grammar::CStyle,
            "sh" | "bash" | "zsh" | "fish" | "yml" | "yaml" | "toml" | "pl" | "pm" | "r"
            | "ps1" | "conf" | "cfg" | "ini" => Grammar::Hash,
            "sql" => Grammar::Sql,
            "html" | "htm" | "xml" | "xhtml" | "svg" | "xsl" => Grammar::Markup,
            "rb" | "rake" | "gemspec" => Grammar::Ruby,
            "css" => Grammar::Css,
            "scss" | "sass" | "less" => Grammar::Sass,
            "py" | "pyw" | "pyi" => Grammar::Python,
            "vue" | "svelte" => Grammar::Composite,
            _ => Grammar::Identity,
        }
    }

    /// Remove comments from `content`
    pub fn strip(&self, content: &str) -> String {
        match self {
            Grammar::CStyle => strip_with(content, &C_STYLE),
            Grammar::Hash => strip_with(content, &HASH),
            Grammar::Sql => strip_with(content, &SQL),
            Grammar::Markup => strip_with(content, &MARKUP),
            Grammar::Ruby => strip_ruby(content),
            Grammar::Css => strip_with(content, &CSS),
            Grammar::Sass => strip_with(content, &SASS),
            Grammar::Python => python::strip_comments(content),
            Grammar::Composite => {
                let markup = strip_with(content, &MARKUP);
                let style = strip_with(&markup, &CSS);
                strip_with(&style, &C_STYLE)
            }
            Grammar::Identity => content.to_string(),
        }
    }
}

/// Token table for the generic scanner
struct Syntax {
    line: &'static [&'static str],
    block: &'static [(&'static str, &'static str)],
    quotes: &'static [char],
    /// Line comments must start a line or follow whitespace (YAML/shell `#`)
    line_needs_boundary: bool,
    /// Keep a `#!` line at the very top of the file
    keep_shebang: bool,
}

const C_STYLE: Syntax = Syntax {
    line: &["//"],
    block: &[("/*", "*/")],
    quotes: &['"', '\'', '`'],
    line_needs_boundary: false,
    keep_shebang: true,
};

const HASH: Syntax = Syntax {
    line: &["#"],
    block: &[],
    quotes: &['"', '\''],
    line_needs_boundary: true,
    keep_shebang: true,
};

const SQL: Syntax = Syntax {
    line: &["--"],
    block: &[("/*", "*/")],
    quotes: &['\'', '"'],
    line_needs_boundary: false,
    keep_shebang: false,
};

const MARKUP: Syntax = Syntax {
    line: &[],
    block: &[("<!--", "-->")],
    quotes: &[],
    line_needs_boundary: false,
    keep_shebang: false,
};

const CSS: Syntax = Syntax {
    line: &[],
    block: &[("/*", "*/")],
    quotes: &['"', '\''],
    line_needs_boundary: false,
    keep_shebang: false,
};

const SASS: Syntax = Syntax {
    line: &["//"],
    block: &[("/*", "*/")],
    quotes: &['"', '\''],
    line_needs_boundary: false,
    keep_shebang: false,
};

fn starts_with_at(chars: &[char], i: usize, token: &str) -> bool {
    let mut j = i;
    for tc in token.chars() {
        if chars.get(j) != Some(&tc) {
            return false;
        }
        j += 1;
    }
    true
}

/// Index just past the string literal opened by `chars[start]`.
///
/// Backslash escapes are honoured. Quotes other than backticks stop at the
/// end of the line so an unbalanced quote cannot swallow the rest of a file.
fn skip_string(chars: &[char], start: usize) -> usize {
    let quote = chars[start];
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == quote {
            return i + 1;
        }
        if c == '\n' && quote != '`' {
            return i;
        }
        i += 1;
    }
    chars.len()
}

fn strip_with(content: &str, syntax: &Syntax) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut i = 0;

    if syntax.keep_shebang && starts_with_at(&chars, 0, "#!") {
        while i < chars.len() && chars[i] != '\n' {
            out.push(chars[i]);
            i += 1;
        }
    }

    'outer: while i < chars.len() {
        let c = chars[i];

        if syntax.quotes.contains(&c) {
            let end = skip_string(&chars, i);
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }

        for (open, close) in syntax.block {
            if starts_with_at(&chars, i, open) {
                let mut j = i + open.chars().count();
                while j < chars.len() && !starts_with_at(&chars, j, close) {
                    j += 1;
                }
                i = (j + close.chars().count()).min(chars.len());
                continue 'outer;
            }
        }

        for token in syntax.line {
            if starts_with_at(&chars, i, token) {
                let at_boundary = i == 0 || chars[i - 1].is_whitespace();
                if syntax.line_needs_boundary && !at_boundary {
                    break;
                }
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue 'outer;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

/// Ruby: `#` comments plus `=begin` ... `=end` blocks at line start
fn strip_ruby(content: &str) -> String {
    let mut kept = Vec::new();
    let mut in_block = false;
    for line in content.split('\n') {
        if in_block {
            if line.starts_with("=end") {
                in_block = false;
            }
            continue;
        }
        if line.starts_with("=begin") {
            in_block = true;
            continue;
        }
        kept.push(line);
    }
    strip_with(&kept.join("\n"), &HASH)
}
