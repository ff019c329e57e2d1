//! CLI module - Command-line interface definitions and handlers

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use repopack::config::{load_file_config, merge_config, CliOverrides};
use repopack::core::model::PackResult;
use repopack::core::render::OutputStyle;
use repopack::core::tokenizer::TokenModel;
use repopack::core::util::Concurrency;
use repopack::flows::pack::pack;

/// repopack - pack a repository into a single, LLM-friendly text file.
#[derive(Parser, Debug)]
#[command(name = "repopack")]
#[command(
    author,
    version,
    about,
    long_about = r#"repopack walks a directory, drops binaries and files that look like they
contain secrets, optionally strips comments, and writes everything that is left
into one deterministically ordered document.

Output styles:
- plain: separator-delimited text (default)
- xml: tagged sections, file contents in CDATA
- markdown: headings and fenced code blocks

Configuration is read from ./repopack.config.json when present (or --config),
and command-line flags override it.

Examples:
    repopack
    repopack src --style xml -o context.xml
    repopack --include "src/**/*.rs,Cargo.toml" --remove-comments
    repopack --max-tokens-per-part 100000
"#
)]
pub struct Cli {
    /// Directory to pack.
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directory: PathBuf,

    /// Path to a JSON config file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        long_help = "Path to a JSON config file (camelCase keys).\n\n\
If omitted, ./repopack.config.json is used when it exists. An explicit path that\n\
does not exist is an error."
    )]
    pub config: Option<PathBuf>,

    /// Output file path.
    #[arg(
        short,
        long,
        value_name = "FILE",
        long_help = "Output file path, relative to the current directory.\n\n\
Defaults to repopack-output.<ext>, where the extension follows --style. When the\n\
output is split, parts are written as <stem>.<n>.<ext>."
    )]
    pub output: Option<PathBuf>,

    /// Output style (plain/xml/markdown).
    #[arg(
        long,
        value_name = "STYLE",
        long_help = "Select the output style.\n\n\
Supported values:\n\
- plain (default)\n\
- xml\n\
- markdown (alias: md)"
    )]
    pub style: Option<OutputStyle>,

    /// Comma-separated include globs.
    #[arg(
        long,
        value_name = "PATTERNS",
        value_delimiter = ',',
        long_help = "Comma-separated glob patterns selecting files to pack (default: **/*).\n\n\
`*` does not cross directory boundaries; use `**` for that."
    )]
    pub include: Vec<String>,

    /// Comma-separated additional ignore patterns.
    #[arg(
        short,
        long,
        value_name = "PATTERNS",
        value_delimiter = ',',
        long_help = "Comma-separated ignore patterns (gitignore syntax), added to the ones from\n\
the config file, the built-in defaults, .gitignore and .repopackignore."
    )]
    pub ignore: Vec<String>,

    /// Do not apply .gitignore rules.
    #[arg(long)]
    pub no_gitignore: bool,

    /// Do not apply the built-in ignore patterns.
    #[arg(
        long,
        long_help = "Do not apply the built-in ignore patterns (VCS metadata, dependency and\n\
build directories, lock files, logs, editor artefacts)."
    )]
    pub no_default_patterns: bool,

    /// Text placed in the summary section.
    #[arg(long, value_name = "TEXT")]
    pub header_text: Option<String>,

    /// File whose contents are appended as an instruction block.
    #[arg(
        long,
        value_name = "FILE",
        long_help = "File whose contents are appended as an instruction block at the end of\n\
the output (the last part when split). A missing file aborts the run."
    )]
    pub instruction_file_path: Option<PathBuf>,

    /// Strip comments from supported languages.
    #[arg(long)]
    pub remove_comments: bool,

    /// Remove whitespace-only lines.
    #[arg(long)]
    pub remove_empty_lines: bool,

    /// Prefix every line with its line number.
    #[arg(long)]
    pub output_show_line_numbers: bool,

    /// Number of largest files to list in the summary.
    #[arg(long, value_name = "N")]
    pub top_files_len: Option<usize>,

    /// Copy the output to the system clipboard.
    #[arg(long)]
    pub copy: bool,

    /// Skip the secret scan.
    #[arg(
        long,
        long_help = "Skip the secret scan. Files that look like they contain credentials are\n\
then packed like any other file."
    )]
    pub no_security_check: bool,

    /// Show empty directories in the structure section.
    #[arg(long)]
    pub include_empty_directories: bool,

    /// Split output into parts of at most N tokens.
    #[arg(
        long,
        value_name = "N",
        long_help = "Split the output into parts of at most N tokens each.\n\n\
Files are never split: a single file larger than N gets a part of its own."
    )]
    pub max_tokens_per_part: Option<usize>,

    /// Token encoding (cl100k/o200k/heuristic).
    #[arg(
        long,
        value_name = "ENCODING",
        long_help = "Token encoding used for counting.\n\n\
Supported values:\n\
- cl100k (default)\n\
- o200k\n\
- heuristic: fast estimate, needs no encoding data"
    )]
    pub token_encoding: Option<TokenModel>,

    /// Print the pack result as JSON on stdout.
    #[arg(
        long,
        long_help = "Print the pack result (counts, top files, suspicious files, parts) as JSON\n\
on stdout instead of the human-readable summary."
    )]
    pub json: bool,

    /// Disable colored output.
    #[arg(
        long,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        long_help = "Suppress progress lines and the summary. Only errors are logged."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        long_help = "Enable debug diagnostics on stderr. RUST_LOG takes precedence when set."
    )]
    pub verbose: bool,
}

fn flag(set: bool, value: bool) -> Option<bool> {
    set.then_some(value)
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            include: self.include.clone(),
            ignore: self.ignore.clone(),
            use_gitignore: flag(self.no_gitignore, false),
            use_default_patterns: flag(self.no_default_patterns, false),
            style: self.style,
            output: self.output.clone(),
            header_text: self.header_text.clone(),
            instruction_file_path: self.instruction_file_path.clone(),
            remove_comments: flag(self.remove_comments, true),
            remove_empty_lines: flag(self.remove_empty_lines, true),
            show_line_numbers: flag(self.output_show_line_numbers, true),
            top_files_length: self.top_files_len,
            copy_to_clipboard: flag(self.copy, true),
            include_empty_directories: flag(self.include_empty_directories, true),
            max_tokens_per_part: self.max_tokens_per_part,
            security_check: flag(self.no_security_check, false),
            encoding: self.token_encoding,
        }
    }
}

fn print_summary(result: &PackResult) {
    if !result.top_files.is_empty() {
        println!("{}", format!("Top {} Files by Character Count:", result.top_files.len()).cyan());
        for (i, file) in result.top_files.iter().enumerate() {
            println!(
                "{}. {} ({} chars, {} tokens)",
                i + 1,
                file.path,
                file.char_count,
                file.token_count
            );
        }
        println!();
    }

    println!("{}", "Security Check:".cyan());
    if result.suspicious_files.is_empty() {
        println!("{}", "No suspicious files detected.".green());
    } else {
        println!(
            "{}",
            format!(
                "{} suspicious file(s) detected and excluded:",
                result.suspicious_files.len()
            )
            .yellow()
        );
        for (i, finding) in result.suspicious_files.iter().enumerate() {
            println!("{}. {}", i + 1, finding.file_path);
            for message in &finding.messages {
                println!("   - {}", message.dimmed());
            }
        }
    }
    println!();

    println!("{}", "Pack Summary:".cyan());
    println!("  Total Files: {}", result.total_files);
    println!("  Total Chars: {}", result.total_characters);
    println!("  Total Tokens: {}", result.total_tokens);
    if result.parts.len() == 1 {
        println!("  Output: {}", result.parts[0].output_path);
    } else {
        println!("  Outputs:");
        for part in &result.parts {
            println!(
                "    {} ({} files, {} tokens)",
                part.output_path,
                part.files.len(),
                part.token_count
            );
        }
    }
    println!();
    println!("{}", "All done! Your repository has been packed.".green().bold());
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let root = cwd.join(&cli.directory);

    let file_config = load_file_config(&cwd, cli.config.as_deref())?;
    let config = merge_config(file_config, cli.overrides());

    let quiet = cli.quiet;
    let progress = move |message: &str| {
        if !quiet {
            eprintln!("{}", message.dimmed());
        }
    };

    let result = pack(&root, &cwd, &config, Concurrency::from_host(), &progress)
        .with_context(|| format!("Failed to pack {}", root.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if !cli.quiet {
        print_summary(&result);
    }

    Ok(())
}
