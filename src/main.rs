//! repopack - pack a repository into a single LLM-friendly file
//!
//! repopack provides:
//! - Deterministic, directory-first file ordering
//! - Binary skipping and charset-aware decoding
//! - Secret scanning that excludes suspicious files
//! - Optional comment stripping, line numbers and token-bounded splitting
//! - Plain, XML and Markdown output

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli)
}
