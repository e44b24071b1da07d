//! # Repo Manifest CLI
//!
//! Binary entry point for the `repo-manifest` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the scan pipeline with the parsed options.
//! - Handling top-level application errors and translating them into
//!   user-friendly output.
//!
//! The core application logic lives in the `repo_manifest` library crate,
//! keeping the binary a thin wrapper around reusable functionality.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
