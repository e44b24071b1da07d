//! CLI argument parsing and the scan command itself.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use repo_manifest::defaults;
use repo_manifest::output::{emoji, OutputConfig};
use repo_manifest::pipeline::{self, ScanOptions, ScanReport};

/// Repo Manifest - index project metadata across a tree of repositories
#[derive(Parser, Debug)]
#[command(name = "repo-manifest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory tree to scan (defaults to ~/src)
    #[arg(long, value_name = "PATH", env = "REPO_MANIFEST_ROOT")]
    root: Option<PathBuf>,

    /// Manifest destination (defaults to the user config directory)
    #[arg(long, value_name = "PATH", env = "REPO_MANIFEST_OUT")]
    out: Option<PathBuf>,

    /// Validate against this schema document instead of the built-in one
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// Treat advisory findings and unknown fields as hard violations
    #[arg(long)]
    strict: bool,

    /// Cache file for incremental rescans
    #[arg(long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Suppress the summary; warnings still go to the log
    #[arg(short, long)]
    quiet: bool,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Execute the scan described by the parsed arguments.
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(Env::default().default_filter_or(&self.log_level)).init();
        let output = OutputConfig::from_env_and_flag(&self.color);

        if let Some(jobs) = self.jobs {
            if let Err(error) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                log::warn!("worker pool already configured: {error}");
            }
        }

        let options = ScanOptions {
            root: self.root.unwrap_or_else(defaults::default_scan_root),
            out: self.out.unwrap_or_else(defaults::default_manifest_path),
            schema: self.schema,
            strict: self.strict,
            cache: self.cache,
        };

        log::info!("scanning {}", options.root.display());
        let report = pipeline::run(&options)?;

        if !self.quiet {
            print_summary(&report, &output);
        }
        Ok(())
    }
}

fn print_summary(report: &ScanReport, output: &OutputConfig) {
    println!(
        "{} {} projects indexed",
        emoji(output, "✅", "[OK]"),
        report.included
    );
    if report.from_cache > 0 {
        println!("   {} reused from cache", report.from_cache);
    }
    if report.conflicts > 0 {
        println!(
            "{} {} duplicate ids recorded under \"conflicts\"",
            emoji(output, "⚠️", "[WARN]"),
            report.conflicts
        );
    }
    if !report.warnings.is_empty() {
        println!(
            "{} {} repositories excluded:",
            emoji(output, "⚠️", "[WARN]"),
            report.warnings.len()
        );
        for warning in &report.warnings {
            println!("   {}: {}", warning.path.display(), warning.message);
        }
    }
    for advisory in &report.advisories {
        println!(
            "   note: {}: {}",
            advisory.path.display(),
            advisory.message
        );
    }
    println!("   Manifest written to: {}", report.manifest_path.display());
}
