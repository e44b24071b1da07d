//! # Repo Manifest Library
//!
//! This library provides the core functionality for building a deterministic
//! manifest of the projects living under a directory tree. It is designed to
//! be used by the `repo-manifest` command-line tool but can also be embedded
//! in other applications that need a machine-readable index of local
//! repositories.
//!
//! ## Quick Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use repo_manifest::manifest::{aggregate, ScanRecord};
//! use repo_manifest::metadata::RepoMetadata;
//! use std::path::Path;
//!
//! let record = ScanRecord {
//!     root: "/src/demo".into(),
//!     metadata: RepoMetadata {
//!         id: "demo".to_string(),
//!         one_liner: "a demonstration project".to_string(),
//!         ..RepoMetadata::default()
//!     },
//!     source_mtime: 1_700_000_000,
//! };
//!
//! let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! let manifest = aggregate(Path::new("/src"), vec![record], generated_at);
//!
//! assert_eq!(manifest.projects.len(), 1);
//! assert_eq!(manifest.projects[0].id, "demo");
//! assert!(manifest.conflicts.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Detection (`detect`)**: Decides whether a directory is a repository
//!   root, preferring `git rev-parse --show-toplevel` and falling back to a
//!   `.git` marker check.
//! - **Traversal (`walk`)**: Walks the scan root depth-first, pruning
//!   ignored directories and everything below a detected repository root,
//!   and staying safe under symlink cycles.
//! - **Metadata (`schema`, `metadata`)**: Each repository declares itself in
//!   a `project.metadata.json` file, validated against a schema document.
//! - **Aggregation (`manifest`)**: Folds the validated records into one
//!   manifest value, resolving duplicate ids deterministically and keeping
//!   the losers visible as conflicts.
//! - **Output (`writer`)**: Serializes with sorted keys and writes
//!   atomically, so the manifest on disk is byte-stable and never observed
//!   half-written.
//! - **Incrementality (`cache`)**: An optional mtime cache carries parsed
//!   records across runs so unchanged files are not re-read.
//!
//! ## Execution Flow
//!
//! The main entry point is [`pipeline::run`], which executes the following
//! high-level steps:
//!
//! 1.  **Walk**: Find repository roots under the scan root.
//! 2.  **Read**: Load and validate each root's metadata in parallel, with a
//!     per-file deadline and optional cache reuse.
//! 3.  **Fold**: Collect records and surface every excluded repository as a
//!     warning.
//! 4.  **Aggregate**: Build the manifest value.
//! 5.  **Write**: Persist it atomically, then refresh the cache.
//!
//! Per-repository problems are reported and skipped; only a failure to
//! write the manifest itself (or an unusable schema document) aborts a run.

pub mod cache;
pub mod defaults;
pub mod detect;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod schema;
pub mod walk;
pub mod writer;

#[cfg(test)]
mod manifest_proptest;
