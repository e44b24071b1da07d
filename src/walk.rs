//! # Tree Traversal
//!
//! Walks the scan root looking for repository roots. Three rules shape the
//! walk:
//!
//! - Directories whose base name is in [`SKIP_DIRS`] are pruned outright
//!   (dependency trees, build output, VCS internals). The scan root itself
//!   is exempt.
//! - Once a directory is recognized as a repository root, nothing beneath
//!   it is visited. One root consumes one branch of the walk no matter how
//!   large its internal tree, so a monorepo checkout costs a single
//!   detection; nested repositories such as vendored checkouts are
//!   invisible by design.
//! - Symlinked directories are followed but visited at most once, tracked
//!   by canonical identity, so link cycles and diamonds terminate.
//!
//! Unreadable directories are reported as skips, never as fatal errors.
//! Directories are visited in file-name order, so the event stream for a
//! given tree is stable across runs and platforms.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::detect::RepoRootDetector;

/// Directory base names that are never descended into.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    ".codex",
    "node_modules",
    ".venv",
    "venv",
    "target",
    "dist",
    "build",
    ".tox",
    ".pytest_cache",
    ".mypy_cache",
    ".cache",
];

/// Why a path was left out of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Base name matched [`SKIP_DIRS`].
    IgnoredName,
    /// The directory or file could not be read or resolved.
    Unreadable,
    /// A symlink led back to an already-visited directory.
    AlreadyVisited,
    /// Reading the repository's metadata file exceeded the deadline.
    /// Emitted by the pipeline, not by the walker.
    Timeout,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkipReason::IgnoredName => "skip-name",
            SkipReason::Unreadable => "unreadable",
            SkipReason::AlreadyVisited => "already-visited",
            SkipReason::Timeout => "timeout",
        };
        f.write_str(name)
    }
}

/// One observation during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    /// A repository root; descent beneath it was pruned.
    RootFound(PathBuf),
    /// A directory that was not traversed.
    Skipped(PathBuf, SkipReason),
}

/// Traverses a scan root and emits [`WalkEvent`]s.
pub struct TreeWalker {
    detector: RepoRootDetector,
    skip_names: HashSet<String>,
}

impl TreeWalker {
    /// Walker with the standard skip set.
    pub fn new(detector: RepoRootDetector) -> Self {
        Self::with_skip_names(detector, SKIP_DIRS)
    }

    /// Walker with a custom skip set.
    pub fn with_skip_names(detector: RepoRootDetector, names: &[&str]) -> Self {
        Self {
            detector,
            skip_names: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Traverse `scan_root` exhaustively and return every event.
    ///
    /// Directories are visited in file-name order, so when two paths lead
    /// to the same directory the lexicographically first one wins the
    /// visit and the other is reported as already visited.
    ///
    /// A nonexistent or unreadable scan root produces a single unreadable
    /// skip rather than an error; an empty manifest is a valid outcome.
    pub fn walk(&self, scan_root: &Path) -> Vec<WalkEvent> {
        let mut events = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();

        let mut iter = WalkDir::new(scan_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        while let Some(next) = iter.next() {
            let entry = match next {
                Ok(entry) => entry,
                Err(error) => {
                    let path = error.path().unwrap_or(scan_root).to_path_buf();
                    // walkdir reports ancestor link loops as errors
                    let reason = if error.loop_ancestor().is_some() {
                        SkipReason::AlreadyVisited
                    } else {
                        SkipReason::Unreadable
                    };
                    log::debug!("walk skipping {} ({reason}): {error}", path.display());
                    events.push(WalkEvent::Skipped(path, reason));
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();

            // the scan root itself is exempt from the skip set
            if entry.depth() > 0 && self.is_skip_name(path) {
                events.push(WalkEvent::Skipped(
                    path.to_path_buf(),
                    SkipReason::IgnoredName,
                ));
                iter.skip_current_dir();
                continue;
            }

            match std::fs::canonicalize(path) {
                Ok(identity) => {
                    if !visited.insert(identity) {
                        events.push(WalkEvent::Skipped(
                            path.to_path_buf(),
                            SkipReason::AlreadyVisited,
                        ));
                        iter.skip_current_dir();
                        continue;
                    }
                }
                Err(error) => {
                    log::debug!("cannot canonicalize {}: {error}", path.display());
                    events.push(WalkEvent::Skipped(
                        path.to_path_buf(),
                        SkipReason::Unreadable,
                    ));
                    iter.skip_current_dir();
                    continue;
                }
            }

            if self.detector.is_repo_root(path) {
                events.push(WalkEvent::RootFound(path.to_path_buf()));
                iter.skip_current_dir();
            }
        }

        events
    }

    fn is_skip_name(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.skip_names.contains(name))
    }
}
