//! # Repository Root Detection
//!
//! Decides whether a directory is the top of a repository. Two rules, first
//! match wins:
//!
//! 1. Ask `git` for the working-tree top level of the directory; if it
//!    names the directory itself (compared via canonical paths), it is a
//!    root.
//! 2. Otherwise, the presence of a `.git` entry makes it a root. The entry
//!    may be a directory (ordinary clone) or a file (worktrees and
//!    submodules use a gitfile).
//!
//! A failing git query - binary missing, not a repository, hung process -
//! falls through silently to rule 2; detection trouble must never abort a
//! scan. The subprocess runs under a bounded deadline so one hung `git`
//! cannot stall the walk.
//!
//! The query sits behind the [`GitOperations`] trait so tests can inject a
//! mock instead of spawning processes.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Name of the version-control marker entry.
pub const GIT_DIR_NAME: &str = ".git";

/// Deadline for one `git rev-parse --show-toplevel` query.
const GIT_TOPLEVEL_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll interval while waiting on the git subprocess.
const GIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Trait for the version-control query - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Top-level working directory git reports for `dir`, if any.
    ///
    /// `None` covers every failure mode: git not installed, `dir` outside
    /// any repository, the query timing out.
    fn toplevel(&self, dir: &Path) -> Option<PathBuf>;
}

/// `GitOperations` backed by the real `git` binary.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn toplevel(&self, dir: &Path) -> Option<PathBuf> {
        let mut child = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["rev-parse", "--show-toplevel"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .ok()?;

        let deadline = Instant::now() + GIT_TOPLEVEL_TIMEOUT;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        log::debug!("git toplevel query timed out for {}", dir.display());
                        let _ = child.kill();
                        let _ = child.wait();
                        return None;
                    }
                    std::thread::sleep(GIT_POLL_INTERVAL);
                }
                Err(_) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
            }
        };

        if !status.success() {
            return None;
        }

        // The output is a single path line, far below pipe capacity, so the
        // child can never block on a full pipe before exiting.
        let mut stdout = child.stdout.take()?;
        let mut output = String::new();
        std::io::Read::read_to_string(&mut stdout, &mut output).ok()?;
        let line = output.lines().next()?.trim();
        if line.is_empty() {
            return None;
        }
        Some(PathBuf::from(line))
    }
}

/// Decides whether directories are repository roots.
pub struct RepoRootDetector {
    git_ops: Box<dyn GitOperations>,
}

impl RepoRootDetector {
    /// Creates a detector backed by the real `git` binary.
    pub fn new() -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Creates a detector with a custom git query implementation.
    ///
    /// This is primarily used for testing to inject mock operations.
    #[cfg(test)]
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Whether `dir` is the top of a repository.
    pub fn is_repo_root(&self, dir: &Path) -> bool {
        if let Some(toplevel) = self.git_ops.toplevel(dir) {
            if same_directory(&toplevel, dir) {
                return true;
            }
        }
        dir.join(GIT_DIR_NAME).exists()
    }
}

impl Default for RepoRootDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Compare two directory paths by canonical identity.
///
/// Git prints the toplevel with symlinks resolved, which need not match the
/// walked path textually.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(canonical_a), Ok(canonical_b)) => canonical_a == canonical_b,
        _ => false,
    }
}
