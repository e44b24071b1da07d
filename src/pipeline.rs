//! # Scan Pipeline
//!
//! End-to-end orchestration of one manifest build.
//!
//! ## Process
//!
//! 1. **Walk**: traverse the scan root sequentially, collecting repository
//!    roots and skip events (`TreeWalker`).
//! 2. **Read**: load and validate each root's metadata file on the rayon
//!    worker pool. Results land in a mutex-guarded sink, and `par_iter`
//!    returning is the barrier, so aggregation never sees a partial set.
//!    Every read runs under a bounded deadline; one hung filesystem entry
//!    costs the scan a worker thread, not the whole run. With `--cache`,
//!    unchanged files are carried forward from the previous run without
//!    re-parsing.
//! 3. **Fold**: on the calling thread, split outcomes into records,
//!    warnings, and skips, logging one warning per excluded repository.
//! 4. **Aggregate and write**: build the manifest value, persist it
//!    atomically, then save the refreshed cache.
//!
//! Per-repository failures never abort the run. The only fatal outcomes
//! are an unusable schema document and a manifest that cannot be written.

use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use log::warn;
use rayon::prelude::*;

use crate::cache::ScanCache;
use crate::detect::RepoRootDetector;
use crate::error::{Error, Result};
use crate::manifest::{aggregate, ScanRecord};
use crate::metadata::{MetadataFile, MetadataReader, RepoMetadata};
use crate::schema::{Advisory, SchemaValidator};
use crate::walk::{SkipReason, TreeWalker, WalkEvent};
use crate::writer;

/// Deadline for reading and validating one metadata file.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Options for one scan invocation.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory tree to scan.
    pub root: PathBuf,
    /// Manifest destination.
    pub out: PathBuf,
    /// Schema document override; `None` uses the embedded default.
    pub schema: Option<PathBuf>,
    /// Treat advisory findings and unknown fields as hard violations.
    pub strict: bool,
    /// Cache file enabling incremental rescans; `None` disables caching.
    pub cache: Option<PathBuf>,
}

/// What one scan did, for the CLI summary.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
    /// Projects included in the manifest.
    pub included: usize,
    /// How many of those were carried forward from the cache.
    pub from_cache: usize,
    /// Duplicate-id conflicts recorded in the manifest.
    pub conflicts: usize,
    /// Directories and files the scan left out, with reasons.
    pub skipped: Vec<(PathBuf, SkipReason)>,
    /// Excluded repositories: path plus what was wrong.
    pub warnings: Vec<Warning>,
    /// Soft findings on repositories that were still included.
    pub advisories: Vec<Warning>,
}

/// One path-and-reason pair surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of inspecting one repository root.
enum RootOutcome {
    Included {
        record: ScanRecord,
        advisories: Vec<Advisory>,
        from_cache: bool,
    },
    /// No metadata file - the expected negative, not reported.
    Absent,
    Excluded {
        path: PathBuf,
        message: String,
    },
    TimedOut {
        path: PathBuf,
    },
}

/// What the deadline-guarded closure hands back on success.
struct RootRead {
    metadata: RepoMetadata,
    mtime: u64,
    advisories: Vec<Advisory>,
    from_cache: bool,
}

/// Execute one full scan and return the report.
pub fn run(options: &ScanOptions) -> Result<ScanReport> {
    let validator = match &options.schema {
        Some(path) => SchemaValidator::from_file(path)?,
        None => SchemaValidator::embedded()?,
    };
    let reader = MetadataReader::new(validator, options.strict);

    let scan_root = absolutize(&options.root);
    let walker = TreeWalker::new(RepoRootDetector::new());
    let events = walker.walk(&scan_root);

    let mut roots = Vec::new();
    let mut skipped = Vec::new();
    for event in events {
        match event {
            WalkEvent::RootFound(path) => roots.push(path),
            WalkEvent::Skipped(path, reason) => skipped.push((path, reason)),
        }
    }
    log::info!(
        "found {} repository roots under {}",
        roots.len(),
        scan_root.display()
    );

    let previous_cache = Arc::new(match &options.cache {
        Some(path) => ScanCache::load(path),
        None => ScanCache::default(),
    });

    // Read phase. Independent per root; par_iter returning is the barrier.
    let outcomes: Mutex<Vec<RootOutcome>> = Mutex::new(Vec::with_capacity(roots.len()));
    roots.par_iter().for_each(|root| {
        let outcome = inspect_root(root, &reader, &previous_cache);
        outcomes.lock().unwrap().push(outcome);
    });
    let outcomes = outcomes.into_inner().unwrap();

    // Fold phase, single-threaded. All user-visible logging happens here.
    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut advisories = Vec::new();
    let mut from_cache = 0usize;
    let mut next_cache = options.cache.as_ref().map(|_| ScanCache::default());
    for outcome in outcomes {
        match outcome {
            RootOutcome::Included {
                record,
                advisories: found,
                from_cache: cached,
            } => {
                for advisory in found {
                    warn!("{}: {}", record.root.display(), advisory.message);
                    advisories.push(Warning {
                        path: record.root.clone(),
                        message: advisory.message,
                    });
                }
                if cached {
                    from_cache += 1;
                }
                if let Some(cache) = next_cache.as_mut() {
                    cache.insert(
                        MetadataReader::metadata_path(&record.root),
                        record.source_mtime,
                        record.metadata.clone(),
                    );
                }
                records.push(record);
            }
            RootOutcome::Absent => {}
            RootOutcome::Excluded { path, message } => {
                warn!("{}: {}", path.display(), message);
                warnings.push(Warning { path, message });
            }
            RootOutcome::TimedOut { path } => {
                let error = Error::Timeout {
                    path: path.clone(),
                    seconds: READ_TIMEOUT.as_secs(),
                };
                warn!("{error}");
                skipped.push((path, SkipReason::Timeout));
            }
        }
    }

    let manifest = aggregate(&scan_root, records, Utc::now());
    if !manifest.conflicts.is_empty() {
        warn!("duplicate project ids detected; see conflicts in manifest");
    }
    writer::write(&manifest, &options.out)?;

    if let (Some(cache_path), Some(cache)) = (&options.cache, &next_cache) {
        if let Err(error) = cache.save(cache_path) {
            warn!("{error}");
        }
    }

    Ok(ScanReport {
        manifest_path: options.out.clone(),
        included: manifest.projects.len(),
        from_cache,
        conflicts: manifest.conflicts.len(),
        skipped,
        warnings,
        advisories,
    })
}

/// Inspect one repository root: stat, consult the cache, read on a miss.
///
/// Runs on a worker thread; every failure is folded into a `RootOutcome`
/// so the scan itself never aborts here.
fn inspect_root(root: &Path, reader: &MetadataReader, cache: &Arc<ScanCache>) -> RootOutcome {
    let metadata_path = MetadataReader::metadata_path(root);
    let owned_root = root.to_path_buf();
    let reader = reader.clone();
    let cache = Arc::clone(cache);

    let result = run_with_deadline(READ_TIMEOUT, move || {
        let path = MetadataReader::metadata_path(&owned_root);
        let mtime = MetadataReader::mtime(&path)?;
        if let Some(metadata) = cache.lookup(&path, mtime) {
            return Ok(RootRead {
                metadata: metadata.clone(),
                mtime,
                advisories: Vec::new(),
                from_cache: true,
            });
        }
        let MetadataFile {
            metadata,
            mtime,
            advisories,
        } = reader.read(&owned_root)?;
        Ok(RootRead {
            metadata,
            mtime,
            advisories,
            from_cache: false,
        })
    });

    match result {
        Some(Ok(read)) => RootOutcome::Included {
            record: ScanRecord {
                root: root.to_path_buf(),
                metadata: read.metadata,
                source_mtime: read.mtime,
            },
            advisories: read.advisories,
            from_cache: read.from_cache,
        },
        Some(Err(Error::NotFound { .. })) => RootOutcome::Absent,
        Some(Err(error)) => RootOutcome::Excluded {
            path: root.to_path_buf(),
            message: exclusion_message(&error),
        },
        None => RootOutcome::TimedOut {
            path: metadata_path,
        },
    }
}

/// Warning text for an excluded repository, without repeating the path the
/// caller already prints.
fn exclusion_message(error: &Error) -> String {
    match error {
        Error::Parse { message, .. } => format!("invalid json: {message}"),
        Error::Validation { message, .. } => message.clone(),
        Error::Unreadable { message, .. } => format!("cannot read: {message}"),
        other => other.to_string(),
    }
}

/// Run `task` on a helper thread, waiting at most `deadline` for it.
///
/// `None` on expiry. A hung task keeps its thread until the process ends;
/// the scan moves on without it.
fn run_with_deadline<T, F>(deadline: Duration, task: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = sender.send(task());
    });
    receiver.recv_timeout(deadline).ok()
}

/// Resolve a user-supplied scan root to an absolute path.
///
/// Canonicalized when possible so manifest paths come out stable no matter
/// how the root was spelled. A nonexistent root is absolutized textually;
/// downstream it simply yields an empty manifest.
fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
