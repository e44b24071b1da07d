//! # Manifest Assembly
//!
//! Pure data transform from per-repository scan records to the final
//! manifest document. This is where the two ordering guarantees live:
//!
//! - `projects` is sorted by `(id, path)` ascending, so the order in which
//!   the walk happened to discover repositories is never observable.
//! - Duplicate ids are resolved by keeping the entry whose path sorts
//!   lexicographically first; every contender is recorded in a [`Conflict`]
//!   alongside the kept path. The tie-break is an explicit documented
//!   policy, pinned by tests.
//!
//! The manifest is an immutable value, built once per invocation and handed
//! to the writer. Nothing here touches the filesystem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::{RepoMetadata, METADATA_FILE_NAME};

/// Manifest format version stamped into every document.
pub const MANIFEST_VERSION: &str = "1.0";

/// One successfully scanned repository, before aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    /// The repository root that owns the metadata file.
    pub root: PathBuf,
    pub metadata: RepoMetadata,
    /// Mtime of the metadata file at scan time, whole seconds.
    pub source_mtime: u64,
}

/// One project in the manifest: the metadata record plus provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    pub one_liner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoints: Option<BTreeMap<String, String>>,
    /// Absolute path of the repository root.
    pub path: PathBuf,
    /// Relative filename the record came from.
    pub source_metadata: String,
    /// Mtime of that file at scan time, whole seconds since the epoch.
    pub source_mtime: u64,
}

impl From<ScanRecord> for ManifestEntry {
    fn from(record: ScanRecord) -> Self {
        let RepoMetadata {
            id,
            one_liner,
            title,
            tags,
            stack,
            entrypoints,
        } = record.metadata;
        Self {
            id,
            one_liner,
            title,
            tags,
            stack,
            entrypoints,
            path: record.root,
            source_metadata: METADATA_FILE_NAME.to_string(),
            source_mtime: record.source_mtime,
        }
    }
}

/// Two or more repositories claiming the same id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    /// Every root that claimed the id, sorted ascending.
    pub paths: Vec<PathBuf>,
    /// The root whose entry survived into `projects`.
    pub kept_path: PathBuf,
}

/// The build's sole persisted output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    /// The scan root, absolute.
    pub root: PathBuf,
    pub generated_at: DateTime<Utc>,
    /// At most one entry per id, sorted by `(id, path)`.
    pub projects: Vec<ManifestEntry>,
    /// Present even when empty.
    pub conflicts: Vec<Conflict>,
}

/// Fold scan records into a manifest.
///
/// Input order is irrelevant; the output is fully determined by the record
/// set, the scan root, and the timestamp.
pub fn aggregate(
    scan_root: &Path,
    records: Vec<ScanRecord>,
    generated_at: DateTime<Utc>,
) -> Manifest {
    let mut entries: Vec<ManifestEntry> = records.into_iter().map(ManifestEntry::from).collect();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    // BTreeMap keys give id-sorted iteration; pushes preserve path order
    let mut by_id: BTreeMap<String, Vec<ManifestEntry>> = BTreeMap::new();
    for entry in entries {
        by_id.entry(entry.id.clone()).or_default().push(entry);
    }

    let mut projects = Vec::with_capacity(by_id.len());
    let mut conflicts = Vec::new();
    for (id, group) in by_id {
        if group.len() > 1 {
            conflicts.push(Conflict {
                id,
                paths: group.iter().map(|entry| entry.path.clone()).collect(),
                kept_path: group[0].path.clone(),
            });
        }
        if let Some(first) = group.into_iter().next() {
            projects.push(first);
        }
    }

    projects.sort_by(|a, b| (&a.id, &a.path).cmp(&(&b.id, &b.path)));

    Manifest {
        version: MANIFEST_VERSION.to_string(),
        root: scan_root.to_path_buf(),
        generated_at,
        projects,
        conflicts,
    }
}
