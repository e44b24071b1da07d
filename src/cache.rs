//! # Incremental Scan Cache
//!
//! Optional, file-backed. Maps each metadata file path to the mtime last
//! seen and the record parsed at that time, so a hit can be carried into
//! the next manifest without re-reading the file. A bare timestamp would
//! not be enough; carrying an entry forward requires its content.
//!
//! The cache is never authoritative. A missing or corrupt cache file
//! degrades to a full re-read, and each run rebuilds the cache from what
//! it actually observed, so entries for vanished repositories age out on
//! their own. Failing to save the cache is a warning, never a run failure.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metadata::RepoMetadata;
use crate::writer;

/// One remembered metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Mtime in whole seconds since the Unix epoch.
    pub mtime: u64,
    /// The record parsed while that mtime was current.
    pub metadata: RepoMetadata,
}

/// Persistent scan cache, keyed by metadata file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCache {
    pub entries: BTreeMap<PathBuf, CacheEntry>,
}

impl ScanCache {
    /// Load a cache file, degrading to an empty cache on any trouble.
    ///
    /// A nonexistent file is the normal first-run case and stays silent;
    /// unreadable or corrupt files are logged and ignored.
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) => {
                if error.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("cannot read cache {}: {error}", path.display());
                }
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(cache) => cache,
            Err(error) => {
                log::warn!("ignoring corrupt cache {}: {error}", path.display());
                Self::default()
            }
        }
    }

    /// Persist the cache atomically at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = writer::to_json_string(self)?;
        writer::write_atomic(path, &json).map_err(|error| Error::Cache {
            message: format!("cannot save {}: {error}", path.display()),
        })
    }

    /// The cached record for `path`, iff the mtime still matches.
    pub fn lookup(&self, path: &Path, mtime: u64) -> Option<&RepoMetadata> {
        self.entries
            .get(path)
            .filter(|entry| entry.mtime == mtime)
            .map(|entry| &entry.metadata)
    }

    /// Whether the metadata file at `path` must be re-read.
    pub fn should_reread(&self, path: &Path, mtime: u64) -> bool {
        self.lookup(path, mtime).is_none()
    }

    /// Remember the record parsed from `path` at `mtime`.
    pub fn insert(&mut self, path: PathBuf, mtime: u64, metadata: RepoMetadata) {
        self.entries.insert(path, CacheEntry { mtime, metadata });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
