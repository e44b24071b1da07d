//! # Manifest Persistence
//!
//! Serialization is bit-exact for compatibility: keys inside every object
//! sorted lexicographically, two-space indentation, a single trailing
//! newline, no trailing whitespace. The sorting falls out of construction:
//! values are serialized through `serde_json::Value`, whose object map is
//! a `BTreeMap` (the `preserve_order` feature is deliberately off).
//!
//! Persistence is atomic: the document is written to `<name>.tmp` beside
//! the destination and renamed over it. A reader never observes a partial
//! manifest, and a pre-existing manifest survives any failure before the
//! rename.

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// Render a serializable value as deterministic JSON text: sorted keys,
/// two-space indent, single trailing newline.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

/// Write `contents` to `path` atomically, creating parent directories as
/// needed. The temporary file is removed if the rename fails.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "destination has no file name",
        )
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    std::fs::write(&tmp, contents)?;
    if let Err(error) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(error);
    }
    Ok(())
}

/// Serialize `manifest` and persist it at `destination`.
///
/// The only fatal failure in a scan: everything else degrades to warnings,
/// but a manifest that cannot be written means the invocation failed.
pub fn write(manifest: &Manifest, destination: &Path) -> Result<()> {
    let json = to_json_string(manifest)?;
    write_atomic(destination, &json).map_err(|source| Error::Write {
        path: destination.to_path_buf(),
        source,
    })
}
