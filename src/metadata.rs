//! # Repository Metadata
//!
//! Each indexed repository declares itself through a single hand-authored
//! JSON file, `project.metadata.json`, directly under its root.
//! [`MetadataReader`] turns that file into a typed [`RepoMetadata`] record:
//! stat (for the mtime), read, parse, then validate against the schema
//! document.
//!
//! Absence of the file is the common case across a scan root and surfaces
//! as [`Error::NotFound`], which callers treat as "not an indexed
//! repository" rather than a problem worth reporting.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::{Advisory, SchemaValidator};

/// Fixed name of the per-repository metadata file.
pub const METADATA_FILE_NAME: &str = "project.metadata.json";

/// The validated contents of one `project.metadata.json`.
///
/// Unknown top-level fields never make it into this type; in lax mode they
/// are dropped during deserialization, in strict mode the validator has
/// already rejected them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Unique project identifier, lowercase alphanumeric with `-`/`_`.
    pub id: String,
    /// One-sentence description of the project.
    pub one_liner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoints: Option<BTreeMap<String, String>>,
}

/// A successful metadata read.
#[derive(Debug, Clone)]
pub struct MetadataFile {
    pub metadata: RepoMetadata,
    /// Mtime of the file at read time, whole seconds since the Unix epoch.
    pub mtime: u64,
    /// Soft findings gathered in lax mode (for example an over-long
    /// `one_liner`).
    pub advisories: Vec<Advisory>,
}

/// Reads and validates metadata files at repository roots.
#[derive(Debug, Clone)]
pub struct MetadataReader {
    validator: SchemaValidator,
    strict: bool,
}

impl MetadataReader {
    pub fn new(validator: SchemaValidator, strict: bool) -> Self {
        Self { validator, strict }
    }

    /// Path of the metadata file for a repository root.
    pub fn metadata_path(repo_root: &Path) -> PathBuf {
        repo_root.join(METADATA_FILE_NAME)
    }

    /// Current mtime of a metadata file, in whole seconds since the Unix
    /// epoch. Pre-epoch mtimes clamp to zero.
    pub fn mtime(path: &Path) -> Result<u64> {
        let stat = std::fs::metadata(path).map_err(|e| metadata_io_error(path, e))?;
        let modified = stat.modified().map_err(|e| Error::Unreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0))
    }

    /// Read, parse, and validate the metadata file under `repo_root`.
    pub fn read(&self, repo_root: &Path) -> Result<MetadataFile> {
        let path = Self::metadata_path(repo_root);
        let mtime = Self::mtime(&path)?;
        let text =
            std::fs::read_to_string(&path).map_err(|e| metadata_io_error(&path, e))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| Error::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let Value::Object(data) = value else {
            return Err(Error::Parse {
                path,
                message: "top level must be an object".to_string(),
            });
        };

        let advisories = self.validator.validate(&path, &data, self.strict)?;

        // Deserialization drops whatever the record type does not know
        // about; strict mode already rejected extras above.
        let metadata: RepoMetadata =
            serde_json::from_value(Value::Object(data)).map_err(|e| Error::Parse {
                path,
                message: e.to_string(),
            })?;

        Ok(MetadataFile {
            metadata,
            mtime,
            advisories,
        })
    }
}

fn metadata_io_error(path: &Path, error: std::io::Error) -> Error {
    if error.kind() == std::io::ErrorKind::NotFound {
        Error::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        Error::Unreadable {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn reader(strict: bool) -> MetadataReader {
        MetadataReader::new(SchemaValidator::embedded().unwrap(), strict)
    }

    fn write_metadata(dir: &TempDir, contents: &str) {
        std::fs::write(dir.path().join(METADATA_FILE_NAME), contents).unwrap();
    }

    #[test]
    fn test_read_minimal_metadata() {
        let dir = TempDir::new().unwrap();
        write_metadata(&dir, r#"{"id": "my-tool", "one_liner": "Does a thing"}"#);

        let file = reader(false).read(dir.path()).unwrap();
        assert_eq!(file.metadata.id, "my-tool");
        assert_eq!(file.metadata.one_liner, "Does a thing");
        assert_eq!(file.metadata.title, None);
        assert!(file.advisories.is_empty());
        assert!(file.mtime > 0);
    }

    #[test]
    fn test_read_full_metadata() {
        let dir = TempDir::new().unwrap();
        write_metadata(
            &dir,
            r#"{
                "id": "svc_api",
                "one_liner": "HTTP API",
                "title": "Widget API",
                "tags": ["http"],
                "stack": ["rust", "axum"],
                "entrypoints": {"serve": "cargo run", "test": "cargo test"}
            }"#,
        );

        let file = reader(true).read(dir.path()).unwrap();
        assert_eq!(file.metadata.title.as_deref(), Some("Widget API"));
        assert_eq!(file.metadata.tags, Some(vec!["http".to_string()]));
        assert_eq!(
            file.metadata.stack,
            Some(vec!["rust".to_string(), "axum".to_string()])
        );
        let entrypoints = file.metadata.entrypoints.unwrap();
        assert_eq!(entrypoints.get("serve").map(String::as_str), Some("cargo run"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let error = reader(false).read(dir.path()).unwrap_err();
        assert!(matches!(error, Error::NotFound { .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write_metadata(&dir, "{не json");

        let error = reader(false).read(dir.path()).unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn test_non_object_top_level_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write_metadata(&dir, r#"["id", "one_liner"]"#);

        let error = reader(false).read(dir.path()).unwrap_err();
        match error {
            Error::Parse { message, .. } => {
                assert_eq!(message, "top level must be an object");
            }
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn test_unknown_field_dropped_in_lax_mode() {
        let dir = TempDir::new().unwrap();
        write_metadata(
            &dir,
            r#"{"id": "ok", "one_liner": "x", "released": "2024-01-01"}"#,
        );

        let file = reader(false).read(dir.path()).unwrap();
        assert_eq!(file.metadata.id, "ok");
        assert!(file.advisories.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected_in_strict_mode() {
        let dir = TempDir::new().unwrap();
        write_metadata(
            &dir,
            r#"{"id": "ok", "one_liner": "x", "released": "2024-01-01"}"#,
        );

        let error = reader(true).read(dir.path()).unwrap_err();
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[test]
    fn test_long_one_liner_advisory_carried() {
        let dir = TempDir::new().unwrap();
        let long = "y".repeat(130);
        write_metadata(&dir, &format!(r#"{{"id": "ok", "one_liner": "{long}"}}"#));

        let file = reader(false).read(dir.path()).unwrap();
        assert_eq!(file.advisories.len(), 1);
        assert_eq!(file.advisories[0].field, "one_liner");
    }

    #[test]
    fn test_metadata_path_is_fixed_name_under_root() {
        let path = MetadataReader::metadata_path(Path::new("/src/a"));
        assert_eq!(path, PathBuf::from("/src/a/project.metadata.json"));
    }

    #[test]
    fn test_optional_fields_roundtrip_without_nulls() {
        let metadata = RepoMetadata {
            id: "ok".to_string(),
            one_liner: "x".to_string(),
            title: None,
            tags: None,
            stack: None,
            entrypoints: None,
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(!json.contains("title"));
        assert!(!json.contains("null"));
    }
}
