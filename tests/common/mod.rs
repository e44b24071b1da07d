//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and canned
//! metadata documents to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_project("alpha", "alpha");
//!     fixture.scan_command().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::metadata;
    #[allow(unused_imports)]
    pub use super::read_manifest;
    pub use super::TestFixture;
}

/// Common metadata documents for testing.
#[allow(dead_code)]
pub mod metadata {
    /// A minimal valid document with the given id.
    pub fn minimal(id: &str) -> String {
        format!(r#"{{"id": "{id}", "one_liner": "project {id}"}}"#)
    }

    /// A document using every schema field.
    pub const FULL: &str = r#"{
  "id": "full-example",
  "one_liner": "exercises every field",
  "title": "Full Example",
  "tags": ["demo", "fixture"],
  "stack": ["rust"],
  "entrypoints": {"build": "cargo build", "test": "cargo test"}
}"#;

    /// Not JSON at all, for parse-error testing.
    pub const INVALID_JSON: &str = "{ this is not json";

    /// Valid JSON that violates the schema (no id).
    pub const MISSING_ID: &str = r#"{"one_liner": "who am i"}"#;

    /// Valid JSON with an id the pattern rejects.
    pub const BAD_ID: &str = r#"{"id": "Has Spaces", "one_liner": "bad id"}"#;

    /// Valid JSON with a field the schema does not know.
    pub const UNKNOWN_FIELD: &str =
        r#"{"id": "surplus", "one_liner": "carries extras", "sprocket": 7}"#;
}

/// Parse a written manifest back into a JSON value.
#[allow(dead_code)]
pub fn read_manifest(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("manifest should exist");
    serde_json::from_str(&text).expect("manifest should be valid JSON")
}

/// A test fixture that provides a scan root populated with repositories.
///
/// Repositories are directories carrying a `.git` marker; metadata lives in
/// `project.metadata.json` at each repository root.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_project("alpha", "alpha")
///     .with_repo("broken", metadata::INVALID_JSON);
///
/// fixture.scan_command().assert().success();
/// let manifest = read_manifest(&fixture.manifest_path());
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new fixture with an empty scan root.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a repository with the given metadata document.
    pub fn with_repo(self, name: &str, metadata_json: &str) -> Self {
        self.temp_dir
            .child(name)
            .child(".git")
            .create_dir_all()
            .expect("Failed to create repository marker");
        self.temp_dir
            .child(name)
            .child("project.metadata.json")
            .write_str(metadata_json)
            .expect("Failed to write metadata file");
        self
    }

    /// Add a repository with a minimal valid document using `id`.
    pub fn with_project(self, name: &str, id: &str) -> Self {
        let doc = metadata::minimal(id);
        self.with_repo(name, &doc)
    }

    /// Add a repository with no metadata file.
    #[allow(dead_code)]
    pub fn with_bare_repo(self, name: &str) -> Self {
        self.temp_dir
            .child(name)
            .child(".git")
            .create_dir_all()
            .expect("Failed to create repository marker");
        self
    }

    /// Add a plain file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the scan root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where `scan_command` writes the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join("out").join("manifest.json")
    }

    /// Create a child path in the scan root.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command for the binary with a clean environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("repo-manifest");
        cmd.current_dir(self.path())
            .env_remove("REPO_MANIFEST_ROOT")
            .env_remove("REPO_MANIFEST_OUT")
            .env_remove("NO_COLOR")
            .env_remove("CLICOLOR")
            .env_remove("CLICOLOR_FORCE");
        cmd
    }

    /// Create a command already pointed at this fixture's root and output.
    pub fn scan_command(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--root")
            .arg(self.path())
            .arg("--out")
            .arg(self.manifest_path());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_scan_root() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_project() {
        let fixture = TestFixture::new().with_project("alpha", "alpha");
        assert!(fixture.path().join("alpha/.git").exists());
        assert!(fixture.path().join("alpha/project.metadata.json").exists());
    }

    #[test]
    fn test_metadata_documents_parse_as_expected() {
        // Valid documents parse; the invalid one must not
        for doc in [metadata::minimal("x"), metadata::FULL.to_string()] {
            serde_json::from_str::<serde_json::Value>(&doc).expect("document should be valid JSON");
        }
        assert!(serde_json::from_str::<serde_json::Value>(metadata::INVALID_JSON).is_err());
    }
}
