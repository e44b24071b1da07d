//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `repo-manifest` application. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures and ensure
//!   type safety.
//!
//! Failure scenarios covered:
//!
//! - Missing metadata files (the expected negative case when probing a
//!   repository root).
//! - Malformed JSON in a metadata file.
//! - Schema violations, naming the offending field.
//! - Unreadable directories or files and per-file read timeouts.
//! - Manifest write failures (the only failure that is fatal to a run).
//! - Cache load/save trouble.
//! - Unusable schema documents.
//! - Wrapped I/O, JSON, and regex errors.
//!
//! Almost every error here is caught at the repository boundary by the scan
//! pipeline, logged, and converted into an exclusion. Only `Write` and
//! `Schema` abort an invocation.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for repo-manifest operations
#[derive(Error, Debug)]
pub enum Error {
    /// No metadata file exists at the repository root.
    ///
    /// Most repositories simply lack one. This is an expected negative
    /// result, distinct from malformed input, and is never reported as a
    /// warning.
    #[error("Metadata file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The metadata file exists but is not valid JSON, or its top level is
    /// not an object.
    #[error("Invalid JSON in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// The metadata file parsed but violates the schema.
    ///
    /// `field` names the missing or invalid field so the warning points at
    /// what to fix.
    #[error("Schema violation in {}: {message}", path.display())]
    Validation {
        path: PathBuf,
        /// The field that failed validation.
        field: String,
        message: String,
    },

    /// A directory or file could not be read (permissions, I/O failure).
    #[error("Cannot read {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    /// A per-file read exceeded its deadline.
    #[error("Timed out reading {} after {seconds}s", path.display())]
    Timeout { path: PathBuf, seconds: u64 },

    /// The manifest could not be persisted. Fatal to the invocation.
    #[error("Failed to write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error occurred with a cache operation.
    #[error("Cache operation error: {message}")]
    Cache { message: String },

    /// The schema document itself could not be loaded or interpreted.
    #[error("Schema document error: {message}")]
    Schema { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
