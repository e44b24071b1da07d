//! Default values for repo-manifest configuration.
//!
//! This module provides centralized default values used across the CLI,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Returns the default scan root, `$HOME/src`.
///
/// Falls back to `./src` if the home directory cannot be determined.
///
/// This can be overridden by the `--root` CLI flag or the
/// `REPO_MANIFEST_ROOT` environment variable.
pub fn default_scan_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("src")
}

/// Returns the default manifest destination.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/repo-manifest/manifest.json` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/repo-manifest/manifest.json`
/// - Windows: `{FOLDERID_RoamingAppData}\repo-manifest\manifest.json`
///
/// Falls back to `.repo-manifest/manifest.json` in the current directory if
/// the platform configuration directory cannot be determined.
///
/// This can be overridden by the `--out` CLI flag or the
/// `REPO_MANIFEST_OUT` environment variable.
pub fn default_manifest_path() -> PathBuf {
    match dirs::config_dir() {
        Some(config) => config.join("repo-manifest").join("manifest.json"),
        None => PathBuf::from(".repo-manifest").join("manifest.json"),
    }
}
