//! Lockfile decoding
//!
//! The lockfile is TOML with a `[[package]]` array listing every resolved
//! package in a fixed order. Registry packages carry a `source` field;
//! workspace members do not. The extended fields (`license`, `license_file`,
//! `manifest_path`) are optional and only consulted by license bundling.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockfileError {
    #[error("No Cargo.lock found. Pass --lockfile explicitly.")]
    NotFound,

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {details}")]
    Parse { path: PathBuf, details: String },
}

/// A resolved package entry from the lockfile
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,

    /// Upstream registry identifier; absent for workspace members
    pub source: Option<String>,

    /// Raw dependency specifiers: `"<name>"`, or `"<name> <version>"` when
    /// several versions of `<name>` are locked
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Compound SPDX-like expression, e.g. `"MIT OR Apache-2.0"`
    pub license: Option<String>,

    /// Explicit license file relative to the package root, used by packages
    /// that declare no expression
    pub license_file: Option<String>,

    /// Path to the package's own Cargo.toml inside its vendored source tree
    pub manifest_path: Option<PathBuf>,
}

impl Package {
    /// True for workspace members (not fetched from a registry)
    pub fn is_local(&self) -> bool {
        self.source.is_none()
    }

    /// Directory holding the package's source tree, if known
    pub fn manifest_dir(&self) -> Option<&Path> {
        self.manifest_path.as_deref().and_then(Path::parent)
    }
}

#[derive(Deserialize)]
struct LockfileDoc {
    package: Option<Vec<Package>>,
}

/// Load and decode a lockfile, preserving the listed package order
pub fn load(path: &Path) -> Result<Vec<Package>, LockfileError> {
    let content = fs::read_to_string(path).map_err(|source| LockfileError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path)
}

/// Decode lockfile content into the flat package list
pub fn parse(content: &str, path: &Path) -> Result<Vec<Package>, LockfileError> {
    let doc: LockfileDoc = toml::from_str(content).map_err(|e| LockfileError::Parse {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(doc.package.unwrap_or_default())
}

/// Find the nearest Cargo.lock by walking up from the current directory
pub fn find_lockfile() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_lockfile_from(&cwd)
}

/// Find the nearest Cargo.lock by walking up from a start directory
pub fn find_lockfile_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let path = dir.join("Cargo.lock");
        if path.exists() {
            return Some(path);
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }
    None
}
