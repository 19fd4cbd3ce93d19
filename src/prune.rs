//! Workspace pruning
//!
//! Computes which workspace members to drop when trimming the workspace down
//! to one component: members whose final path segment starts with the
//! component prefix stay, explicitly kept libraries stay, everything else is
//! reported for removal.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PruneError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {details}")]
    Parse { path: PathBuf, details: String },

    #[error("No [workspace] members array in {path}")]
    NoMembers { path: PathBuf },
}

/// Load `[workspace] members` from a workspace manifest, in declared order
pub fn load_members(path: &Path) -> Result<Vec<String>, PruneError> {
    let content = fs::read_to_string(path).map_err(|source| PruneError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    let doc: toml::Value = toml::from_str(&content).map_err(|e| PruneError::Parse {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    let members = doc
        .get("workspace")
        .and_then(|w| w.get("members"))
        .and_then(|m| m.as_array())
        .ok_or_else(|| PruneError::NoMembers {
            path: path.to_path_buf(),
        })?;

    Ok(members
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect())
}

/// Partition members into (kept, removed) for a component plus explicitly
/// kept libraries. Libraries match on the member's final path segment, so
/// `foo` keeps `lib/foo`.
pub fn partition_members(
    members: &[String],
    component: &str,
    keep_libs: &[String],
) -> (Vec<String>, Vec<String>) {
    let mut kept = Vec::new();
    let mut removed = Vec::new();

    for member in members {
        let last = member.rsplit('/').next().unwrap_or(member);
        if last.starts_with(component) || keep_libs.iter().any(|l| l == last || l == member) {
            kept.push(member.clone());
        } else {
            removed.push(member.clone());
        }
    }

    (kept, removed)
}
