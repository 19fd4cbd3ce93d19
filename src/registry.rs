//! Sparse registry index client
//!
//! Looks up the newest published version of a crate from a crates.io-style
//! sparse index. Index documents are newline-delimited JSON, one record per
//! published version; yanked records never count and prerelease records only
//! count when explicitly requested.

use semver::Version;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Source identifiers accepted as the crates.io registry
const SUPPORTED_SOURCES: &[&str] = &[
    "registry+https://github.com/rust-lang/crates.io-index",
    "sparse+https://index.crates.io/",
];

/// Default sparse index base URL
const DEFAULT_INDEX_BASE: &str = "https://index.crates.io";

/// Generous guard against a hung request; lookups are otherwise unbounded
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unsupported registry '{registry}' for dependency '{name}'; skipping its check")]
    UnsupportedRegistry { name: String, registry: String },

    #[error("Failed to fetch index for '{name}': {details}")]
    Fetch { name: String, details: String },

    #[error("Failed to parse index record for '{name}': {details}")]
    Parse { name: String, details: String },
}

/// One line of a sparse index document
#[derive(Deserialize)]
struct IndexRecord {
    vers: String,
    #[serde(default)]
    yanked: bool,
}

/// Answers "what is the newest published version of this crate"
pub trait VersionLookup {
    /// Newest published version for `name`. When `source` is given it must
    /// be a recognized registry identifier; when absent the default registry
    /// is assumed.
    fn latest_version(&self, name: &str, source: Option<&str>) -> Result<Version, RegistryError>;
}

pub struct RegistryClient {
    agent: ureq::Agent,
    index_base: String,
    skip_prerelease: bool,
}

impl RegistryClient {
    pub fn new(index_base: Option<&str>, skip_prerelease: bool) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(FETCH_TIMEOUT))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            index_base: index_base
                .unwrap_or(DEFAULT_INDEX_BASE)
                .trim_end_matches('/')
                .to_string(),
            skip_prerelease,
        }
    }

    fn fetch_index(&self, name: &str) -> Result<String, RegistryError> {
        let url = format!("{}{}", self.index_base, index_path(name));

        let response = self
            .agent
            .get(&url)
            .header("User-Agent", "lockaudit")
            .call()
            .map_err(|e| RegistryError::Fetch {
                name: name.to_string(),
                details: e.to_string(),
            })?;

        response
            .into_body()
            .read_to_string()
            .map_err(|e| RegistryError::Fetch {
                name: name.to_string(),
                details: e.to_string(),
            })
    }
}

impl VersionLookup for RegistryClient {
    fn latest_version(&self, name: &str, source: Option<&str>) -> Result<Version, RegistryError> {
        if let Some(source) = source
            && !SUPPORTED_SOURCES.contains(&source)
        {
            return Err(RegistryError::UnsupportedRegistry {
                name: name.to_string(),
                registry: source.to_string(),
            });
        }

        let body = self.fetch_index(name)?;
        max_version(name, &body, self.skip_prerelease)
    }
}

/// Index lookup path for a crate name, sharded by name length. Prefixes are
/// taken per character so an unexpected non-ASCII name cannot split a
/// multi-byte boundary.
fn index_path(name: &str) -> String {
    let name = name.to_lowercase();
    match name.chars().count() {
        0 => String::from("/0/"),
        1 => format!("/1/{}", name),
        2 => format!("/2/{}", name),
        3 => {
            let first: String = name.chars().take(1).collect();
            format!("/3/{}/{}", first, name)
        }
        _ => {
            let first: String = name.chars().take(2).collect();
            let second: String = name.chars().skip(2).take(2).collect();
            format!("/{}/{}/{}", first, second, name)
        }
    }
}

/// Fold an index document down to its maximum qualifying version, starting
/// from the 0.0.0 floor so a crate with no qualifying records reports 0.0.0
fn max_version(name: &str, body: &str, skip_prerelease: bool) -> Result<Version, RegistryError> {
    let mut max = Version::new(0, 0, 0);
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: IndexRecord =
            serde_json::from_str(line).map_err(|e| RegistryError::Parse {
                name: name.to_string(),
                details: e.to_string(),
            })?;
        if record.yanked {
            continue;
        }
        let vers = Version::parse(&record.vers).map_err(|e| RegistryError::Parse {
            name: name.to_string(),
            details: format!("bad version '{}': {}", record.vers, e),
        })?;
        if skip_prerelease && !vers.pre.is_empty() {
            continue;
        }
        if vers > max {
            max = vers;
        }
    }
    Ok(max)
}
