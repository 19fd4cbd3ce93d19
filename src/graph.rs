//! Package graph over the flat lockfile list
//!
//! A `(name, version)` pair uniquely identifies a package within one
//! lockfile. Bare-name lookups are only valid while a single version of that
//! name is locked; otherwise the caller must supply an explicit
//! `"<name> <version>"` specifier.

use crate::lockfile::Package;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Package '{name}' not found in lockfile")]
    NotFound { name: String },

    #[error(
        "Package name '{name}' is ambiguous (locked versions: {versions}). Use an explicit '<name> <version>' specifier."
    )]
    AmbiguousName { name: String, versions: String },
}

/// In-memory index over the lockfile's package list
pub struct PackageGraph {
    packages: Vec<Package>,
    by_name: HashMap<String, Vec<usize>>,
}

impl PackageGraph {
    pub fn new(packages: Vec<Package>) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, pkg) in packages.iter().enumerate() {
            by_name.entry(pkg.name.clone()).or_default().push(idx);
        }
        Self { packages, by_name }
    }

    /// All packages in lockfile order
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Find a package by name, disambiguated by version when several
    /// versions of the same name are locked
    pub fn find(&self, name: &str, version: Option<&str>) -> Result<&Package, GraphError> {
        let indexes = self.by_name.get(name).ok_or_else(|| GraphError::NotFound {
            name: name.to_string(),
        })?;

        match version {
            Some(version) => indexes
                .iter()
                .map(|&i| &self.packages[i])
                .find(|p| p.version == version)
                .ok_or_else(|| GraphError::NotFound {
                    name: format!("{} {}", name, version),
                }),
            None => {
                if indexes.len() > 1 {
                    let versions = indexes
                        .iter()
                        .map(|&i| self.packages[i].version.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(GraphError::AmbiguousName {
                        name: name.to_string(),
                        versions,
                    });
                }
                Ok(&self.packages[indexes[0]])
            }
        }
    }

    /// Direct dependency specifiers of a package, in lockfile order
    pub fn dependencies_of<'a>(&self, package: &'a Package) -> &'a [String] {
        &package.dependencies
    }

    /// Workspace members: packages with no upstream source
    pub fn all_local(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| p.is_local())
    }

    /// True if any local package is locked under this name
    pub fn is_local_name(&self, name: &str) -> bool {
        self.by_name
            .get(name)
            .is_some_and(|idxs| idxs.iter().any(|&i| self.packages[i].is_local()))
    }
}

/// Split a raw dependency specifier on its first whitespace run into a name
/// and an optional explicit version. A trailing source URL, if present, is
/// ignored.
pub fn parse_spec(spec: &str) -> (&str, Option<&str>) {
    let mut tokens = spec.split_whitespace();
    let name = tokens.next().unwrap_or("");
    let version = tokens.next().filter(|v| !v.starts_with('('));
    (name, version)
}
