//! Outdated-dependency audit over local packages
//!
//! Walks every workspace member's direct dependencies in lockfile order and
//! compares the locked version against the newest registry release. Findings
//! are keyed by `(dependency name, locked version)` and kept in
//! first-discovery order; a dependency declared by several members gets one
//! finding with the requiring members merged.

use crate::graph::{self, GraphError, PackageGraph};
use crate::registry::VersionLookup;
use semver::Version;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid locked version '{version}' for dependency '{name}': {details}")]
    BadVersion {
        name: String,
        version: String,
        details: String,
    },
}

/// One outdated dependency, with every local package that declares it
#[derive(Debug, Serialize)]
pub struct OutdatedFinding {
    pub name: String,
    pub locked: String,
    pub latest: String,
    pub required_by: Vec<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct AuditReport {
    pub findings: Vec<OutdatedFinding>,
    /// Dependencies skipped over unsupported registries or fetch failures;
    /// a skip never aborts the rest of the audit
    pub skipped: Vec<String>,
}

/// Audit every local package's direct dependencies against the registry
pub fn audit(graph: &PackageGraph, registry: &impl VersionLookup) -> Result<AuditReport, AuditError> {
    let mut report = AuditReport::default();
    let mut finding_index: HashMap<(String, String), usize> = HashMap::new();
    // One registry consultation per dependency name; None records a skip
    let mut latest_cache: HashMap<String, Option<Version>> = HashMap::new();

    for local in graph.all_local() {
        for spec in graph.dependencies_of(local) {
            let (dep_name, explicit) = graph::parse_spec(spec);

            // Internal edges are not externally auditable
            if graph.is_local_name(dep_name) {
                continue;
            }

            // An explicit specifier is the declared constraint; audit it
            // verbatim without resolving through the graph
            let (locked, source) = match explicit {
                Some(version) => (version.to_string(), None),
                None => {
                    let dep = graph.find(dep_name, None)?;
                    (dep.version.clone(), dep.source.clone())
                }
            };

            let key = (dep_name.to_string(), locked.clone());
            if let Some(&at) = finding_index.get(&key) {
                let required_by = &mut report.findings[at].required_by;
                if !required_by.contains(&local.name) {
                    required_by.push(local.name.clone());
                }
                continue;
            }

            let latest = match latest_cache.get(dep_name) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = match registry.latest_version(dep_name, source.as_deref()) {
                        Ok(version) => Some(version),
                        // Unsupported registries and fetch failures skip this
                        // one dependency, never the whole batch
                        Err(e) => {
                            report.skipped.push(e.to_string());
                            None
                        }
                    };
                    latest_cache.insert(dep_name.to_string(), fetched.clone());
                    fetched
                }
            };
            let Some(latest) = latest else {
                continue;
            };

            let locked_version =
                Version::parse(&locked).map_err(|e| AuditError::BadVersion {
                    name: dep_name.to_string(),
                    version: locked.clone(),
                    details: e.to_string(),
                })?;

            if latest > locked_version {
                finding_index.insert(key, report.findings.len());
                report.findings.push(OutdatedFinding {
                    name: dep_name.to_string(),
                    locked,
                    latest: latest.to_string(),
                    required_by: vec![local.name.clone()],
                });
            }
        }
    }

    Ok(report)
}
