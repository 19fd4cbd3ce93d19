//! Transitive closure over the locked dependency graph
//!
//! The closure is a set of `(name, version)` pairs reachable from the seed
//! packages. Membership is checked before expanding a package, which both
//! deduplicates shared dependencies and breaks cycles.

use crate::graph::{self, GraphError, PackageGraph};
use std::collections::{HashSet, VecDeque};

/// How to treat packages whose name matches an exclude prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeMode {
    /// Record the package in the closure but do not walk its dependencies.
    /// Used when auditing external dependencies: workspace-internal edges
    /// are recorded without expanding back into the workspace.
    RecordOnly,
    /// Walk through matching packages like any other. Used when the full
    /// reachable set is wanted regardless of local/external.
    RecordAndExpand,
}

/// Compute the transitive closure of every package whose name starts with
/// one of the seed prefixes. Returned in discovery order.
pub fn closure_of(
    graph: &PackageGraph,
    seeds: &[String],
    excludes: &[String],
    mode: ExcludeMode,
) -> Result<Vec<(String, String)>, GraphError> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut order: Vec<(String, String)> = Vec::new();
    let mut frontier: VecDeque<(String, Option<String>)> = VecDeque::new();

    for pkg in graph.packages() {
        if matches_prefix(&pkg.name, seeds) {
            let key = (pkg.name.clone(), pkg.version.clone());
            if seen.insert(key.clone()) {
                order.push(key);
                frontier.push_back((pkg.name.clone(), Some(pkg.version.clone())));
            }
        }
    }

    while let Some((name, version)) = frontier.pop_front() {
        let pkg = graph.find(&name, version.as_deref())?;
        for spec in graph.dependencies_of(pkg) {
            let (dep_name, dep_version) = graph::parse_spec(spec);
            let dep = graph.find(dep_name, dep_version)?;
            let key = (dep.name.clone(), dep.version.clone());
            if !seen.insert(key.clone()) {
                continue;
            }
            order.push(key);
            if mode == ExcludeMode::RecordOnly && matches_prefix(&dep.name, excludes) {
                continue;
            }
            frontier.push_back((dep.name.clone(), Some(dep.version.clone())));
        }
    }

    Ok(order)
}

fn matches_prefix(name: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p.as_str()))
}
