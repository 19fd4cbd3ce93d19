//! Output formatting for JSON and text modes
//!
//! Provides types for structured output that can be serialized to JSON
//! for machine-readable output, or displayed as text for human consumption.

use crate::outdated::AuditReport;
use serde::Serialize;

/// Result of a closure computation
#[derive(Debug, Serialize)]
pub struct ClosureResult {
    pub component: String,
    pub packages: Vec<ClosureEntry>,
}

/// A single `(name, version)` pair in the closure
#[derive(Debug, Serialize)]
pub struct ClosureEntry {
    pub name: String,
    pub version: String,
}

/// Result of a prune computation
#[derive(Debug, Serialize)]
pub struct PruneResult {
    pub component: String,
    pub kept: Vec<String>,
    pub removed: Vec<String>,
}

impl ClosureResult {
    pub fn new(component: &str, closure: Vec<(String, String)>) -> Self {
        Self {
            component: component.to_string(),
            packages: closure
                .into_iter()
                .map(|(name, version)| ClosureEntry { name, version })
                .collect(),
        }
    }
}

/// Render the outdated report as text: one header line per finding followed
/// by one line per requiring local package
pub fn render_outdated(report: &AuditReport) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        out.push_str(&format!(
            "{}: {} => {}\n",
            finding.name, finding.locked, finding.latest
        ));
        for required_by in &finding.required_by {
            out.push_str(&format!("  required by {}\n", required_by));
        }
    }
    out
}

/// Print JSON output to stdout
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    }
}
