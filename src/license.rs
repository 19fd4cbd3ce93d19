//! License expression resolution and bundling
//!
//! Splits a package's declared license expression into atomic identifiers
//! and locates the matching license text file inside the package's vendored
//! source tree. Resolution is heuristic: a handful of filename transforms
//! tried in a fixed order, an alias table for projects that name their file
//! after something other than the SPDX id, and a plain `LICENSE` fallback.

use crate::lockfile::Package;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename aliases for identifiers whose upstream file is named differently
const ALIASES: &[(&str, &str)] = &[
    ("BSL-1.0", "BOOST"),
    ("MPL-2.0", "MPL2"),
    ("MIT-0", "MIT0"),
];

/// Identifiers that legitimately ship no license text. Tolerated inside
/// compound expressions where another identifier carries the text.
const NO_TEXT_IDS: &[&str] = &["UNLICENSE"];

#[derive(Error, Debug)]
pub enum LicenseError {
    #[error(
        "No license text found for '{license}' of package '{package}' in {dir}. Add a filename alias or exempt the package."
    )]
    TextNotFound {
        package: String,
        license: String,
        dir: PathBuf,
    },

    #[error("Package '{package}' declares no license expression or license file")]
    NoDeclaration { package: String },

    #[error(
        "No source directory known for package '{package}'; lockfile has no manifest_path and no --vendor-dir was given"
    )]
    NoSourceDir { package: String },

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// One atomic identifier with its resolved text file, if any
#[derive(Debug, Serialize)]
pub struct ResolvedLicense {
    pub id: String,
    pub path: Option<PathBuf>,
}

/// Everything needed to emit one package's block of the bundle
#[derive(Debug, Serialize)]
pub struct LicenseFinding {
    pub package: String,
    pub version: String,
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub resolved: Vec<ResolvedLicense>,
}

pub struct LicenseResolver {
    aliases: HashMap<String, String>,
    exempt_packages: Vec<String>,
    strict: bool,
    vendor_dir: Option<PathBuf>,
}

impl LicenseResolver {
    pub fn new(
        extra_aliases: &HashMap<String, String>,
        exempt_packages: &[String],
        strict: bool,
        vendor_dir: Option<PathBuf>,
    ) -> Self {
        let mut aliases: HashMap<String, String> = ALIASES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (k, v) in extra_aliases {
            aliases.insert(k.clone(), v.clone());
        }
        Self {
            aliases,
            exempt_packages: exempt_packages.to_vec(),
            strict,
            vendor_dir,
        }
    }

    /// Resolve a package's declared license expression against its source
    /// tree. In strict mode a missing text for a non-exempt package fails;
    /// otherwise the absence is recorded in the finding and rendered as a
    /// comment.
    pub fn resolve(&self, package: &Package) -> Result<LicenseFinding, LicenseError> {
        let dir = self.source_dir(package)?;
        let repository = read_repository(&dir);

        let Some(expression) = package.license.as_deref() else {
            return self.resolve_license_file(package, &dir, repository);
        };

        let ids = split_expression(expression);
        let compound = ids.len() > 1;
        let mut resolved = Vec::with_capacity(ids.len());

        for id in ids {
            let path = self.locate(&id, &dir);
            if path.is_none() && !self.tolerates_missing(package, &id, compound) {
                return Err(LicenseError::TextNotFound {
                    package: package.name.clone(),
                    license: id,
                    dir,
                });
            }
            resolved.push(ResolvedLicense { id, path });
        }

        Ok(LicenseFinding {
            package: package.name.clone(),
            version: package.version.clone(),
            expression: expression.to_string(),
            repository,
            resolved,
        })
    }

    /// Packages without an expression may still point at an explicit file
    fn resolve_license_file(
        &self,
        package: &Package,
        dir: &Path,
        repository: Option<String>,
    ) -> Result<LicenseFinding, LicenseError> {
        let Some(file) = package.license_file.as_deref() else {
            if self.strict && !self.is_exempt(package) {
                return Err(LicenseError::NoDeclaration {
                    package: package.name.clone(),
                });
            }
            return Ok(LicenseFinding {
                package: package.name.clone(),
                version: package.version.clone(),
                expression: String::new(),
                repository,
                resolved: Vec::new(),
            });
        };

        let path = dir.join(file);
        let found = path.is_file().then_some(path);
        if found.is_none() && self.strict && !self.is_exempt(package) {
            return Err(LicenseError::TextNotFound {
                package: package.name.clone(),
                license: file.to_string(),
                dir: dir.to_path_buf(),
            });
        }
        Ok(LicenseFinding {
            package: package.name.clone(),
            version: package.version.clone(),
            expression: file.to_string(),
            repository,
            resolved: vec![ResolvedLicense {
                id: file.to_string(),
                path: found,
            }],
        })
    }

    fn source_dir(&self, package: &Package) -> Result<PathBuf, LicenseError> {
        if let Some(dir) = package.manifest_dir() {
            return Ok(dir.to_path_buf());
        }
        if let Some(vendor) = &self.vendor_dir {
            return Ok(vendor.join(format!("{}-{}", package.name, package.version)));
        }
        Err(LicenseError::NoSourceDir {
            package: package.name.clone(),
        })
    }

    fn tolerates_missing(&self, package: &Package, id: &str, compound: bool) -> bool {
        if compound && NO_TEXT_IDS.contains(&id.to_uppercase().as_str()) {
            return true;
        }
        if self.is_exempt(package) {
            return true;
        }
        !self.strict
    }

    fn is_exempt(&self, package: &Package) -> bool {
        self.exempt_packages.iter().any(|p| p == &package.name)
    }

    /// Probe candidate filenames in order, then the directory default
    fn locate(&self, license: &str, dir: &Path) -> Option<PathBuf> {
        for name in candidate_names(license, &self.aliases) {
            let path = dir.join(&name);
            if path.is_file() {
                return Some(path);
            }
        }
        let fallback = dir.join("LICENSE");
        fallback.is_file().then_some(fallback)
    }
}

/// Split a compound license expression into atomic identifiers.
///
/// First match wins: `AND` (with parenthesized fragments re-split), then
/// `OR`, then the legacy `/` dual-license shorthand. `A OR B AND C` at the
/// top level therefore splits on `AND` first; standard boolean precedence is
/// deliberately not applied.
pub fn split_expression(expression: &str) -> Vec<String> {
    let expression = strip_outer_parens(expression.trim());

    if expression.contains("AND") {
        let mut ids = Vec::new();
        for fragment in expression.split("AND") {
            let fragment = fragment.trim();
            if fragment.starts_with('(') && fragment.ends_with(')') {
                ids.extend(split_expression(&fragment[1..fragment.len() - 1]));
            } else {
                ids.push(fragment.to_string());
            }
        }
        ids
    } else if expression.contains("OR") {
        expression
            .split("OR")
            .map(|f| f.trim().to_string())
            .collect()
    } else if expression.contains('/') {
        expression
            .split('/')
            .map(|f| f.trim().to_string())
            .collect()
    } else {
        vec![expression.to_string()]
    }
}

/// Strip a pair of parens wrapping the whole expression, e.g.
/// `"(MIT AND BSD-3-Clause)"`. Left alone when inner parens exist, so
/// `"(A) AND (B)"` keeps its fragment parens for the AND split.
fn strip_outer_parens(expression: &str) -> &str {
    if let Some(inner) = expression
        .strip_prefix('(')
        .and_then(|e| e.strip_suffix(')'))
        && !inner.contains('(')
        && !inner.contains(')')
    {
        return inner.trim();
    }
    expression
}

/// Candidate filenames for one atomic identifier, in probe order: the
/// space-to-underscore form, the prefix before the first hyphen, then any
/// alias targets of those two; each as exact name then `.md`/`.txt`, upper
/// `LICENSE-` form before lower `license-` form.
fn candidate_names(license: &str, aliases: &HashMap<String, String>) -> Vec<String> {
    let underscored = license.trim().replace(' ', "_");

    let mut stems = vec![underscored.clone()];
    if let Some((prefix, _)) = underscored.split_once('-') {
        stems.push(prefix.to_string());
    }
    for i in 0..stems.len() {
        if let Some(target) = aliases.get(&stems[i]) {
            stems.push(target.clone());
        }
    }

    let mut names = Vec::new();
    for stem in &stems {
        for ext in ["", ".md", ".txt"] {
            names.push(format!("LICENSE-{}{}", stem.to_uppercase(), ext));
            names.push(format!("license-{}{}", stem.to_lowercase(), ext));
        }
    }
    names
}

/// Repository URL from the package's own manifest, if declared
fn read_repository(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("Cargo.toml")).ok()?;
    let doc: toml::Value = toml::from_str(&content).ok()?;
    doc.get("package")?
        .get("repository")?
        .as_str()
        .map(String::from)
}

/// Render the bundled license manifest: one block per finding, license text
/// lines each prefixed by a single space
pub fn render_bundle(findings: &[LicenseFinding]) -> Result<String, LicenseError> {
    let mut out = String::new();
    for finding in findings {
        out.push_str(&format!("Crate: {}@{}\n", finding.package, finding.version));
        if let Some(repository) = &finding.repository {
            out.push_str(&format!("Repository: {}\n", repository));
        }
        out.push_str(&format!("License: {}\n", finding.expression));

        if finding.resolved.is_empty() {
            out.push_str("# no license declaration\n");
        }
        for resolved in &finding.resolved {
            match &resolved.path {
                Some(path) => {
                    let text =
                        fs::read_to_string(path).map_err(|source| LicenseError::ReadFile {
                            path: path.clone(),
                            source,
                        })?;
                    for line in text.lines() {
                        out.push(' ');
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                None => {
                    out.push_str(&format!("# no license text available for {}\n", resolved.id));
                }
            }
        }
        out.push('\n');
    }
    Ok(out)
}
