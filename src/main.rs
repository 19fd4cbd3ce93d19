mod cli;
mod closure;
mod config;
mod graph;
mod license;
mod lockfile;
mod outdated;
mod output;
mod prune;
mod registry;

use clap::Parser;
use cli::{Cli, Command};
use closure::ExcludeMode;
use config::Config;
use graph::PackageGraph;
use license::LicenseResolver;
use output::{ClosureResult, PruneResult};
use registry::RegistryClient;
use std::error::Error;
use std::path::{Path, PathBuf};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let lockfile = cli.lockfile;

    let result = match cli.command {
        Command::Closure {
            component,
            excludes,
            expand_excluded,
        } => run_closure(&component, &excludes, expand_excluded, &lockfile, json),
        Command::Outdated { include_prerelease } => {
            run_outdated(include_prerelease, &lockfile, json)
        }
        Command::Licenses {
            component,
            strict,
            vendor_dir,
            output,
        } => run_licenses(&component, strict, vendor_dir, output, &lockfile, json),
        Command::Prune {
            component,
            manifest,
            keep_libs,
        } => run_prune(&component, &manifest, &keep_libs, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_graph(lockfile: &Option<PathBuf>) -> Result<PackageGraph, Box<dyn Error>> {
    let path = match lockfile {
        Some(path) => path.clone(),
        None => lockfile::find_lockfile().ok_or(lockfile::LockfileError::NotFound)?,
    };
    Ok(PackageGraph::new(lockfile::load(&path)?))
}

fn run_closure(
    component: &str,
    excludes: &[String],
    expand_excluded: bool,
    lockfile: &Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(lockfile)?;
    let mode = if expand_excluded {
        ExcludeMode::RecordAndExpand
    } else {
        ExcludeMode::RecordOnly
    };
    let closure = closure::closure_of(&graph, &[component.to_string()], excludes, mode)?;

    if json {
        output::print_json(&ClosureResult::new(component, closure));
    } else {
        for (name, version) in &closure {
            println!("{} {}", name, version);
        }
    }
    Ok(())
}

fn run_outdated(
    include_prerelease: bool,
    lockfile: &Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(lockfile)?;
    let config = Config::load()?;
    let client = RegistryClient::new(config.registry_index.as_deref(), !include_prerelease);

    let report = outdated::audit(&graph, &client)?;
    for skipped in &report.skipped {
        eprintln!("warning: {}", skipped);
    }

    if json {
        output::print_json(&report);
    } else {
        print!("{}", output::render_outdated(&report));
    }
    Ok(())
}

fn run_licenses(
    component: &str,
    strict: bool,
    vendor_dir: Option<PathBuf>,
    output_file: Option<PathBuf>,
    lockfile: &Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let graph = load_graph(lockfile)?;
    let config = Config::load()?;
    let resolver = LicenseResolver::new(
        &config.license_aliases,
        &config.exempt_packages,
        strict,
        vendor_dir,
    );

    // Do not expand back into other workspace members; their internal
    // dependencies are not part of this component's vendored set
    let excludes: Vec<String> = graph.all_local().map(|p| p.name.clone()).collect();
    let closure = closure::closure_of(
        &graph,
        &[component.to_string()],
        &excludes,
        ExcludeMode::RecordOnly,
    )?;

    let mut findings = Vec::new();
    for (name, version) in &closure {
        let package = graph.find(name, Some(version))?;
        if package.is_local() {
            continue;
        }
        findings.push(resolver.resolve(package)?);
    }

    if json {
        output::print_json(&findings);
    } else {
        let bundle = license::render_bundle(&findings)?;
        match output_file {
            Some(path) => std::fs::write(&path, bundle)?,
            None => print!("{}", bundle),
        }
    }
    Ok(())
}

fn run_prune(
    component: &str,
    manifest: &Path,
    keep_libs: &[String],
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let members = prune::load_members(manifest)?;
    let (kept, removed) = prune::partition_members(&members, component, keep_libs);

    if json {
        output::print_json(&PruneResult {
            component: component.to_string(),
            kept,
            removed,
        });
    } else {
        for member in &removed {
            println!("{}", member);
        }
    }
    Ok(())
}
