use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release-engineering audits over a Cargo lockfile
#[derive(Parser, Debug)]
#[command(name = "lockaudit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the lockfile (default: nearest Cargo.lock upward from cwd)
    #[arg(long, global = true)]
    pub lockfile: Option<PathBuf>,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transitive dependency closure of a component
    Closure {
        /// Component prefix; selects every package whose name starts with it
        component: String,

        /// Record packages whose name starts with this prefix without
        /// walking their dependencies
        #[arg(long = "exclude", value_name = "PREFIX")]
        excludes: Vec<String>,

        /// Walk through excluded packages anyway (full reachable set)
        #[arg(long)]
        expand_excluded: bool,
    },
    /// Report dependencies of local packages with newer upstream releases
    Outdated {
        /// Consider prerelease versions when picking the latest release
        #[arg(long)]
        include_prerelease: bool,
    },
    /// Bundle license texts for the external dependencies of a component
    Licenses {
        /// Component prefix; selects every package whose name starts with it
        component: String,

        /// Fail on the first dependency without resolvable license text
        #[arg(long)]
        strict: bool,

        /// Directory holding vendored sources at `<name>-<version>/`, used
        /// for packages without a manifest_path in the lockfile
        #[arg(long, value_name = "DIR")]
        vendor_dir: Option<PathBuf>,

        /// Write the bundle to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Compute workspace members to remove when trimming to one component
    Prune {
        /// Component prefix; members whose final path segment starts with it
        /// are kept
        component: String,

        /// Workspace manifest listing the members
        #[arg(long, default_value = "Cargo.toml", value_name = "FILE")]
        manifest: PathBuf,

        /// Library member (final path segment or full path) to keep
        #[arg(long = "keep-lib", value_name = "NAME")]
        keep_libs: Vec<String>,
    },
}
