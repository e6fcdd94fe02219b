//! Command implementations for the CLI.

mod inspect;
mod order;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ocular_core::config::DEFAULT_MODULES_DIR;
use ocular_core::{
    DependencyGraph, DependencySource, MissingDependencyPolicy, Package, Scanner, WorkspaceConfig,
};
use tracing::debug;

pub use inspect::{cmd_scan, cmd_validate, cmd_why};
pub use order::{cmd_affected, cmd_build_order, cmd_levels};

/// Workspace selection shared by every subcommand. `None`/empty fields
/// fall back to `ocular.toml`, then to built-in defaults.
pub struct WorkspaceOptions {
    pub modules_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub missing_deps: Option<MissingDependencyPolicy>,
    pub sources: Vec<DependencySource>,
}

/// Settings after merging flags, config file and defaults.
struct Workspace {
    scanner: Scanner,
    policy: MissingDependencyPolicy,
}

impl Workspace {
    fn open(options: &WorkspaceOptions) -> Result<Self> {
        let config = match &options.config {
            Some(path) => WorkspaceConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => match &options.modules_dir {
                Some(dir) => WorkspaceConfig::discover_for_modules_dir(dir)?,
                None => WorkspaceConfig::discover(".")?,
            }
            .unwrap_or_default(),
        };

        let modules_dir = options
            .modules_dir
            .clone()
            .or_else(|| config.modules_dir())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULES_DIR));

        let mut settings = config.build_order;
        if let Some(policy) = options.missing_deps {
            settings.missing_dependencies = policy;
        }
        if !options.sources.is_empty() {
            settings.sources = options.sources.clone();
        }

        let scanner = Scanner::from_config(modules_dir, &settings);
        debug!(
            modules_dir = %scanner.modules_dir().display(),
            policy = settings.missing_dependencies.as_str(),
            sources = ?scanner.sources().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            "workspace settings"
        );

        Ok(Self {
            scanner,
            policy: settings.missing_dependencies,
        })
    }

    fn scan(&self) -> Result<Vec<Package>> {
        Ok(self.scanner.scan()?)
    }

    fn graph(&self) -> Result<DependencyGraph> {
        let packages = self.scan()?;
        Ok(DependencyGraph::new(packages, self.policy)?)
    }
}

/// Maps a user-supplied package reference to a package id.
fn resolve_package_id(graph: &DependencyGraph, query: &str) -> Result<String> {
    Ok(graph.lookup(query)?.id.clone())
}
