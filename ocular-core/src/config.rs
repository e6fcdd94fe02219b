//! Workspace configuration read from `ocular.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::path_utils::normalize;
use crate::resolver::MissingDependencyPolicy;

pub const CONFIG_FILE_NAME: &str = "ocular.toml";
pub const DEFAULT_MODULES_DIR: &str = "modules";

/// Where a module's sibling dependencies are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencySource {
    /// `references[].path` in `tsconfig.json`.
    Tsconfig,
    /// `dependencies`, `devDependencies` and `peerDependencies` in
    /// `package.json` that name a sibling module.
    PackageJson,
}

impl DependencySource {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencySource::Tsconfig => "tsconfig",
            DependencySource::PackageJson => "package-json",
        }
    }
}

fn default_sources() -> Vec<DependencySource> {
    vec![DependencySource::Tsconfig]
}

/// The `[build_order]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildOrderConfig {
    /// Directory holding one subdirectory per module.
    #[serde(default)]
    pub modules_dir: Option<PathBuf>,
    #[serde(default)]
    pub missing_dependencies: MissingDependencyPolicy,
    #[serde(default = "default_sources")]
    pub sources: Vec<DependencySource>,
}

impl Default for BuildOrderConfig {
    fn default() -> Self {
        Self {
            modules_dir: None,
            missing_dependencies: MissingDependencyPolicy::default(),
            sources: default_sources(),
        }
    }
}

/// Workspace-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub build_order: BuildOrderConfig,
    /// Path of the file this was loaded from (for resolving relative paths).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl WorkspaceConfig {
    /// Parses `ocular.toml` at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: WorkspaceConfig = toml::from_str(&content).map_err(|error| Error::Toml {
            error,
            context: path.display().to_string(),
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Looks for `ocular.toml` in `start_dir` and its ancestors.
    ///
    /// The search stops at the first directory containing `.git`. The
    /// returned `config_path` is expressed relative to `start_dir` (as
    /// `../ocular.toml` and so on) so that paths derived from it stay in the
    /// caller's terms.
    pub fn discover(start_dir: impl AsRef<Path>) -> Result<Option<Self>> {
        let start_dir = start_dir.as_ref();
        let start_dir = if start_dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            start_dir
        };
        let canonical = start_dir
            .canonicalize()
            .unwrap_or_else(|_| start_dir.to_path_buf());

        let mut relative = start_dir.to_path_buf();
        for current_dir in canonical.ancestors() {
            if current_dir.join(CONFIG_FILE_NAME).is_file() {
                let path = normalize(&relative.join(CONFIG_FILE_NAME));
                debug!(path = %path.display(), "loading workspace config");
                return Self::load(path).map(Some);
            }

            if current_dir.join(".git").exists() {
                break;
            }
            relative.push("..");
        }

        Ok(None)
    }

    /// Looks for `ocular.toml` starting at the parent of `modules_dir`.
    pub fn discover_for_modules_dir(modules_dir: impl AsRef<Path>) -> Result<Option<Self>> {
        Self::discover(normalize(&modules_dir.as_ref().join("..")))
    }

    /// The configured modules directory, resolved against the config file's
    /// directory when relative.
    pub fn modules_dir(&self) -> Option<PathBuf> {
        let dir = self.build_order.modules_dir.as_ref()?;
        if dir.is_absolute() {
            return Some(dir.clone());
        }
        let resolved = self
            .config_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|base| !base.as_os_str().is_empty())
            .map(|base| base.join(dir))
            .unwrap_or_else(|| dir.clone());
        Some(resolved)
    }
}
