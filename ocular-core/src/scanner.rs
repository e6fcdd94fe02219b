//! Module scanner for discovering packages.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use smallvec::SmallVec;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{BuildOrderConfig, DependencySource};
use crate::error::{Error, Result};
use crate::package::Package;
use crate::path_utils::{resolve_reference, to_package_id};
use crate::resolver::DependencyTable;

pub const PACKAGE_MANIFEST: &str = "package.json";
pub const TSCONFIG: &str = "tsconfig.json";

// Strings are matched first so comment markers inside them survive.
static COMMENT_OR_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:\\.|[^"\\])*"|//[^\n]*|/\*(?s:.*?)\*/"#).expect("comment pattern is valid")
});
static TRAILING_COMMA_OR_STRING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(?:\\.|[^"\\])*"|,(\s*[}\]])"#).expect("trailing comma pattern is valid")
});

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    dependencies: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    peer_dependencies: IndexMap<String, serde_json::Value>,
}

impl PackageJson {
    fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .keys()
            .chain(self.dev_dependencies.keys())
            .chain(self.peer_dependencies.keys())
            .map(String::as_str)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TsConfig {
    #[serde(default)]
    references: Vec<TsReference>,
}

#[derive(Debug, Deserialize)]
struct TsReference {
    path: String,
}

/// A module read from disk, before sibling names are resolved.
struct ScannedModule {
    package: Package,
    manifest: PackageJson,
}

/// Makes JSON-with-comments (as tsconfig files are written) parseable by
/// `serde_json`: removes `//` and `/* */` comments and trailing commas.
pub fn strip_jsonc(content: &str) -> Cow<'_, str> {
    let keep_strings = |caps: &Captures<'_>, replacement: String| -> String {
        if caps[0].starts_with('"') {
            caps[0].to_string()
        } else {
            replacement
        }
    };

    let without_comments = COMMENT_OR_STRING.replace_all(content, |caps: &Captures<'_>| {
        keep_strings(caps, String::new())
    });

    let without_commas = match TRAILING_COMMA_OR_STRING.replace_all(
        &without_comments,
        |caps: &Captures<'_>| {
            let closing = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            keep_strings(caps, closing)
        },
    ) {
        Cow::Borrowed(_) => None,
        Cow::Owned(cleaned) => Some(cleaned),
    };

    match without_commas {
        Some(cleaned) => Cow::Owned(cleaned),
        None => without_comments,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, lenient: bool) -> Result<T> {
    let content = fs::read_to_string(path)?;
    // UTF-8 byte-order mark, as written by some editors.
    let content = content.trim_start_matches('\u{feff}');
    let parsed = if lenient {
        serde_json::from_str(&strip_jsonc(content))
    } else {
        serde_json::from_str(content)
    };
    parsed.map_err(|error| Error::Json {
        error,
        path: path.to_path_buf(),
    })
}

/// Scans a modules directory for packages.
///
/// Every immediate subdirectory holding a `package.json` is a package. Its
/// sibling dependencies come from the configured [`DependencySource`]s.
pub struct Scanner {
    modules_dir: PathBuf,
    sources: Vec<DependencySource>,
}

impl Scanner {
    pub fn new(modules_dir: impl AsRef<Path>) -> Self {
        Self {
            modules_dir: modules_dir.as_ref().to_path_buf(),
            sources: vec![DependencySource::Tsconfig],
        }
    }

    pub fn from_config(modules_dir: impl AsRef<Path>, config: &BuildOrderConfig) -> Self {
        Self::new(modules_dir).with_sources(&config.sources)
    }

    pub fn with_sources(mut self, sources: &[DependencySource]) -> Self {
        let mut unique: Vec<DependencySource> = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique.contains(source) {
                unique.push(*source);
            }
        }
        self.sources = unique;
        self
    }

    #[inline]
    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    #[inline]
    pub fn sources(&self) -> &[DependencySource] {
        &self.sources
    }

    /// Discovers and parses all packages, sorted by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the modules directory does not exist or a
    /// manifest cannot be read or parsed.
    pub fn scan(&self) -> Result<Vec<Package>> {
        if !self.modules_dir.is_dir() {
            return Err(Error::ModulesDirNotFound(self.modules_dir.clone()));
        }

        let module_dirs: Vec<PathBuf> = WalkDir::new(&self.modules_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| {
                let dir = self.modules_dir.join(e.file_name());
                if dir.join(PACKAGE_MANIFEST).is_file() {
                    Some(dir)
                } else {
                    debug!(path = %dir.display(), "skipping directory without package.json");
                    None
                }
            })
            .collect();

        let scanned: Result<Vec<ScannedModule>> = module_dirs
            .into_par_iter()
            .map(|dir| self.read_module(dir))
            .collect();
        let mut scanned = scanned?;

        if self.sources.contains(&DependencySource::PackageJson) {
            Self::link_sibling_names(&mut scanned);
        }

        let mut packages: Vec<Package> = scanned.into_iter().map(|m| m.package).collect();
        packages.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(
            modules_dir = %self.modules_dir.display(),
            packages = packages.len(),
            "scan complete"
        );
        Ok(packages)
    }

    pub fn scan_as_map(&self) -> Result<HashMap<String, Package>> {
        let packages = self.scan()?;
        Ok(packages.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    /// Builds the resolver input from scanned packages, keeping their order.
    pub fn dependency_table(packages: &[Package]) -> DependencyTable {
        DependencyTable::from_packages(packages)
    }

    fn read_module(&self, dir: PathBuf) -> Result<ScannedModule> {
        let manifest: PackageJson = read_json(&dir.join(PACKAGE_MANIFEST), false)?;
        let id = to_package_id(&dir);

        let mut deps: SmallVec<[String; 4]> = SmallVec::new();
        if self.sources.contains(&DependencySource::Tsconfig) {
            let tsconfig_path = dir.join(TSCONFIG);
            if tsconfig_path.is_file() {
                let tsconfig: TsConfig = read_json(&tsconfig_path, true)?;
                for reference in &tsconfig.references {
                    let dep = to_package_id(&resolve_reference(&dir, &reference.path));
                    if dep == id {
                        warn!(package = %id, "tsconfig references its own package");
                    }
                    if !deps.contains(&dep) {
                        deps.push(dep);
                    }
                }
            } else {
                debug!(package = %id, "no tsconfig.json, no project references");
            }
        }

        let package = Package {
            id,
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            private: manifest.private,
            path: dir,
            deps,
        };
        Ok(ScannedModule { package, manifest })
    }

    /// Adds package.json dependencies that name a sibling module.
    fn link_sibling_names(modules: &mut [ScannedModule]) {
        let ids_by_name: HashMap<String, String> = modules
            .iter()
            .filter_map(|m| {
                m.package
                    .name
                    .as_ref()
                    .map(|name| (name.clone(), m.package.id.clone()))
            })
            .collect();

        for module in modules.iter_mut() {
            let siblings: Vec<String> = module
                .manifest
                .dependency_names()
                .filter_map(|name| ids_by_name.get(name))
                .cloned()
                .collect();
            for sibling in siblings {
                if sibling != module.package.id && !module.package.depends_on(&sibling) {
                    module.package.deps.push(sibling);
                }
            }
        }
    }
}
