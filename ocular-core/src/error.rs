//! Error types and result aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {context}: {error}")]
    Toml {
        error: toml::de::Error,
        context: String,
    },

    #[error("JSON parse error in {}: {error}", path.display())]
    Json {
        error: serde_json::Error,
        path: PathBuf,
    },

    #[error("Package not found: {name}. Available packages: {available}")]
    PackageNotFound { name: String, available: String },

    #[error("Cyclic dependency detected: {}. Break the cycle in the tsconfig references.", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Package {package} depends on {dependency}, which is not part of the workspace")]
    MissingDependency { package: String, dependency: String },

    #[error("Modules directory not found: {0}")]
    ModulesDirNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
