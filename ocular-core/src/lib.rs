//! Core library for ordering monorepo builds.

pub mod config;
pub mod error;
pub mod graph;
pub mod package;
pub mod path_utils;
pub mod resolver;
pub mod scanner;

pub use config::{BuildOrderConfig, DependencySource, WorkspaceConfig};
pub use error::{Error, Result};
pub use graph::DependencyGraph;
pub use package::Package;
pub use resolver::{resolve_order, BuildOrder, DependencyTable, MissingDependencyPolicy};
pub use scanner::Scanner;
