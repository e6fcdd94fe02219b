//! Shared path utilities for module discovery.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: drops `.` components and folds `..` into
/// the preceding component where one exists.
///
/// The filesystem is not consulted, so a path need not exist. Leading `..`
/// components that cannot be folded are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Renders a path as a package id: normalized, `/`-separated.
pub fn to_package_id(path: &Path) -> String {
    let normalized = normalize(path);
    let mut id = String::new();
    for component in normalized.components() {
        match component {
            Component::RootDir => id.push('/'),
            other => {
                if !id.is_empty() && !id.ends_with('/') {
                    id.push('/');
                }
                id.push_str(&other.as_os_str().to_string_lossy());
            }
        }
    }
    id
}

/// Resolves a tsconfig `references[].path` entry against the directory of
/// the package declaring it.
///
/// References may name a directory or a specific tsconfig file; a `*.json`
/// target is taken to mean its parent directory.
pub fn resolve_reference(package_dir: &Path, reference: &str) -> PathBuf {
    let joined = normalize(&package_dir.join(reference));
    let is_config_file = joined
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_config_file {
        joined
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(joined)
    } else {
        joined
    }
}
