use std::fs;
use std::path::Path;
use tempfile::TempDir;

use ocular_core::config::{BuildOrderConfig, DependencySource};
use ocular_core::error::Error;
use ocular_core::resolver::{resolve_order, MissingDependencyPolicy};
use ocular_core::scanner::Scanner;

fn create_test_module(dir: &Path, name: &str, references: &[&str]) {
    let module_dir = dir.join(name);
    fs::create_dir_all(&module_dir).unwrap();

    fs::write(
        module_dir.join("package.json"),
        format!(
            r#"{{"name": "@test/{}", "version": "1.0.0"}}"#,
            name
        ),
    )
    .unwrap();

    let refs = references
        .iter()
        .map(|r| format!("    {{\"path\": \"{}\"}},", r))
        .collect::<Vec<_>>()
        .join("\n");

    let tsconfig = format!(
        r#"{{
  // Generated for tests
  "extends": "../../tsconfig.build.json",
  "compilerOptions": {{
    "rootDir": "src", /* sources */
    "outDir": "dist",
  }},
  "references": [
{}
  ]
}}"#,
        refs
    );

    fs::write(module_dir.join("tsconfig.json"), tsconfig).unwrap();
}

fn modules_dir(temp_dir: &TempDir) -> std::path::PathBuf {
    let modules_dir = temp_dir.path().join("modules");
    fs::create_dir_all(&modules_dir).unwrap();
    modules_dir
}

#[test]
fn test_scan_modules() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "core", &[]);
    create_test_module(&modules_dir, "layers", &["../core"]);

    let scanner = Scanner::new(&modules_dir);
    let packages = scanner.scan().unwrap();

    assert_eq!(packages.len(), 2);
    assert!(packages[0].id.ends_with("modules/core"));
    assert!(packages[1].id.ends_with("modules/layers"));
    assert_eq!(packages[1].deps.len(), 1);
    assert_eq!(packages[1].deps[0], packages[0].id);
    assert_eq!(packages[1].name.as_deref(), Some("@test/layers"));
    assert_eq!(packages[1].version.as_deref(), Some("1.0.0"));
}

#[test]
fn test_scan_skips_directories_without_package_json() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "core", &[]);
    fs::create_dir_all(modules_dir.join("scratch")).unwrap();
    fs::write(modules_dir.join("README.md"), "# modules").unwrap();

    let packages = Scanner::new(&modules_dir).scan().unwrap();

    assert_eq!(packages.len(), 1);
    assert!(packages[0].id.ends_with("modules/core"));
}

#[test]
fn test_scan_reference_to_tsconfig_file() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "core", &[]);
    create_test_module(&modules_dir, "widgets", &["../core/tsconfig.json"]);

    let map = Scanner::new(&modules_dir).scan_as_map().unwrap();
    let core_id = map.keys().find(|id| id.ends_with("modules/core")).unwrap();
    let widgets = map.values().find(|p| p.id.ends_with("modules/widgets")).unwrap();

    assert_eq!(widgets.deps.as_slice(), [core_id.clone()]);
}

#[test]
fn test_module_without_tsconfig_has_no_dependencies() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);
    let module_dir = modules_dir.join("plain");
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(module_dir.join("package.json"), r#"{"name": "plain"}"#).unwrap();

    let packages = Scanner::new(&modules_dir).scan().unwrap();

    assert_eq!(packages.len(), 1);
    assert!(packages[0].deps.is_empty());
    assert!(packages[0].version.is_none());
}

#[test]
fn test_scan_manifests_with_byte_order_mark() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "core", &[]);
    let module_dir = modules_dir.join("layers");
    fs::create_dir_all(&module_dir).unwrap();
    fs::write(
        module_dir.join("package.json"),
        "\u{feff}{\"name\": \"@test/layers\"}",
    )
    .unwrap();
    fs::write(
        module_dir.join("tsconfig.json"),
        "\u{feff}{\n  // refs\n  \"references\": [{\"path\": \"../core\"}],\n}",
    )
    .unwrap();

    let packages = Scanner::new(&modules_dir).scan().unwrap();

    assert_eq!(packages.len(), 2);
    assert_eq!(packages[1].name.as_deref(), Some("@test/layers"));
    assert_eq!(packages[1].deps.as_slice(), [packages[0].id.clone()]);
}

#[test]
fn test_scanner_from_config_deduplicates_sources() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);
    let config = BuildOrderConfig {
        sources: vec![
            DependencySource::PackageJson,
            DependencySource::Tsconfig,
            DependencySource::PackageJson,
        ],
        ..BuildOrderConfig::default()
    };

    let scanner = Scanner::from_config(&modules_dir, &config);

    assert_eq!(scanner.modules_dir(), modules_dir.as_path());
    assert_eq!(
        scanner.sources(),
        [DependencySource::PackageJson, DependencySource::Tsconfig]
    );
}

#[test]
fn test_package_json_source_links_siblings() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "core", &[]);
    let app_dir = modules_dir.join("app");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(
        app_dir.join("package.json"),
        r#"{
  "name": "@test/app",
  "private": true,
  "dependencies": {"@test/core": "^1.0.0", "react": "^18.0.0"},
  "devDependencies": {"@test/app": "*"}
}"#,
    )
    .unwrap();

    let packages = Scanner::new(&modules_dir)
        .with_sources(&[DependencySource::PackageJson])
        .scan()
        .unwrap();

    let app = packages.iter().find(|p| p.id.ends_with("modules/app")).unwrap();
    let core = packages.iter().find(|p| p.id.ends_with("modules/core")).unwrap();
    assert!(app.private);
    assert_eq!(app.deps.as_slice(), [core.id.clone()]);
}

#[test]
fn test_tsconfig_source_ignores_package_json_dependencies() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "core", &[]);
    let app_dir = modules_dir.join("app");
    fs::create_dir_all(&app_dir).unwrap();
    fs::write(
        app_dir.join("package.json"),
        r#"{"name": "@test/app", "dependencies": {"@test/core": "1.0.0"}}"#,
    )
    .unwrap();

    let packages = Scanner::new(&modules_dir).scan().unwrap();
    let app = packages.iter().find(|p| p.id.ends_with("modules/app")).unwrap();
    assert!(app.deps.is_empty());
}

#[test]
fn test_scanned_modules_resolve_in_dependency_order() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);

    create_test_module(&modules_dir, "a-app", &["../c-layers", "../b-core"]);
    create_test_module(&modules_dir, "b-core", &[]);
    create_test_module(&modules_dir, "c-layers", &["../b-core"]);

    let packages = Scanner::new(&modules_dir).scan().unwrap();
    let table = Scanner::dependency_table(&packages);
    let resolved = resolve_order(&table, MissingDependencyPolicy::Error).unwrap();

    let names: Vec<&str> = resolved
        .order()
        .iter()
        .map(|id| id.rsplit('/').next().unwrap())
        .collect();
    assert_eq!(names, vec!["b-core", "c-layers", "a-app"]);
}

#[test]
fn test_invalid_package_json_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let modules_dir = modules_dir(&temp_dir);
    let broken = modules_dir.join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("package.json"), "{ not json").unwrap();

    let err = Scanner::new(&modules_dir).scan().unwrap_err();
    match err {
        Error::Json { path, .. } => assert!(path.ends_with("broken/package.json")),
        other => panic!("expected JSON error, got {:?}", other),
    }
}

#[test]
fn test_missing_modules_dir() {
    let temp_dir = TempDir::new().unwrap();
    let result = Scanner::new(temp_dir.path().join("nope")).scan();
    assert!(matches!(result, Err(Error::ModulesDirNotFound(_))));
}
