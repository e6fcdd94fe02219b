//! Discovery and inspection commands.

use anyhow::Result;
use owo_colors::OwoColorize;
use tracing::info;

use crate::formatting::{
    print_key_value, print_package_list, print_package_table, print_section_header,
    print_separator_with_spacing, print_success, print_warning, SectionStyle,
};

use super::{resolve_package_id, Workspace, WorkspaceOptions};

pub fn cmd_scan(options: &WorkspaceOptions, json: bool) -> Result<()> {
    let workspace = Workspace::open(options)?;
    let packages = workspace.scan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    print_section_header("[Scanning modules...]", SectionStyle::Primary);
    if packages.is_empty() {
        print_warning("No packages found");
    } else {
        println!(
            "  {} Found {} {}",
            "OK".green(),
            packages.len().to_string().bold().cyan(),
            "packages".bold()
        );
        println!();
        print_package_table(&packages);
    }
    println!();

    Ok(())
}

pub fn cmd_why(options: &WorkspaceOptions, package: &str) -> Result<()> {
    let workspace = Workspace::open(options)?;
    let graph = workspace.graph()?;

    let id = resolve_package_id(&graph, package)?;
    let deps = graph.dependencies(&id)?;
    let dependents = graph.dependents(&id)?;
    let rank = graph.build_order().rank(&id).unwrap_or_default();

    let title = match graph.get_package(&id) {
        Some(pkg) => format!("Package Dependencies: {}", pkg.display_name()),
        None => "Package Dependencies".to_string(),
    };
    print_section_header(&title, SectionStyle::Primary);
    print_key_value("Package", &id);
    print_key_value("Level", &rank.to_string());
    print_separator_with_spacing();

    print_key_value("Depends on", &format!("{} packages", deps.len()));
    print_package_list(&deps);
    println!();

    print_key_value("Depended on by", &format!("{} packages", dependents.len()));
    print_package_list(&dependents);
    println!();

    Ok(())
}

pub fn cmd_validate(options: &WorkspaceOptions, json: bool) -> Result<()> {
    let workspace = Workspace::open(options)?;
    let graph = workspace.graph()?;
    let count = graph.topological_order().len();

    info!(packages = count, "dependency graph is valid");

    if json {
        let data = serde_json::json!({ "valid": true, "packages": count });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print_section_header("Validation", SectionStyle::Success);
        print_success(&format!("{} packages scanned", count));
        print_success("No cyclic dependencies detected");
        print_success("Build order resolved");
        println!();
    }

    Ok(())
}
