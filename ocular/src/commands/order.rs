//! Build-order commands.

use anyhow::Result;
use owo_colors::OwoColorize;
use tracing::info;

use crate::formatting::{
    print_level_table, print_package_list, print_section_header, print_success, print_warning,
    SectionStyle,
};

use super::{resolve_package_id, Workspace, WorkspaceOptions};

/// Prints the build order as a single line of space-separated package ids.
pub fn cmd_build_order(options: &WorkspaceOptions) -> Result<()> {
    let workspace = Workspace::open(options)?;
    let graph = workspace.graph()?;
    let order = graph.topological_order();

    info!(packages = order.len(), "resolved build order");
    println!("{}", order.join(" "));

    Ok(())
}

pub fn cmd_levels(options: &WorkspaceOptions, json: bool) -> Result<()> {
    let workspace = Workspace::open(options)?;
    let graph = workspace.graph()?;
    let levels = graph.dependency_levels();

    if json {
        let data = serde_json::json!({
            "order": graph.topological_order(),
            "levels": levels,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    print_section_header("[Build Levels]", SectionStyle::Primary);
    if levels.is_empty() {
        print_warning("No packages found");
    } else {
        println!(
            "  {} {} packages in {} levels",
            "OK".green(),
            graph.topological_order().len().to_string().bold().cyan(),
            levels.len().to_string().bold().cyan()
        );
        println!();
        print_level_table(&levels);
    }
    println!();

    Ok(())
}

pub fn cmd_affected(options: &WorkspaceOptions, packages: &[String], json: bool) -> Result<()> {
    let workspace = Workspace::open(options)?;
    let graph = workspace.graph()?;

    let changed = packages
        .iter()
        .map(|query| resolve_package_id(&graph, query))
        .collect::<Result<Vec<_>>>()?;
    let affected = graph.affected_packages(&changed)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&affected)?);
        return Ok(());
    }

    print_section_header("[Affected Packages]", SectionStyle::Warning);
    print_success(&format!(
        "{} of {} packages affected, in build order",
        affected.len(),
        graph.topological_order().len()
    ));
    println!();
    print_package_list(&affected);
    println!();

    Ok(())
}
