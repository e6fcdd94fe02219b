//! Table formatting utilities using comfy-table.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use ocular_core::Package;
use owo_colors::OwoColorize;

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Prints packages with their npm name, version and dependencies.
pub fn print_package_table(packages: &[Package]) {
    let mut table = styled_table(&["Package", "Name", "Version", "Depends on"]);

    for pkg in packages {
        let deps = if pkg.deps.is_empty() {
            "(none)".to_string()
        } else {
            pkg.deps.join(", ")
        };
        table.add_row(vec![
            Cell::new(&pkg.id).fg(Color::White),
            Cell::new(pkg.name.as_deref().unwrap_or("-")).fg(Color::Cyan),
            Cell::new(pkg.version.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
            Cell::new(deps),
        ]);
    }

    println!("{}", table);
}

/// Prints one row per dependency level.
pub fn print_level_table(levels: &[Vec<String>]) {
    let mut table = styled_table(&["Level", "Packages"]);

    for (level, ids) in levels.iter().enumerate() {
        table.add_row(vec![
            Cell::new(level).fg(Color::Cyan),
            Cell::new(ids.join("\n")).fg(Color::White),
        ]);
    }

    println!("{}", table);
}

/// Prints a simple list of packages (one per line).
pub fn print_package_list(packages: &[String]) {
    if packages.is_empty() {
        println!("  {} {}", "→".cyan(), "(none)".bright_black());
        return;
    }

    for pkg in packages {
        println!("  {} {}", "→".cyan(), pkg.bold().white());
    }
}
