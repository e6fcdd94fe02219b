//! General output formatting utilities.

use owo_colors::OwoColorize;

/// Prints a visual separator with spacing.
pub fn print_separator_with_spacing() {
    println!();
    println!("{}", "─".repeat(60).bright_black());
    println!();
}

/// Prints a key-value pair with consistent formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {} {}", key.bright_black().bold(), value.bold().white());
}
