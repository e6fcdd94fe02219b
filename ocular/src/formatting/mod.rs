//! CLI formatting utilities.
//!
//! Consistent colors and layout for the human-readable output of every
//! subcommand. Machine-readable output (`build-order`, `--json`) does not go
//! through here.

mod headers;
mod output;
mod status;
mod tables;

pub use headers::{print_section_header, SectionStyle};
pub use output::{print_key_value, print_separator_with_spacing};
pub use status::{print_success, print_warning};
pub use tables::{print_level_table, print_package_list, print_package_table};
