//! Status indicators and message formatting.

use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
enum Status {
    Success,
    Warning,
}

impl Status {
    fn colored_symbol(&self) -> String {
        match self {
            Status::Success => "✓".green().to_string(),
            Status::Warning => "⚠".yellow().to_string(),
        }
    }

    fn format(&self, message: &str) -> String {
        let text = match self {
            Status::Success => message.green().bold().to_string(),
            Status::Warning => message.yellow().bold().to_string(),
        };
        format!("{} {}", self.colored_symbol(), text)
    }
}

pub fn print_success(message: &str) {
    println!("  {}", Status::Success.format(message));
}

pub fn print_warning(message: &str) {
    println!("  {}", Status::Warning.format(message));
}
