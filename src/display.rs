use colored::*;

/// Status output. Everything goes to stderr so stdout carries only the rendered records.
pub struct Display;

impl Display {
    pub fn print_header(text: &str) {
        eprintln!("{}", text.bold());
    }

    pub fn print_command(command: &str) {
        eprintln!("{} {}", "Executing:".cyan().bold(), command);
    }

    pub fn print_success(text: &str) {
        eprintln!("{}", text.green());
    }

    pub fn print_warning(text: &str) {
        eprintln!("{}", text.yellow());
    }

    pub fn print_error(text: &str) {
        eprintln!("{} {}", "Error:".red().bold(), text);
    }
}
