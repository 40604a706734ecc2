//! Colored output for the recipe driver
//!
//! Uses owo-colors for terminal colors. Progress bars live in
//! `helpers::internal::progress`.

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Creating serd/0.30.16"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a sub-action (cyan arrow)
/// Example: "  -> source"
pub fn sub_action(step: &str) {
    println!("  {} {}", "->".cyan(), step);
}

/// Print a detail line (dimmed prefix)
/// Example: "     downloading https://..."
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
/// Example: "==> serd/0.30.16 packaged"
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a skip message (dimmed)
/// Example: "     serd-0.30.16.tar.xz already downloaded, skipping"
pub fn skip(message: &str) {
    println!("     {}", message.dimmed());
}
