//! Terminal output helpers.
//!
//! Uses `colored`; tracing output goes to stderr, these go to stdout.

use colored::Colorize;

/// Section header: ">> Title" in cyan.
pub fn section(title: &str) {
    println!("  {} {}", ">>".bright_cyan().bold(), title.bold());
}

/// Key-value display: "  Label:       value".
pub fn kv(label: &str, value: &str) {
    println!("  {:<16}{}", format!("{label}:"), value);
}

/// Key-value with green value.
pub fn kv_ok(label: &str, value: &str) {
    println!("  {:<16}{}", format!("{label}:"), value.bright_green());
}

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "\u{2714}".bright_green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    println!("  {} {}", "\u{2718}".bright_red(), msg.bright_red());
}

/// Red error + yellow "fix:" suggestion.
pub fn error_with_fix(msg: &str, fix: &str) {
    error(msg);
    println!("    {} {}", "fix:".bright_yellow(), fix);
}

/// Hint line: "  hint: message" in dimmed text.
pub fn hint(msg: &str) {
    println!("  {} {}", "hint:".dimmed(), msg.dimmed());
}

/// One registered command: index, name, argument spec.
pub fn command_line(index: usize, name: &str, signature: &str) {
    println!("  {:>3}  {:<28}{}", index, name.bold(), signature.dimmed());
}

/// Empty line.
pub fn blank() {
    println!();
}
