//! Output helpers for status messages.
//!
//! Status lines go to stderr so stdout carries only command output (JSON,
//! tables, exported registrations).

use super::colors::SemanticStyle;

/// Prints a success message with a checkmark.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".success(), msg);
}

/// Prints a warning message with a warning symbol.
pub fn print_warn(msg: &str) {
    eprintln!("{} {}", "⚠".warning(), msg);
}

/// Prints a hint with an arrow.
pub fn print_hint(msg: &str) {
    eprintln!("{} {}", "→".muted(), msg.muted());
}

/// Prints a labeled key-value pair with indentation.
pub fn print_labeled(key: &str, value: &str) {
    println!("  {}: {}", key.muted(), value);
}
