//! Utility functions for terminal output formatting
//!
//! This module provides consistent, colored output functions for displaying
//! success, warning and info messages while a hook runs. These lines
//! are meant for the person running the package manager; diagnostics go
//! through `tracing` instead.

use colored::*;

use crate::constants::{ICON_INFO, ICON_SUCCESS, ICON_WARNING};

/// Displays a success message with a green checkmark
///
/// # Example
///
/// ```no_run
/// use patternlab_installer::utils::print_success;
///
/// print_success("config option 'patternExtension' updated...");
/// ```
pub fn print_success(message: &str) {
    println!("{} {}", ICON_SUCCESS.green(), message);
}

/// Displays a warning message with a yellow warning sign
pub fn print_warning(message: &str) {
    println!("{} {}", ICON_WARNING.yellow(), message.yellow());
}

/// Displays an informational message
pub fn print_info(message: &str) {
    println!("{} {}", ICON_INFO.blue(), message);
}

/// Creates a section header for a hook's output
pub fn section_header(title: &str) -> String {
    let title_formatted = title.bright_cyan().bold();
    let separator = "=".repeat(title.chars().count()).bright_blue();
    format!("{title_formatted}\n{separator}")
}
