//! Terminal output utilities
//!
//! Progress and diagnostics share standard output so they interleave with
//! the toolchain's own output in order.

use console::style;

/// Print an error message
pub fn print_error(message: &str) {
    println!("{}: {}", style("error").red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{}: {}", style("warning").yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{}: {}", style("success").green().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{}: {}", style("info").blue().bold(), message);
}
