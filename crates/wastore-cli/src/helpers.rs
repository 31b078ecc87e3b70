//! Shared CLI helpers: result printing.

use colored::Colorize;

/// Print the result of `exists`: `true`/`false` on stdout, detail on stderr.
pub fn print_exists(session: &str, exists: bool) {
    println!("{exists}");
    if exists {
        eprintln!("{} session '{}' is stored", "✓".green(), session);
    } else {
        eprintln!("{} session '{}' not found", "·".dimmed(), session);
    }
}

/// Print a success line.
pub fn print_done(message: &str) {
    println!("{} {}", "✓".green(), message);
}
