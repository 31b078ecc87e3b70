//! `wastore onboard`: create `~/.wastore/config.json` with defaults.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use wastore_core::config::{get_config_path, load_config, save_config};

/// Run the onboard command.
///
/// Existing config files are left alone. Values already present in the
/// environment are written into the new file.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "wastore: Setup".cyan().bold());
    println!();

    if path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            path.display()
        );
    } else {
        let config = load_config(Some(&path));
        save_config(&config, Some(&path))?;
        println!("  {} created config at {}", "✓".green(), path.display());
    }

    println!();
    println!(
        "{}",
        "Set supabase.url and supabase.serviceRoleKey, then run `wastore status`.".dimmed()
    );
    println!();

    Ok(())
}
