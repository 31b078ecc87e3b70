//! `wastore status`: show configuration status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use wastore_core::config::{get_config_path, load_config, SupabaseConfig};
use wastore_core::utils::expand_home;

/// Run the status command.
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);
    let config = load_config(Some(&path));

    println!();
    println!("{}", "wastore status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        path.display(),
        if path.exists() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );

    println!(
        "  {:<18} {}",
        "Supabase:".bold(),
        supabase_status(&config.supabase)
    );

    let session_dir = expand_home(&config.store.session_dir);
    println!(
        "  {:<18} {} {}",
        "Session dir:".bold(),
        session_dir.display(),
        if session_dir.is_dir() {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!();

    Ok(())
}

/// One-line Supabase status: project URL when configured.
fn supabase_status(supabase: &SupabaseConfig) -> String {
    if supabase.is_configured() {
        format!("{} {}", supabase.url, "✓ (key set)".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supabase_status_configured() {
        let supabase = SupabaseConfig {
            url: "https://abc.supabase.co".into(),
            service_role_key: "key".into(),
        };
        let status = supabase_status(&supabase);
        assert!(status.contains("https://abc.supabase.co"));
        assert!(status.contains("key set"));
    }

    #[test]
    fn supabase_status_url_without_key() {
        let supabase = SupabaseConfig {
            url: "https://abc.supabase.co".into(),
            service_role_key: String::new(),
        };
        assert!(supabase_status(&supabase).contains("not configured"));
    }
}
