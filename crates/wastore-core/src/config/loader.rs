//! Config loader: reads `~/.wastore/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.wastore/config.json`
//! 3. Environment variables (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    apply_env_overrides(read_config_file(path))
}

/// Parse the file only; any failure yields defaults.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `WASTORE_SUPABASE__URL` (fallback `SUPABASE_URL`) → `supabase.url`
/// - `WASTORE_SUPABASE__SERVICE_ROLE_KEY` (fallback `SUPABASE_SERVICE_ROLE_KEY`)
///   → `supabase.service_role_key`
/// - `WASTORE_STORE__SESSION_DIR` → `store.session_dir`
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

fn apply_overrides_from(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    let first = |keys: &[&str]| keys.iter().find_map(|&k| lookup(k));

    if let Some(val) = first(&["WASTORE_SUPABASE__URL", "SUPABASE_URL"]) {
        config.supabase.url = val;
    }
    if let Some(val) = first(&[
        "WASTORE_SUPABASE__SERVICE_ROLE_KEY",
        "SUPABASE_SERVICE_ROLE_KEY",
    ]) {
        config.supabase.service_role_key = val;
    }
    if let Some(val) = lookup("WASTORE_STORE__SESSION_DIR") {
        config.store.session_dir = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
