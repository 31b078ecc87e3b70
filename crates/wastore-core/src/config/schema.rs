//! Configuration schema.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

/// Root configuration: loaded from `~/.wastore/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub supabase: SupabaseConfig,
    pub store: StoreConfig,
}

// ─────────────────────────────────────────────
// Supabase
// ─────────────────────────────────────────────

/// Connection settings for Supabase Storage.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupabaseConfig {
    /// Project URL (e.g. `https://xyzcompany.supabase.co`).
    pub url: String,
    /// Service role key; bucket management needs it.
    pub service_role_key: String,
}

impl SupabaseConfig {
    /// Whether both URL and key are set.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty() && !self.service_role_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────

/// Local side of the session store.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Directory `save` reads `{session}.zip` from. `~` is expanded.
    pub session_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session_dir: ".".to_string(),
        }
    }
}
