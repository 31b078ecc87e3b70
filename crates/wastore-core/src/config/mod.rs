//! Configuration: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use wastore_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Supabase: {}", cfg.supabase.url);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, StoreConfig, SupabaseConfig};
