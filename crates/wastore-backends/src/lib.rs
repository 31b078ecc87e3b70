//! Object-storage backends for wastore.
//!
//! - [`supabase::SupabaseBackend`]: Supabase Storage REST client
//! - [`create_backend`] / [`build_store`]: convenience builders from config

pub mod supabase;

pub use supabase::SupabaseBackend;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use wastore_core::config::Config;
use wastore_core::error::StoreError;
use wastore_core::utils::expand_home;
use wastore_core::SessionStore;

/// Build the storage backend described by `config`.
pub fn create_backend(config: &Config) -> Result<SupabaseBackend, StoreError> {
    debug!(url = %config.supabase.url, "creating Supabase backend");
    SupabaseBackend::new(&config.supabase)
}

/// Build a [`SessionStore`] from `config`: Supabase backend plus the
/// session directory.
///
/// `session_dir` replaces `store.sessionDir` when given; the configured
/// value has `~` expanded.
pub fn build_store(
    config: &Config,
    session_dir: Option<PathBuf>,
) -> Result<SessionStore, StoreError> {
    let backend = create_backend(config)?;
    let session_dir = session_dir.unwrap_or_else(|| expand_home(&config.store.session_dir));
    SessionStore::builder()
        .backend(Arc::new(backend))
        .session_dir(session_dir)
        .build()
}
