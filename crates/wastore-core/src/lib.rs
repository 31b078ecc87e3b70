//! Core of wastore: the session store and everything it is built from.
//!
//! - [`session::SessionStore`]: exists / save / extract / delete for one session bundle
//! - [`backend::BlobBackend`]: object-storage capability set the store consumes
//! - [`backend::MemoryBackend`]: process-local backend for tests and local runs
//! - [`error`]: `StoreError` and `BackendError`
//! - [`config`]: `~/.wastore/config.json` + env var overrides

pub mod backend;
pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use backend::{BlobBackend, MemoryBackend};
pub use error::{BackendError, BackendErrorKind, StoreError};
pub use session::{SessionStore, SessionStoreBuilder};
