//! Session persistence on top of a [`BlobBackend`](crate::backend::BlobBackend).
//!
//! # Storage layout
//!
//! Each session gets its own private bucket holding a single bundle:
//! - bucket: `whatsapp-{session}`
//! - object: `{session}.zip`
//!
//! Both names are fixed so existing stored sessions stay readable.

pub mod store;

pub use store::{bucket_name, object_name, oldest_object, SessionStore, SessionStoreBuilder};
