//! Object-storage backend abstraction.
//!
//! The store only ever talks to a [`BlobBackend`]. Implementations:
//! - [`MemoryBackend`]: in-process, for tests and local runs
//! - `SupabaseBackend` in `wastore-backends`: Supabase Storage over HTTP

pub mod memory;

pub use memory::{BackendCall, BackendOp, MemoryBackend};

use async_trait::async_trait;

use crate::error::BackendError;
use crate::types::{Bucket, ListOptions, StorageObject, UploadOptions};

/// Capability set of an object-storage backend organised into buckets.
///
/// Implementations are expected to be connected and authenticated already;
/// every method reports failure through [`BackendError`].
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// List objects under `prefix` in `bucket` (use `""` for the bucket root).
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<StorageObject>, BackendError>;

    /// Upload `data` as `object` into `bucket`.
    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), BackendError>;

    /// Download the full contents of `object`.
    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, BackendError>;

    /// Remove the named objects from `bucket`.
    async fn remove(&self, bucket: &str, objects: &[String]) -> Result<(), BackendError>;

    /// List all buckets visible to this client.
    async fn list_buckets(&self) -> Result<Vec<Bucket>, BackendError>;

    /// Create a bucket.
    async fn create_bucket(&self, name: &str, public: bool) -> Result<(), BackendError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
