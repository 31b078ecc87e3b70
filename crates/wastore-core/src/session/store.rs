//! `SessionStore`: exists / save / extract / delete for session bundles.
//!
//! Retention: after every successful upload the bucket is listed and, if more
//! than one object is present, the oldest one is removed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

use crate::backend::BlobBackend;
use crate::error::StoreError;
use crate::types::{ListOptions, StorageObject, UploadOptions};

/// Prefix of every session bucket.
const BUCKET_PREFIX: &str = "whatsapp-";

/// Extension of every session bundle.
const BUNDLE_EXTENSION: &str = ".zip";

/// Bucket holding the bundle of `session`.
pub fn bucket_name(session: &str) -> String {
    format!("{BUCKET_PREFIX}{session}")
}

/// Object name of the bundle of `session`.
pub fn object_name(session: &str) -> String {
    format!("{session}{BUNDLE_EXTENSION}")
}

// ─────────────────────────────────────────────
// SessionStore
// ─────────────────────────────────────────────

/// Stores one zip bundle per session in a per-session bucket.
///
/// Stateless between calls: it holds only the backend handle and the
/// directory `save` reads bundles from. Concurrent calls are not serialised;
/// the backend arbitrates.
pub struct SessionStore {
    backend: Arc<dyn BlobBackend>,
    /// Directory holding `{session}.zip` before upload.
    session_dir: PathBuf,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("backend", &self.backend.display_name())
            .field("session_dir", &self.session_dir)
            .finish()
    }
}

impl SessionStore {
    /// Create a store that reads bundles from the current working directory.
    pub fn new(backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            backend,
            session_dir: PathBuf::from("."),
        }
    }

    pub fn builder() -> SessionStoreBuilder {
        SessionStoreBuilder::default()
    }

    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Local path `save` reads the bundle of `session` from.
    pub fn bundle_path(&self, session: &str) -> PathBuf {
        self.session_dir.join(object_name(session))
    }

    /// Whether a bundle is stored for `session`.
    ///
    /// A missing bucket means "no session" and is not an error.
    pub async fn exists(&self, session: &str) -> Result<bool, StoreError> {
        let bucket = bucket_name(session);
        match self.backend.list(&bucket, "", ListOptions::limit(1)).await {
            Ok(objects) => Ok(!objects.is_empty()),
            Err(e) if e.is_bucket_missing() => {
                debug!(bucket = %bucket, "bucket missing, no session");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Upload `{session_dir}/{session}.zip` and prune the previous version.
    pub async fn save(&self, session: &str) -> Result<(), StoreError> {
        let source = self.bundle_path(session);
        self.save_from(session, &source).await
    }

    /// Upload the bundle at `source` for `session` and prune the previous version.
    ///
    /// If the upload fails nothing is pruned. If pruning fails the new bundle
    /// stays stored and the error is returned.
    pub async fn save_from(&self, session: &str, source: &Path) -> Result<(), StoreError> {
        let bucket = bucket_name(session);
        self.ensure_bucket(&bucket).await?;

        let data = tokio::fs::read(source).await?;
        let object = object_name(session);
        debug!(
            bucket = %bucket,
            object = %object,
            bytes = data.len(),
            "uploading session bundle"
        );
        self.backend
            .upload(&bucket, &object, data, &UploadOptions::session_bundle())
            .await?;

        self.delete_previous(&bucket).await?;
        info!(session, backend = self.backend.display_name(), "session saved");
        Ok(())
    }

    /// Download the bundle of `session` and write it to `path`, overwriting.
    ///
    /// The parent directory of `path` must exist.
    pub async fn extract(&self, session: &str, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let bucket = bucket_name(session);
        let data = self.backend.download(&bucket, &object_name(session)).await?;
        tokio::fs::write(path, &data).await?;
        debug!(
            bucket = %bucket,
            path = %path.display(),
            bytes = data.len(),
            "session bundle extracted"
        );
        Ok(())
    }

    /// Remove the bundle of `session`. The bucket is kept.
    ///
    /// Unlike [`exists`](Self::exists), a missing bucket is an error here.
    pub async fn delete(&self, session: &str) -> Result<(), StoreError> {
        let bucket = bucket_name(session);
        self.backend.remove(&bucket, &[object_name(session)]).await?;
        info!(session, "session deleted");
        Ok(())
    }

    /// Create `bucket` (private) unless a bucket with exactly that name exists.
    ///
    /// Two concurrent first saves may both try to create it; the backend
    /// decides, and its error is returned unchanged.
    async fn ensure_bucket(&self, bucket: &str) -> Result<(), StoreError> {
        let buckets = self.backend.list_buckets().await?;
        if buckets.iter().any(|b| b.name == bucket) {
            return Ok(());
        }

        debug!(bucket, "creating bucket");
        self.backend.create_bucket(bucket, false).await?;
        Ok(())
    }

    /// Remove the single oldest object when the bucket holds more than one.
    ///
    /// With three or more objects only the oldest goes.
    async fn delete_previous(&self, bucket: &str) -> Result<(), StoreError> {
        let objects = match self.backend.list(bucket, "", ListOptions::default()).await {
            Ok(objects) => objects,
            Err(e) if e.is_bucket_missing() => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if objects.len() <= 1 {
            return Ok(());
        }

        if let Some(oldest) = oldest_object(&objects) {
            debug!(bucket, object = %oldest.name, "removing previous session bundle");
            self.backend.remove(bucket, &[oldest.name.clone()]).await?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Builder for [`SessionStore`]; fails if no backend was given.
#[derive(Default)]
pub struct SessionStoreBuilder {
    backend: Option<Arc<dyn BlobBackend>>,
    session_dir: Option<PathBuf>,
}

impl SessionStoreBuilder {
    pub fn backend(mut self, backend: Arc<dyn BlobBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Directory `save` reads `{session}.zip` from. Defaults to `.`.
    pub fn session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> Result<SessionStore, StoreError> {
        let backend = self.backend.ok_or(StoreError::MissingBackend)?;
        let mut store = SessionStore::new(backend);
        if let Some(dir) = self.session_dir {
            store.session_dir = dir;
        }
        Ok(store)
    }
}

// ─────────────────────────────────────────────
// Retention helpers
// ─────────────────────────────────────────────

/// Creation time; absent or unparseable counts as the Unix epoch.
fn created_at(object: &StorageObject) -> DateTime<Utc> {
    object
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(DateTime::UNIX_EPOCH)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // No offset: read as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The object with the oldest creation time.
///
/// Linear scan keeping the current minimum; the minimum is only kept when it
/// is strictly older than the next candidate, so on identical timestamps the
/// later object in listing order wins.
pub fn oldest_object(objects: &[StorageObject]) -> Option<&StorageObject> {
    let mut oldest: Option<(&StorageObject, DateTime<Utc>)> = None;
    for object in objects {
        let stamp = created_at(object);
        match oldest {
            Some((_, min)) if min < stamp => {}
            _ => oldest = Some((object, stamp)),
        }
    }
    oldest.map(|(object, _)| object)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
