//! In-memory [`BlobBackend`].
//!
//! Behaves like a bucketed object store with the error shapes the store has
//! to deal with: a missing bucket is reported as
//! `"Bucket <name> does not exist"` (`BucketNotFound`), a missing object as
//! `NotFound`, and a duplicate bucket as `Conflict`.
//!
//! Tests can inject a one-shot failure per operation and inspect the call log.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use tracing::debug;

use super::BlobBackend;
use crate::error::{BackendError, BackendErrorKind};
use crate::types::{Bucket, ListOptions, StorageObject, UploadOptions};

// ─────────────────────────────────────────────
// Call log
// ─────────────────────────────────────────────

/// Backend operation, used to target injected failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendOp {
    List,
    Upload,
    Download,
    Remove,
    ListBuckets,
    CreateBucket,
}

/// A recorded backend call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    List { bucket: String, limit: Option<usize> },
    Upload { bucket: String, object: String },
    Download { bucket: String, object: String },
    Remove { bucket: String, objects: Vec<String> },
    ListBuckets,
    CreateBucket { name: String, public: bool },
}

impl BackendCall {
    pub fn op(&self) -> BackendOp {
        match self {
            BackendCall::List { .. } => BackendOp::List,
            BackendCall::Upload { .. } => BackendOp::Upload,
            BackendCall::Download { .. } => BackendOp::Download,
            BackendCall::Remove { .. } => BackendOp::Remove,
            BackendCall::ListBuckets => BackendOp::ListBuckets,
            BackendCall::CreateBucket { .. } => BackendOp::CreateBucket,
        }
    }
}

// ─────────────────────────────────────────────
// State
// ─────────────────────────────────────────────

#[derive(Debug)]
struct MemoryObject {
    name: String,
    created_at: Option<String>,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct MemoryBucket {
    public: bool,
    /// Insertion order is listing order.
    objects: Vec<MemoryObject>,
}

#[derive(Debug, Default)]
struct State {
    buckets: BTreeMap<String, MemoryBucket>,
    last_stamp: Option<DateTime<Utc>>,
    injected: HashMap<BackendOp, BackendError>,
    calls: Vec<BackendCall>,
}

impl State {
    /// Record the call and return an injected failure for it, if any.
    fn enter(&mut self, call: BackendCall) -> Result<(), BackendError> {
        let op = call.op();
        self.calls.push(call);
        match self.injected.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn bucket(&self, name: &str) -> Result<&MemoryBucket, BackendError> {
        self.buckets.get(name).ok_or_else(|| missing_bucket(name))
    }

    fn bucket_mut(&mut self, name: &str) -> Result<&mut MemoryBucket, BackendError> {
        self.buckets.get_mut(name).ok_or_else(|| missing_bucket(name))
    }

    /// Strictly increasing creation time, even for uploads within one clock tick.
    fn next_stamp(&mut self) -> String {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

fn missing_bucket(name: &str) -> BackendError {
    BackendError::bucket_not_found(format!("Bucket {name} does not exist"))
}

// ─────────────────────────────────────────────
// MemoryBackend
// ─────────────────────────────────────────────

/// Process-local object store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: BackendOp, error: BackendError) {
        self.state().injected.insert(op, error);
    }

    /// Place an object directly, bypassing the call log. Creates the bucket
    /// (private) if needed.
    pub fn insert_object(
        &self,
        bucket: &str,
        name: &str,
        created_at: Option<&str>,
        data: Vec<u8>,
    ) {
        let mut state = self.state();
        let bucket = state.buckets.entry(bucket.to_string()).or_default();
        bucket.objects.push(MemoryObject {
            name: name.to_string(),
            created_at: created_at.map(String::from),
            data,
        });
    }

    /// All calls made so far, oldest first.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        self.state().buckets.contains_key(name)
    }

    /// Visibility of a bucket, `None` if it doesn't exist.
    pub fn is_public(&self, name: &str) -> Option<bool> {
        self.state().buckets.get(name).map(|b| b.public)
    }

    /// Names of the objects in a bucket, in listing order.
    pub fn object_names(&self, bucket: &str) -> Vec<String> {
        self.state()
            .buckets
            .get(bucket)
            .map(|b| b.objects.iter().map(|o| o.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn object_data(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        self.state()
            .buckets
            .get(bucket)?
            .objects
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.data.clone())
    }
}

#[async_trait]
impl BlobBackend for MemoryBackend {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<StorageObject>, BackendError> {
        let mut state = self.state();
        state.enter(BackendCall::List {
            bucket: bucket.to_string(),
            limit: options.limit,
        })?;

        let objects = state
            .bucket(bucket)?
            .objects
            .iter()
            .filter(|o| o.name.starts_with(prefix))
            .take(options.limit.unwrap_or(usize::MAX))
            .map(|o| StorageObject::new(o.name.clone(), o.created_at.clone()))
            .collect();
        Ok(objects)
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), BackendError> {
        let mut state = self.state();
        state.enter(BackendCall::Upload {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })?;

        let stamp = state.next_stamp();
        let target = state.bucket_mut(bucket)?;
        match target.objects.iter().position(|o| o.name == object) {
            Some(_) if !options.upsert => {
                return Err(BackendError::new(
                    BackendErrorKind::Conflict,
                    "The resource already exists",
                ));
            }
            Some(idx) => {
                let existing = &mut target.objects[idx];
                existing.data = data;
                existing.created_at = Some(stamp);
            }
            None => target.objects.push(MemoryObject {
                name: object.to_string(),
                created_at: Some(stamp),
                data,
            }),
        }
        debug!(bucket, object, "memory backend: stored object");
        Ok(())
    }

    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, BackendError> {
        let mut state = self.state();
        state.enter(BackendCall::Download {
            bucket: bucket.to_string(),
            object: object.to_string(),
        })?;

        state
            .bucket(bucket)?
            .objects
            .iter()
            .find(|o| o.name == object)
            .map(|o| o.data.clone())
            .ok_or_else(|| BackendError::new(BackendErrorKind::NotFound, "Object not found"))
    }

    async fn remove(&self, bucket: &str, objects: &[String]) -> Result<(), BackendError> {
        let mut state = self.state();
        state.enter(BackendCall::Remove {
            bucket: bucket.to_string(),
            objects: objects.to_vec(),
        })?;

        let target = state.bucket_mut(bucket)?;
        target.objects.retain(|o| !objects.contains(&o.name));
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, BackendError> {
        let mut state = self.state();
        state.enter(BackendCall::ListBuckets)?;
        Ok(state.buckets.keys().map(Bucket::new).collect())
    }

    async fn create_bucket(&self, name: &str, public: bool) -> Result<(), BackendError> {
        let mut state = self.state();
        state.enter(BackendCall::CreateBucket {
            name: name.to_string(),
            public,
        })?;

        if state.buckets.contains_key(name) {
            return Err(BackendError::new(
                BackendErrorKind::Conflict,
                "The resource already exists",
            ));
        }
        state.buckets.insert(
            name.to_string(),
            MemoryBucket {
                public,
                objects: Vec::new(),
            },
        );
        Ok(())
    }

    fn display_name(&self) -> &str {
        "memory"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_missing_bucket() {
        let backend = MemoryBackend::new();
        let err = backend
            .list("whatsapp-nobody", "", ListOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::BucketNotFound);
        assert!(err.message.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_upload_upsert_replaces() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b", false).await.unwrap();
        let opts = UploadOptions::session_bundle();
        backend.upload("b", "x.zip", vec![1], &opts).await.unwrap();
        backend.upload("b", "x.zip", vec![2], &opts).await.unwrap();

        assert_eq!(backend.object_names("b"), vec!["x.zip"]);
        assert_eq!(backend.object_data("b", "x.zip"), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_upload_without_upsert_conflicts() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b", false).await.unwrap();
        let opts = UploadOptions {
            upsert: false,
            ..UploadOptions::session_bundle()
        };
        backend.upload("b", "x.zip", vec![1], &opts).await.unwrap();
        let err = backend.upload("b", "x.zip", vec![2], &opts).await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b", false).await.unwrap();
        let opts = UploadOptions::session_bundle();
        for name in ["a", "b", "c"] {
            backend.upload("b", name, vec![], &opts).await.unwrap();
        }

        let listed = backend.list("b", "", ListOptions::default()).await.unwrap();
        let stamps: Vec<DateTime<Utc>> = listed
            .iter()
            .map(|o| {
                DateTime::parse_from_rfc3339(o.created_at.as_deref().unwrap())
                    .unwrap()
                    .with_timezone(&Utc)
            })
            .collect();
        assert!(stamps[0] < stamps[1]);
        assert!(stamps[1] < stamps[2]);
    }

    #[tokio::test]
    async fn test_list_respects_limit_and_prefix() {
        let backend = MemoryBackend::new();
        backend.insert_object("b", "one.zip", None, vec![]);
        backend.insert_object("b", "two.zip", None, vec![]);
        backend.insert_object("b", "other.txt", None, vec![]);

        let limited = backend.list("b", "", ListOptions::limit(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].name, "one.zip");

        let prefixed = backend.list("b", "o", ListOptions::default()).await.unwrap();
        assert_eq!(prefixed.len(), 2);
    }

    #[tokio::test]
    async fn test_create_bucket_twice_conflicts() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b", false).await.unwrap();
        let err = backend.create_bucket("b", false).await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::Conflict);
        assert_eq!(backend.is_public("b"), Some(false));
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let backend = MemoryBackend::new();
        backend.fail_next(BackendOp::ListBuckets, BackendError::other("boom"));

        let err = backend.list_buckets().await.unwrap_err();
        assert_eq!(err.message, "boom");
        assert!(backend.list_buckets().await.is_ok());
        assert_eq!(
            backend.calls(),
            vec![BackendCall::ListBuckets, BackendCall::ListBuckets]
        );
    }

    #[tokio::test]
    async fn test_download_missing_object() {
        let backend = MemoryBackend::new();
        backend.create_bucket("b", false).await.unwrap();
        let err = backend.download("b", "nope.zip").await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::NotFound);
        assert!(!err.is_bucket_missing());
    }

    #[tokio::test]
    async fn test_remove_from_missing_bucket_fails() {
        let backend = MemoryBackend::new();
        let err = backend
            .remove("whatsapp-ghost", &["ghost.zip".to_string()])
            .await
            .unwrap_err();
        assert!(err.is_bucket_missing());
    }
}
