//! Value types exchanged with an object-storage backend.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Objects & buckets
// ─────────────────────────────────────────────

/// An object inside a bucket, as reported by a listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageObject {
    pub name: String,
    /// Backend-supplied creation time (RFC 3339 for Supabase). Folders and
    /// some backends report none.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl StorageObject {
    pub fn new(name: impl Into<String>, created_at: Option<String>) -> Self {
        Self {
            name: name.into(),
            created_at,
        }
    }
}

/// A named container of objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub name: String,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

// ─────────────────────────────────────────────
// Request options
// ─────────────────────────────────────────────

/// Options for listing objects in a bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of objects to return. `None` = backend default.
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

/// Options attached to an upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadOptions {
    /// Cache directive stored with the object (e.g. `"no-cache"`).
    pub cache_control: String,
    /// Overwrite an existing object with the same name.
    pub upsert: bool,
    pub content_type: String,
}

impl UploadOptions {
    /// Options used for session bundles: never cached, always overwritten, zip archive.
    pub fn session_bundle() -> Self {
        Self {
            cache_control: "no-cache".to_string(),
            upsert: true,
            content_type: "application/zip".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_bundle_options() {
        let opts = UploadOptions::session_bundle();
        assert_eq!(opts.cache_control, "no-cache");
        assert!(opts.upsert);
        assert_eq!(opts.content_type, "application/zip");
    }

    #[test]
    fn test_storage_object_deserialize_without_timestamp() {
        let obj: StorageObject = serde_json::from_str(r#"{"name": "a.zip"}"#).unwrap();
        assert_eq!(obj.name, "a.zip");
        assert!(obj.created_at.is_none());
    }

    #[test]
    fn test_storage_object_ignores_extra_fields() {
        let obj: StorageObject = serde_json::from_str(
            r#"{"name": "a.zip", "id": "123",
                "created_at": "2024-01-01T00:00:00Z", "metadata": {}}"#,
        )
        .unwrap();
        assert_eq!(obj.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }
}
