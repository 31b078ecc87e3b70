//! Error types.
//!
//! `BackendError` is what a [`BlobBackend`](crate::backend::BlobBackend) reports;
//! `StoreError` is what [`SessionStore`](crate::session::SessionStore) returns.

use thiserror::Error;

/// Substring a backend uses in its message when the bucket is missing, for
/// backends that don't report a structured kind.
const BUCKET_MISSING_HINT: &str = "does not exist";

// ─────────────────────────────────────────────
// BackendError
// ─────────────────────────────────────────────

/// Coarse classification of a backend failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BackendErrorKind {
    #[error("bucket not found")]
    BucketNotFound,
    #[error("not found")]
    NotFound,
    #[error("conflict")]
    Conflict,
    #[error("unauthorized")]
    Unauthorized,
    #[error("transport")]
    Transport,
    #[error("other")]
    Other,
}

/// An error reported by the object-storage backend.
///
/// Displays as the backend's message, verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// An unclassified error carrying only a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Other, message)
    }

    pub fn bucket_not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::BucketNotFound, message)
    }

    /// Whether this error means the bucket itself is absent.
    ///
    /// Prefers the structured kind, falls back to the message text.
    pub fn is_bucket_missing(&self) -> bool {
        self.kind == BackendErrorKind::BucketNotFound
            || self.message.contains(BUCKET_MISSING_HINT)
    }
}

// ─────────────────────────────────────────────
// StoreError
// ─────────────────────────────────────────────

/// Errors returned by the session store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store was built without a backend.
    #[error("a valid storage backend is required")]
    MissingBackend,

    /// The backend could not be constructed from configuration.
    #[error("invalid backend configuration: {0}")]
    Config(String),

    /// Backend failure, message passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Local file I/O failure, passed through unchanged.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// The backend error, if this is one.
    pub fn as_backend(&self) -> Option<&BackendError> {
        match self {
            StoreError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_missing_by_kind() {
        let err = BackendError::bucket_not_found("Bucket not found");
        assert!(err.is_bucket_missing());
    }

    #[test]
    fn test_bucket_missing_by_message() {
        let err = BackendError::other("Bucket not does not exist");
        assert!(err.is_bucket_missing());
    }

    #[test]
    fn test_other_error_not_bucket_missing() {
        let err = BackendError::other("rate limited");
        assert!(!err.is_bucket_missing());
        let err = BackendError::new(BackendErrorKind::NotFound, "Object not found");
        assert!(!err.is_bucket_missing());
    }

    #[test]
    fn test_backend_message_is_verbatim() {
        let err: StoreError = BackendError::other("rate limited").into();
        assert_eq!(err.to_string(), "rate limited");
        assert!(err.as_backend().is_some());
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: StoreError = io.into();
        assert_eq!(err.to_string(), "no such file");
        assert!(err.as_backend().is_none());
    }

    #[test]
    fn test_missing_backend_message() {
        assert_eq!(
            StoreError::MissingBackend.to_string(),
            "a valid storage backend is required"
        );
    }
}
