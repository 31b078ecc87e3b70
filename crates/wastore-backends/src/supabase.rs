//! Supabase Storage backend: talks to the Storage REST API directly.
//!
//! All requests go to `{url}/storage/v1` and carry the service role key both
//! as `apikey` and as a Bearer token.
//!
//! Error bodies look like
//! `{"statusCode": "404", "error": "Bucket not found", "message": "Bucket not found"}`
//! (the HTTP status itself is often 400); they are mapped onto
//! [`BackendErrorKind`] so the store can recognise a missing bucket without
//! string matching.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use wastore_core::config::SupabaseConfig;
use wastore_core::error::{BackendError, BackendErrorKind, StoreError};
use wastore_core::types::{Bucket, ListOptions, StorageObject, UploadOptions};
use wastore_core::BlobBackend;

// ─────────────────────────────────────────────
// SupabaseBackend
// ─────────────────────────────────────────────

/// [`BlobBackend`] over Supabase Storage.
pub struct SupabaseBackend {
    /// HTTP client (shared, connection-pooled). No timeout is set.
    client: reqwest::Client,
    /// `{url}/storage/v1`
    storage_url: Url,
    /// Service role key.
    api_key: String,
}

impl std::fmt::Debug for SupabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseBackend")
            .field("storage_url", &self.storage_url.as_str())
            .finish()
    }
}

impl SupabaseBackend {
    /// Create a backend from the Supabase section of the config.
    ///
    /// Fails if the URL or key is missing or the URL doesn't parse.
    pub fn new(config: &SupabaseConfig) -> Result<Self, StoreError> {
        if config.url.is_empty() {
            return Err(StoreError::Config("supabase.url is not set".into()));
        }
        if config.service_role_key.is_empty() {
            return Err(StoreError::Config(
                "supabase.serviceRoleKey is not set".into(),
            ));
        }

        let base = config.url.trim_end_matches('/');
        let storage_url = Url::parse(&format!("{base}/storage/v1")).map_err(|e| {
            StoreError::Config(format!("invalid supabase.url '{}': {e}", config.url))
        })?;
        if storage_url.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "invalid supabase.url '{}'",
                config.url
            )));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            storage_url,
            api_key: config.service_role_key.clone(),
        })
    }

    /// Build an endpoint URL below `storage/v1`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.storage_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::other("storage URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send a request and turn non-2xx responses into a [`BackendError`].
    async fn send(
        &self,
        request: RequestBuilder,
        op: &'static str,
    ) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|e| {
            error!(op, error = %e, "storage request failed");
            BackendError::new(BackendErrorKind::Transport, e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = parse_error(status, &body);
        warn!(
            op,
            status = %status,
            kind = %err.kind,
            message = %err.message,
            "storage API error"
        );
        Err(err)
    }
}

#[async_trait]
impl BlobBackend for SupabaseBackend {
    async fn list(
        &self,
        bucket: &str,
        prefix: &str,
        options: ListOptions,
    ) -> Result<Vec<StorageObject>, BackendError> {
        let url = self.endpoint(&["object", "list", bucket])?;
        let mut body = json!({
            "prefix": prefix,
            "offset": 0,
            "sortBy": { "column": "name", "order": "asc" },
        });
        if let Some(limit) = options.limit {
            body["limit"] = json!(limit);
        }

        debug!(bucket, prefix, limit = ?options.limit, "listing objects");
        let response = self
            .send(self.request(Method::POST, url).json(&body), "list")
            .await?;
        response
            .json::<Vec<StorageObject>>()
            .await
            .map_err(|e| BackendError::other(format!("failed to parse object listing: {e}")))
    }

    async fn upload(
        &self,
        bucket: &str,
        object: &str,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["object", bucket, object])?;
        debug!(
            bucket,
            object,
            bytes = data.len(),
            upsert = options.upsert,
            "uploading object"
        );

        let request = self
            .request(Method::POST, url)
            .header("cache-control", format!("max-age={}", options.cache_control))
            .header("x-upsert", options.upsert.to_string())
            .header("content-type", &options.content_type)
            .body(data);
        self.send(request, "upload").await?;
        Ok(())
    }

    async fn download(&self, bucket: &str, object: &str) -> Result<Vec<u8>, BackendError> {
        let url = self.endpoint(&["object", bucket, object])?;
        debug!(bucket, object, "downloading object");

        let response = self.send(self.request(Method::GET, url), "download").await?;
        let bytes = response.bytes().await.map_err(|e| {
            BackendError::new(BackendErrorKind::Transport, e.to_string())
        })?;
        Ok(bytes.to_vec())
    }

    async fn remove(&self, bucket: &str, objects: &[String]) -> Result<(), BackendError> {
        let url = self.endpoint(&["object", bucket])?;
        debug!(bucket, count = objects.len(), "removing objects");

        let request = self
            .request(Method::DELETE, url)
            .json(&json!({ "prefixes": objects }));
        self.send(request, "remove").await?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<Bucket>, BackendError> {
        let url = self.endpoint(&["bucket"])?;
        let response = self.send(self.request(Method::GET, url), "list_buckets").await?;
        response
            .json::<Vec<Bucket>>()
            .await
            .map_err(|e| BackendError::other(format!("failed to parse bucket listing: {e}")))
    }

    async fn create_bucket(&self, name: &str, public: bool) -> Result<(), BackendError> {
        let url = self.endpoint(&["bucket"])?;
        debug!(bucket = name, public, "creating bucket");

        let request = self
            .request(Method::POST, url)
            .json(&json!({ "id": name, "name": name, "public": public }));
        self.send(request, "create_bucket").await?;
        Ok(())
    }

    fn display_name(&self) -> &str {
        "Supabase Storage"
    }
}

// ─────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────

/// Storage API error body.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    /// Sent as a string (`"404"`) by the storage server; accept numbers too.
    #[serde(rename = "statusCode", default)]
    status_code: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn parse_error(status: StatusCode, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    let code = parsed
        .status_code
        .as_ref()
        .and_then(|v| match v {
            serde_json::Value::String(s) => s.parse::<u16>().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        })
        .unwrap_or(status.as_u16());

    let message = parsed
        .message
        .clone()
        .or_else(|| parsed.error.clone())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {body}")
            }
        });

    let text = format!(
        "{} {}",
        parsed.error.as_deref().unwrap_or_default(),
        message
    )
    .to_lowercase();

    let kind = if text.contains("bucket not found") {
        BackendErrorKind::BucketNotFound
    } else if code == 409 || text.contains("already exists") {
        BackendErrorKind::Conflict
    } else if code == 404 {
        BackendErrorKind::NotFound
    } else if code == 401 || code == 403 {
        BackendErrorKind::Unauthorized
    } else {
        BackendErrorKind::Other
    };

    BackendError::new(kind, message)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
