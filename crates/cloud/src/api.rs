//! REST client for the media host.
//!
//! Every call is a signed form POST: parameters are sorted by name, joined
//! as `key=value` pairs with `&`, suffixed with the API secret and hashed
//! with SHA-256. The file field, `api_key`, `resource_type` and the
//! signature itself are excluded from the signed string.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio_util::io::ReaderStream;

use crate::config::CloudinaryConfig;

/// Response returned by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub public_id: String,
    pub secure_url: String,
    /// Playback length in seconds. Present for video uploads only.
    pub duration: Option<f64>,
}

/// Response returned by the destroy endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DestroyResponse {
    /// `"ok"` when removed, `"not found"` when nothing matched.
    pub result: String,
}

/// Errors from the media host REST layer.
#[derive(Debug, thiserror::Error)]
pub enum CloudinaryApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The host returned a non-2xx status code.
    #[error("Media host error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The host accepted the request but reported that it did nothing.
    #[error("Media host rejected request: {0}")]
    Rejected(String),
}

/// Signed HTTP client for one media host account.
pub struct CloudinaryApi {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryApi {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Upload a file into the given resource namespace (`video` or `image`).
    ///
    /// The file is streamed from disk; `len` is sent as the part length.
    pub async fn upload(
        &self,
        resource_type: &str,
        file_name: String,
        file: tokio::fs::File,
        len: u64,
    ) -> Result<UploadResponse, CloudinaryApiError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(&[("timestamp", timestamp.as_str())], &self.config.api_secret);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = reqwest::multipart::Part::stream_with_length(body, len).file_name(file_name);

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint(resource_type, "upload"))
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Remove a stored object. A `"not found"` result is returned as-is so
    /// the caller can decide whether that counts as success.
    pub async fn destroy(
        &self,
        resource_type: &str,
        public_id: &str,
    ) -> Result<DestroyResponse, CloudinaryApiError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let params = [
            ("public_id", public_id.to_string()),
            ("api_key", self.config.api_key.clone()),
            ("timestamp", timestamp),
            ("signature", signature),
            ("signature_algorithm", "sha256".to_string()),
        ];

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    fn endpoint(&self, resource_type: &str, action: &str) -> String {
        format!(
            "{}/{}/{resource_type}/{action}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    // ---- private helpers ----

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CloudinaryApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CloudinaryApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CloudinaryApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Compute the request signature for the given parameters.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
