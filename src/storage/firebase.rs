//! Firebase Storage REST upload.
//!
//! `POST /v0/b/{bucket}/o?uploadType=media&name={key}` with the raw bytes.
//! The reply carries `downloadTokens`; the public URL is built from the
//! object name and the first token.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use super::{content_type_for, new_object_key, read_resource, ObjectStore, UploadError, Url};
use crate::config::AppConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

pub struct FirebaseStorage {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
}

impl FirebaseStorage {
    pub fn new(config: &AppConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;
        Ok(Self::with_http(
            http,
            &config.storage_endpoint,
            &config.credentials.firebase_storage_bucket,
        ))
    }

    pub fn with_http(http: reqwest::Client, endpoint: &str, bucket: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        }
    }

    fn objects_url(&self) -> String {
        format!("{}/v0/b/{}/o", self.endpoint, self.bucket)
    }

    /// Public fetch URL for a stored object.
    pub fn download_url(&self, name: &str, token: &str) -> Result<Url, UploadError> {
        let raw = format!(
            "{}/{}?alt=media&token={}",
            self.objects_url(),
            urlencoding::encode(name),
            urlencoding::encode(token)
        );
        Url::parse(&raw).map_err(|e| UploadError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    async fn upload(&self, resource: &Path) -> Result<Url, UploadError> {
        let start = std::time::Instant::now();
        let bytes = read_resource(resource).await?;
        let key = new_object_key();
        log::info!(
            "[UPLOAD] {} ({} bytes) → {}/{}",
            resource.display(),
            bytes.len(),
            self.bucket,
            key
        );

        let response = self
            .http
            .post(self.objects_url())
            .query(&[("uploadType", "media"), ("name", key.as_str())])
            .header("content-type", content_type_for(resource))
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                log::error!("[UPLOAD] HTTP request failed: {}", e);
                UploadError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            log::error!("[UPLOAD] Reply body lost: {}", e);
            UploadError::Network(format!("reply body lost: {}", e))
        })?;
        if !status.is_success() {
            log::error!("[UPLOAD] Storage returned {}: {}", status, body);
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let metadata: ObjectMetadata = serde_json::from_str(&body).map_err(|e| {
            log::error!("[UPLOAD] Unparseable reply: {}", e);
            UploadError::Malformed(e.to_string())
        })?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').map(str::trim).find(|t| !t.is_empty()))
            .ok_or(UploadError::MissingToken)?;

        let url = self.download_url(&metadata.name, token)?;
        log::info!("[UPLOAD] Stored in {}ms", start.elapsed().as_millis());
        Ok(url)
    }
}
