//! Cloud Vision HTTP client.
//!
//! API key travels in the `key` query param, same as the other Google
//! REST surfaces. One request per analysis, no retries.

use async_trait::async_trait;

use super::types::{AnnotateRequest, OcrResponse};
use super::{OcrClient, RecognitionError};
use crate::config::AppConfig;

const ANNOTATE_PATH: &str = "/v1/images:annotate";

pub struct VisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: &AppConfig) -> Result<Self, RecognitionError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RecognitionError::Network(e.to_string()))?;
        Ok(Self::with_http(
            http,
            &config.vision_endpoint,
            &config.credentials.google_cloud_vision_api_key,
        ))
    }

    pub fn with_http(http: reqwest::Client, endpoint: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn annotate_url(&self) -> String {
        format!("{}{}", self.endpoint, ANNOTATE_PATH)
    }

    async fn post(&self, body: &AnnotateRequest) -> Result<String, RecognitionError> {
        let response = self
            .http
            .post(self.annotate_url())
            .query(&[("key", self.api_key.as_str())])
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the API key.
                let e = e.without_url();
                log::error!("[OCR] HTTP request failed: {}", e);
                RecognitionError::Network(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RecognitionError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            log::error!("[OCR] Vision API returned {}: {}", status, text);
            return Err(RecognitionError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    /// Confirm the key is accepted by sending an empty batch.
    ///
    /// A 400 that does not mention the key means the key passed and only
    /// the empty batch was refused. Transport failures are errors.
    pub async fn check_connection(&self) -> Result<bool, RecognitionError> {
        let empty = AnnotateRequest { requests: vec![] };
        match self.post(&empty).await {
            Ok(_) => Ok(true),
            Err(RecognitionError::Status { status, body }) => {
                log::info!("[OCR] Connection check status: {}", status);
                Ok(status == 400 && !body.contains("API key"))
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl OcrClient for VisionClient {
    async fn analyze(&self, image_url: &str) -> Result<OcrResponse, RecognitionError> {
        let start = std::time::Instant::now();
        let body = AnnotateRequest::document_text(image_url);
        let text = self.post(&body).await?;
        log::info!("[OCR] Vision replied in {}ms", start.elapsed().as_millis());

        let parsed = OcrResponse::parse(&text).map_err(|e| {
            log::warn!("[OCR] Rejected reply: {}", e);
            e
        })?;
        log::info!(
            "[OCR] Transcription: {} chars, {} segments",
            parsed.transcription().chars().count(),
            parsed.segments().len()
        );
        Ok(parsed)
    }
}
