//! OCR domain: Google Cloud Vision `images:annotate`.
//!
//! The controller only sees the `OcrClient` trait; `VisionClient` is the
//! production implementation. Replies are validated into `OcrResponse`
//! before they leave this module.

mod client;
pub mod types;

pub use client::VisionClient;
pub use types::{AnnotateRequest, AnnotateResponse, OcrResponse, TextAnnotation};

use async_trait::async_trait;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RecognitionError {
    #[error("could not reach the recognition service: {0}")]
    Network(String),
    #[error("recognition service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("recognition service rejected the image ({code}): {message}")]
    Service { code: i32, message: String },
    #[error("unexpected reply from the recognition service: {0}")]
    Malformed(String),
    #[error("no text was found in the image")]
    NoText,
}

/// Sends an image URL to a recognition service.
#[async_trait]
pub trait OcrClient: Send + Sync {
    async fn analyze(&self, image_url: &str) -> Result<OcrResponse, RecognitionError>;
}
