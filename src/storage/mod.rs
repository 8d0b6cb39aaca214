//! Object store domain: durable, publicly fetchable image URLs.
//!
//! `ObjectStore` is the seam the controller depends on. `FirebaseStorage`
//! talks to the Firebase Storage REST API.

mod firebase;

pub use firebase::FirebaseStorage;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use reqwest::Url;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UploadError {
    #[error("could not read photo {path}: {reason}")]
    Read { path: PathBuf, reason: String },
    #[error("could not reach the object store: {0}")]
    Network(String),
    #[error("object store rejected the upload ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("object store sent an unreadable reply: {0}")]
    Malformed(String),
    #[error("object store reply had no download token")]
    MissingToken,
    #[error("object store returned an unusable URL: {0}")]
    InvalidUrl(String),
}

/// Uploads a local photo and returns where it can be fetched from.
///
/// Every call stores a new object, even for identical bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, resource: &Path) -> Result<Url, UploadError>;
}

/// Read a local resource fully into memory. Photo-sized payloads only.
pub async fn read_resource(path: &Path) -> Result<Vec<u8>, UploadError> {
    tokio::fs::read(path).await.map_err(|e| UploadError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Fresh random storage key for a new object.
pub fn new_object_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Content type to declare for a photo, guessed from its extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        _ => "application/octet-stream",
    }
}
