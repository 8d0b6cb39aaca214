use crate::camera::CameraError;
use crate::clipboard::ClipboardError;
use crate::storage::UploadError;
use crate::vision::RecognitionError;

/// Every way a screen action can fail. `Display` is the text shown to the user.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScanError {
    #[error("Camera access was denied")]
    PermissionDenied,
    #[error("Camera access has not been requested yet")]
    PermissionNotRequested,
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("Analysis failed: {0}")]
    Recognition(#[from] RecognitionError),
    #[error("Take a photo before analyzing")]
    NoImage,
    #[error("Nothing to copy yet, analyze a photo first")]
    MissingResult,
    #[error("Copy failed: {0}")]
    Clipboard(#[from] ClipboardError),
    #[error("Still working on the previous request")]
    Busy,
    #[error("Request was cancelled")]
    Cancelled,
}
