//! A "camera" backed by an image file the user already has.
//!
//! No file chosen is the same as backing out of the camera UI.

use async_trait::async_trait;
use std::path::PathBuf;

use super::{crop_to_aspect, save_capture, Camera, CameraError, CaptureOptions, CaptureOutcome, Permission};

pub struct FileCamera {
    source: Option<PathBuf>,
    capture_dir: PathBuf,
}

impl FileCamera {
    pub fn new(source: Option<PathBuf>, capture_dir: PathBuf) -> Self {
        Self {
            source,
            capture_dir,
        }
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn request_access(&self) -> Result<Permission, CameraError> {
        let Some(source) = &self.source else {
            return Ok(Permission::Granted);
        };
        match tokio::fs::metadata(source).await {
            Ok(meta) if meta.is_file() => Ok(Permission::Granted),
            Ok(_) => {
                log::warn!("[CAMERA] {} is not a file", source.display());
                Ok(Permission::Denied)
            }
            Err(e) => {
                log::warn!("[CAMERA] Cannot access {}: {}", source.display(), e);
                Ok(Permission::Denied)
            }
        }
    }

    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureOutcome, CameraError> {
        let Some(source) = self.source.clone() else {
            log::info!("[CAMERA] No photo chosen");
            return Ok(CaptureOutcome::Cancelled);
        };
        let dir = self.capture_dir.clone();
        let options = *options;

        // Decoding and re-encoding are CPU-bound.
        let saved = tokio::task::spawn_blocking(move || {
            let image = image::open(&source)
                .map_err(|e| CameraError::Decode(format!("{}: {}", source.display(), e)))?;
            let edited = if options.allows_editing {
                crop_to_aspect(&image, options.aspect)
            } else {
                image
            };
            save_capture(&edited, &dir)
        })
        .await
        .map_err(|e| CameraError::Unavailable(e.to_string()))??;

        log::info!("[CAMERA] Shot saved to {}", saved.display());
        Ok(CaptureOutcome::Captured(saved))
    }
}
