//! Desktop stand-in for a phone camera: grab the first monitor.

use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use xcap::Monitor;

use super::{crop_to_aspect, save_capture, Camera, CameraError, CaptureOptions, CaptureOutcome, Permission};

pub struct ScreenCamera {
    capture_dir: PathBuf,
}

impl ScreenCamera {
    pub fn new(capture_dir: PathBuf) -> Self {
        Self { capture_dir }
    }
}

fn grab_first_monitor() -> Result<DynamicImage, CameraError> {
    let monitors = Monitor::all().map_err(|e| CameraError::Unavailable(e.to_string()))?;
    let monitor = monitors
        .first()
        .ok_or_else(|| CameraError::Unavailable("no monitors found".to_string()))?;
    let image = monitor
        .capture_image()
        .map_err(|e| CameraError::Unavailable(format!("capture failed: {}", e)))?;
    Ok(DynamicImage::ImageRgba8(image))
}

#[async_trait]
impl Camera for ScreenCamera {
    /// Screen recording permission shows up as an empty or failing
    /// monitor enumeration.
    async fn request_access(&self) -> Result<Permission, CameraError> {
        let probe = tokio::task::spawn_blocking(|| {
            Monitor::all()
                .map(|m| m.len())
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| CameraError::Unavailable(e.to_string()))?;
        match probe {
            Ok(count) if count > 0 => Ok(Permission::Granted),
            Ok(_) => Ok(Permission::Denied),
            Err(e) => {
                log::warn!("[CAMERA] Screen access refused: {}", e);
                Ok(Permission::Denied)
            }
        }
    }

    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureOutcome, CameraError> {
        let dir = self.capture_dir.clone();
        let options = *options;
        let start = std::time::Instant::now();

        let saved = tokio::task::spawn_blocking(move || {
            let shot = grab_first_monitor()?;
            let edited = if options.allows_editing {
                crop_to_aspect(&shot, options.aspect)
            } else {
                shot
            };
            save_capture(&edited, &dir)
        })
        .await
        .map_err(|e| CameraError::Unavailable(e.to_string()))??;

        log::info!(
            "[CAMERA] Screen shot saved to {} in {}ms",
            saved.display(),
            start.elapsed().as_millis()
        );
        Ok(CaptureOutcome::Captured(saved))
    }
}
