//! Camera domain: public API.
//!
//! The controller asks a `Camera` for access once, then for still shots.
//! A shot goes through the edit step (centre crop to the requested
//! aspect) and lands as a PNG in the capture directory; its path is the
//! local resource handle handed to the object store.

mod crop;
mod file;
mod screen;

pub use crop::{crop_to_aspect, save_capture};
pub use file::FileCamera;
pub use screen::ScreenCamera;

use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CameraError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("could not decode photo: {0}")]
    Decode(String),
    #[error("could not save photo: {0}")]
    Io(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// What the capture UI is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Width:height the edit step constrains the shot to.
    pub aspect: (u32, u32),
    pub allows_editing: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            aspect: (4, 3),
            allows_editing: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Cancelled,
    /// Local file holding the (edited) shot.
    Captured(PathBuf),
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn request_access(&self) -> Result<Permission, CameraError>;

    async fn capture(&self, options: &CaptureOptions) -> Result<CaptureOutcome, CameraError>;
}
