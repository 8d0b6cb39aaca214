//! Edit step: centre crop to a fixed aspect, then PNG to disk.

use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

use super::CameraError;

/// Largest centred region of `image` with the given width:height ratio.
pub fn crop_to_aspect(image: &DynamicImage, aspect: (u32, u32)) -> DynamicImage {
    let (aw, ah) = aspect;
    let (w, h) = image.dimensions();
    if aw == 0 || ah == 0 || w == 0 || h == 0 {
        return image.clone();
    }

    // Compare w/h against aw/ah without floats.
    let (crop_w, crop_h) = if (w as u64) * (ah as u64) > (h as u64) * (aw as u64) {
        (((h as u64) * (aw as u64) / (ah as u64)) as u32, h)
    } else {
        (w, ((w as u64) * (ah as u64) / (aw as u64)) as u32)
    };
    if (crop_w, crop_h) == (w, h) {
        return image.clone();
    }

    let x = (w - crop_w) / 2;
    let y = (h - crop_h) / 2;
    log::debug!(
        "[CAMERA] Crop {}x{} → {}x{} at ({},{})",
        w,
        h,
        crop_w,
        crop_h,
        x,
        y
    );
    image.crop_imm(x, y, crop_w, crop_h)
}

/// Write a shot as PNG under `dir` with a fresh random name.
pub fn save_capture(image: &DynamicImage, dir: &Path) -> Result<PathBuf, CameraError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| CameraError::Io(format!("{}: {}", dir.display(), e)))?;
    let path = dir.join(format!("{}.png", uuid::Uuid::new_v4()));
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| CameraError::Io(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}
