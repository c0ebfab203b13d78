//! I/O helpers for scalar surfaces and JSON reports.
//!
//! - `load_grayscale_f32`: read a PNG (8- or 16-bit) into an `ImageF32`,
//!   mapping full-scale white to `scale`.
//! - `save_grayscale_f32`: write an `ImageF32` to an 8-bit grayscale PNG,
//!   mapping `[lo, hi]` to `[0, 255]`.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, ImageView};
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk as a single-channel surface with samples in
/// `[0, scale]`. Decoding goes through 16-bit luma so 16-bit depth PNGs keep
/// their precision.
pub fn load_grayscale_f32(path: &Path, scale: f32) -> Result<ImageF32, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma16();
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img
        .into_raw()
        .into_iter()
        .map(|v| v as f32 / u16::MAX as f32 * scale)
        .collect();
    ImageF32::from_vec(width, height, data).map_err(|e| e.to_string())
}

/// Save a surface to a grayscale PNG, mapping `lo..=hi` onto `0..=255` and
/// clamping outside that range.
pub fn save_grayscale_f32(image: &ImageF32, path: &Path, lo: f32, hi: f32) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) {
        return Err(format!(
            "Invalid value range [{lo}, {hi}] for {}",
            path.display()
        ));
    }
    let mut out = GrayImage::new(image.w as u32, image.h as u32);
    for (y, row) in image.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let v = ((px - lo) / span * 255.0).clamp(0.0, 255.0);
            out.put_pixel(x as u32, y as u32, Luma([v as u8]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
