// Copyright @yucwang 2026

pub mod exr_utils;
pub mod image_utils;

use crate::math::bitmap::Bitmap;
use std::path::Path;

/// Loads a radiance image, picking the decoder from the file extension.
/// LDR formats are assumed to be sRGB encoded.
pub fn load_bitmap(path: &str) -> Result<Bitmap, String> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "exr" => exr_utils::read_exr_from_file(path),
        "jpg" | "jpeg" | "png" => image_utils::read_ldr_from_file(path, true),
        _ => Err(format!("unsupported image format: {}", path)),
    }
}
