/* Copyright 2020 @TwoCookingMice */

use crate::math::bitmap::Bitmap;
use crate::math::spectrum::RGBSpectrum;

use exr::prelude::*;

// Read the first valid RGB(A) layer of an OpenEXR file.
pub fn read_exr_from_file(file_path: &str) -> std::result::Result<Bitmap, String> {
    log::info!("Starting reading OpenEXR image from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Bitmap::new(resolution.width(), resolution.height()),
            |bitmap: &mut Bitmap, position, (r, g, b, _a): (f32, f32, f32, f32)| {
                bitmap[(position.x(), position.y())] = RGBSpectrum::new(r, g, b);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)
        .map_err(|e| format!("failed to read exr {}: {}", file_path, e))?;

    let bitmap = image.layer_data.channel_data.pixels;
    log::info!("OpenEXR loaded, width = {}, height = {}.", bitmap.width(), bitmap.height());
    Ok(bitmap)
}

// Write EXR Image to file
pub fn write_exr_to_file(image: &Bitmap, file_path: &str) -> std::result::Result<(), String> {
    log::info!("Starting writing openexr images: {}.", file_path);

    write_rgb_file(file_path, image.width(), image.height(), |x, y| {
        let rgb = image[(x, y)];
        (rgb[0], rgb[1], rgb[2])
    })
    .map_err(|e| format!("failed to write exr {}: {}", file_path, e))?;

    log::info!("EXR written to: {}.", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{read_exr_from_file, write_exr_to_file};
    use crate::math::bitmap::Bitmap;
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_exr_write_then_read() {
        let mut bitmap = Bitmap::new(5, 3);
        bitmap[(4, 2)] = RGBSpectrum::new(1.5, 0.25, 8.0);
        bitmap[(0, 1)] = RGBSpectrum::new(0.0, 2.0, 0.5);

        let path = std::env::temp_dir().join(format!("madeleine_exr_{}.exr", std::process::id()));
        let path = path.to_str().expect("temp path is utf-8").to_string();
        write_exr_to_file(&bitmap, &path).expect("write succeeds");
        let loaded = read_exr_from_file(&path).expect("read succeeds");
        let _ = std::fs::remove_file(&path);

        assert_eq!((loaded.width(), loaded.height()), (5, 3));
        assert_eq!(loaded[(4, 2)], bitmap[(4, 2)]);
        assert_eq!(loaded[(0, 1)], bitmap[(0, 1)]);
    }

    #[test]
    fn test_missing_exr_is_an_error() {
        assert!(read_exr_from_file("/nonexistent/probe.exr").is_err());
    }
}
