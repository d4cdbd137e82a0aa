// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

use image::io::Reader as ImageReader;
use image::GenericImageView;

pub fn srgb_to_linear(v: Float) -> Float {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

// Loads an 8/16-bit image (png, jpg) as linear radiance.
pub fn read_ldr_from_file(file_path: &str, srgb: bool) -> std::result::Result<Bitmap, String> {
    log::info!("Starting reading image from: {}.", file_path);

    let img = ImageReader::open(file_path)
        .map_err(|e| format!("failed to open image {}: {}", file_path, e))?
        .decode()
        .map_err(|e| format!("failed to decode image {}: {}", file_path, e))?;

    let (width, height) = img.dimensions();
    let rgb = img.to_rgb32f();
    let mut bitmap = Bitmap::new(width as usize, height as usize);
    for (x, y, p) in rgb.enumerate_pixels() {
        let mut c = RGBSpectrum::new(p[0], p[1], p[2]);
        if srgb {
            c = RGBSpectrum::new(srgb_to_linear(c[0]), srgb_to_linear(c[1]), srgb_to_linear(c[2]));
        }
        bitmap[(x as usize, y as usize)] = c;
    }

    log::info!("Image loaded, width = {}, height = {}.", width, height);
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::{read_ldr_from_file, srgb_to_linear};

    #[test]
    fn test_srgb_to_linear() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214041).abs() < 1e-4);
    }

    #[test]
    fn test_png_is_linearized() {
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([255, 128, 0]));
        let path = std::env::temp_dir().join(format!("madeleine_ldr_{}.png", std::process::id()));
        img.save(&path).expect("png written");

        let bitmap = read_ldr_from_file(path.to_str().expect("utf-8 path"), true).expect("png read");
        let _ = std::fs::remove_file(&path);
        assert_eq!((bitmap.width(), bitmap.height()), (2, 1));
        assert!((bitmap[(0, 0)][0] - 1.0).abs() < 1e-5);
        assert!((bitmap[(0, 0)][1] - srgb_to_linear(128.0 / 255.0)).abs() < 1e-5);
        assert_eq!(bitmap[(1, 0)][2], 0.0);
    }
}
