// Copyright 2020 @TwoCookingMice

use super::constants::Float;
use super::spectrum::RGBSpectrum;

use std::ops;
use std::vec::Vec;

#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<RGBSpectrum>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = RGBSpectrum;

    fn index(&self, index: (usize, usize)) -> &RGBSpectrum {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut RGBSpectrum {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self { data: vec![RGBSpectrum::default(); width * height],
               width,
               height }
    }

    pub fn filled(width: usize, height: usize, value: RGBSpectrum) -> Self {
        Self { data: vec![value; width * height], width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[RGBSpectrum] {
        &self.data
    }

    // Horizontal coordinates wrap around, vertical ones clamp to the border.
    pub fn texel_wrapped(&self, x: isize, y: isize) -> RGBSpectrum {
        let w = self.width as isize;
        let h = self.height as isize;
        let xi = ((x % w) + w) % w;
        let yi = y.max(0).min(h - 1);
        self.data[xi as usize + self.width * yi as usize]
    }

    // Bilinear lookup at continuous pixel coordinates where texel (x, y)
    // is centred on (x, y).
    pub fn bilinear(&self, x: Float, y: Float) -> RGBSpectrum {
        let x0 = x.floor();
        let y0 = y.floor();
        let dx1 = x - x0;
        let dy1 = y - y0;
        let dx2 = 1.0 - dx1;
        let dy2 = 1.0 - dy1;
        let xi = x0 as isize;
        let yi = y0 as isize;

        self.texel_wrapped(xi, yi) * (dx2 * dy2)
            + self.texel_wrapped(xi + 1, yi) * (dx1 * dy2)
            + self.texel_wrapped(xi, yi + 1) * (dx2 * dy1)
            + self.texel_wrapped(xi + 1, yi + 1) * (dx1 * dy1)
    }
}

/* Test for Bitmap */
#[cfg(test)]
mod tests {
    use super::Bitmap;
    use super::RGBSpectrum;

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 256usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 256);

        bitmap[(5, 6)] = RGBSpectrum::new(1.0, 0.5, 0.6);
        assert_eq!(bitmap[(5, 6)][0], 1.0);
        assert_eq!(bitmap[(2, 6)][0], 0.0);
    }

    #[test]
    fn test_bitmap_wrap_and_clamp() {
        let mut bitmap = Bitmap::new(4, 2);
        bitmap[(0, 0)] = RGBSpectrum::splat(1.0);
        bitmap[(3, 1)] = RGBSpectrum::splat(2.0);
        assert_eq!(bitmap.texel_wrapped(4, 0), bitmap[(0, 0)]);
        assert_eq!(bitmap.texel_wrapped(-1, 1), bitmap[(3, 1)]);
        assert_eq!(bitmap.texel_wrapped(0, -3), bitmap[(0, 0)]);
        assert_eq!(bitmap.texel_wrapped(3, 9), bitmap[(3, 1)]);
    }

    #[test]
    fn test_bitmap_bilinear() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap[(0, 0)] = RGBSpectrum::splat(0.0);
        bitmap[(1, 0)] = RGBSpectrum::splat(1.0);
        assert!((bitmap.bilinear(0.25, 0.0)[0] - 0.25).abs() < 1e-6);
        assert!((bitmap.bilinear(1.0, 0.0)[0] - 1.0).abs() < 1e-6);

        let constant = Bitmap::filled(3, 3, RGBSpectrum::splat(0.7));
        assert!((constant.bilinear(1.3, 0.6)[1] - 0.7).abs() < 1e-6);
    }
}
