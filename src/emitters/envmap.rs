// Copyright @yucwang 2026

use crate::core::emitter::EmitterSample;
use crate::core::sampler::Sampler;
use crate::io::load_bitmap;
use crate::math::aabb::BoundingSphere;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Vector3f, EPSILON, ONE_MINUS_EPSILON, PI, RAY_EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::sample_tent;

/// Image based light from an equirectangular radiance probe. Directions are
/// importance sampled from a piecewise-constant distribution over texels,
/// weighted by luminance and by the sin(theta) of each row.
pub struct EnvironmentEmitter {
    probe: Bitmap,
    scale: Float,
    // Row-major, (width + 1) entries per row.
    col_cdf: Vec<Float>,
    row_cdf: Vec<Float>,
    row_weights: Vec<Float>,
    normalization: Float,
    bsphere: BoundingSphere,
}

// Finds `i` with cdf[i] <= u < cdf[i + 1] and the position of `u` inside
// that interval, remapped to [0, 1).
fn invert_cdf(cdf: &[Float], u: Float) -> (usize, Float) {
    let n = cdf.len() - 1;
    let idx = cdf.partition_point(|&c| c <= u).saturating_sub(1).min(n - 1);
    let width = cdf[idx + 1] - cdf[idx];
    let residual = if width > 0.0 { (u - cdf[idx]) / width } else { 0.0 };
    (idx, residual.max(0.0).min(ONE_MINUS_EPSILON))
}

impl EnvironmentEmitter {
    pub fn new(probe: Bitmap, scale: Float) -> Result<Self, String> {
        let width = probe.width();
        let height = probe.height();
        if width == 0 || height == 0 {
            return Err(format!("environment probe has invalid resolution: {}x{}", width, height));
        }

        let mut col_cdf = vec![0.0; height * (width + 1)];
        let mut row_cdf = vec![0.0; height + 1];
        let mut row_weights = vec![0.0; height];
        let mut row_sum = 0.0;
        for y in 0..height {
            let row = &mut col_cdf[y * (width + 1)..(y + 1) * (width + 1)];
            let mut col_sum = 0.0;
            for x in 0..width {
                col_sum += probe[(x, y)].luminance().max(0.0);
                row[x + 1] = col_sum;
            }
            if col_sum > 0.0 {
                row[1..].iter_mut().for_each(|c| *c /= col_sum);
            } else {
                // Black rows keep a valid, uniform table.
                for (x, c) in row.iter_mut().enumerate() {
                    *c = x as Float / width as Float;
                }
            }
            row[width] = 1.0;

            row_weights[y] = (PI * (y as Float + 0.5) / height as Float).sin();
            row_sum += col_sum * row_weights[y];
            row_cdf[y + 1] = row_sum;
        }

        let normalization = if row_sum > 0.0 {
            row_cdf[1..].iter_mut().for_each(|c| *c /= row_sum);
            1.0 / (row_sum * (2.0 * PI / width as Float) * (PI / height as Float))
        } else {
            log::warn!("Environment probe is black; it will never be sampled.");
            for (y, c) in row_cdf.iter_mut().enumerate() {
                *c = y as Float / height as Float;
            }
            0.0
        };
        row_cdf[height] = 1.0;

        log::debug!("Built environment distribution over {}x{} texels, normalization = {}.",
                    width, height, normalization);

        Ok(Self {
            probe,
            scale,
            col_cdf,
            row_cdf,
            row_weights,
            normalization,
            bsphere: BoundingSphere { center: Vector3f::zeros(), radius: 0.0 },
        })
    }

    pub fn from_file(path: &str, scale: Float) -> Result<Self, String> {
        let probe = load_bitmap(path)?;
        Self::new(probe, scale)
    }

    pub fn set_bounding_sphere(&mut self, sphere: &BoundingSphere) {
        self.bsphere = *sphere;
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.probe.width(), self.probe.height())
    }

    pub fn row_cdf(&self) -> &[Float] {
        &self.row_cdf
    }

    pub fn col_cdf(&self, y: usize) -> &[Float] {
        let stride = self.probe.width() + 1;
        &self.col_cdf[y * stride..(y + 1) * stride]
    }

    pub fn row_weights(&self) -> &[Float] {
        &self.row_weights
    }

    pub fn normalization(&self) -> Float {
        self.normalization
    }

    fn direction_from_pixel(&self, x: Float, y: Float) -> (Vector3f, Float) {
        let (width, height) = self.dimensions();
        let theta = PI * (y + 0.5) / height as Float;
        let phi = PI * (2.0 * (x + 0.5) / width as Float - 1.0);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let (sin_phi, cos_phi) = phi.sin_cos();
        (Vector3f::new(sin_theta * sin_phi, cos_theta, -sin_theta * cos_phi), sin_theta)
    }

    fn pixel_from_direction(&self, d: &Vector3f) -> (Float, Float, Float) {
        let (width, height) = self.dimensions();
        let u = 0.5 * (1.0 + d.x.atan2(-d.z) / PI);
        // Same angle as acos(clamp(d.y)) for unit vectors, but stays
        // accurate close to the poles.
        let sin_theta = d.x.hypot(d.z);
        let v = sin_theta.atan2(d.y) / PI;
        (u * width as Float - 0.5, v * height as Float - 0.5, sin_theta)
    }

    // Bilinear blend of luminance times row weight, rows clamped at the poles.
    fn pdf_numerator(&self, x: Float, y: Float) -> Float {
        let height = self.probe.height() as isize;
        let x0 = x.floor();
        let y0 = y.floor();
        let dx1 = x - x0;
        let dy1 = y - y0;
        let (xi, yi) = (x0 as isize, y0 as isize);

        let row_value = |row: isize, dy: Float| -> Float {
            let weight = self.row_weights[row.max(0).min(height - 1) as usize];
            let lum = self.probe.texel_wrapped(xi, row).luminance().max(0.0) * (1.0 - dx1)
                + self.probe.texel_wrapped(xi + 1, row).luminance().max(0.0) * dx1;
            lum * weight * dy
        };

        row_value(yi, 1.0 - dy1) + row_value(yi + 1, dy1)
    }

    fn pdf_at_pixel(&self, x: Float, y: Float, sin_theta: Float) -> Float {
        if self.normalization <= 0.0 {
            return 0.0;
        }
        self.pdf_numerator(x, y) * self.normalization / sin_theta.abs().max(EPSILON)
    }

    pub fn sample(&self, rec: &mut EmitterSample, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let u = sampler.next_2d();
        let height = self.probe.height() as Float;

        let (row, res_v) = invert_cdf(&self.row_cdf, u.y);
        let (col, res_u) = invert_cdf(self.col_cdf(row), u.x);

        let x = col as Float + sample_tent(res_u);
        let mut y = row as Float + sample_tent(res_v);
        // Offsets crossing a pole are mirrored back onto the sphere.
        if y < -0.5 {
            y = -1.0 - y;
        } else if y > height - 0.5 {
            y = 2.0 * height - 1.0 - y;
        }

        let (wi, sin_theta) = self.direction_from_pixel(x, y);
        rec.pdf = self.pdf_at_pixel(x, y, sin_theta);
        if rec.pdf <= 0.0 {
            rec.pdf = 0.0;
            return RGBSpectrum::zero();
        }

        let dist_to_center = (rec.ref_p - self.bsphere.center).norm();
        let max_t = 2.0 * self.bsphere.radius + dist_to_center;
        rec.wi = wi;
        rec.p = rec.ref_p + wi * max_t;
        rec.n = -wi;
        rec.shadow_ray = Ray3f::new(rec.ref_p, wi, Some(RAY_EPSILON), Some(max_t));

        self.probe.bilinear(x, y) * (self.scale / rec.pdf)
    }

    pub fn eval(&self, rec: &EmitterSample) -> RGBSpectrum {
        let (x, y, _) = self.pixel_from_direction(&rec.wi);
        self.probe.bilinear(x, y) * self.scale
    }

    pub fn pdf(&self, rec: &EmitterSample) -> Float {
        let (x, y, sin_theta) = self.pixel_from_direction(&rec.wi);
        self.pdf_at_pixel(x, y, sin_theta)
    }
}
