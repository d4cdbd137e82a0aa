// Copyright @yucwang 2026

use crate::core::emitter::EmitterSample;
use crate::math::constants::{Vector3f, RAY_EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Isotropic point light with radiant intensity `intensity`.
pub struct PointEmitter {
    position: Vector3f,
    intensity: RGBSpectrum,
}

impl PointEmitter {
    pub fn new(position: Vector3f, intensity: RGBSpectrum) -> Self {
        Self { position, intensity }
    }

    pub fn sample(&self, rec: &mut EmitterSample) -> RGBSpectrum {
        let d = self.position - rec.ref_p;
        let dist2 = d.norm_squared();
        if dist2 <= 0.0 {
            rec.pdf = 0.0;
            return RGBSpectrum::zero();
        }

        let dist = dist2.sqrt();
        rec.p = self.position;
        rec.wi = d / dist;
        rec.n = -rec.wi;
        rec.pdf = 1.0;
        rec.shadow_ray = Ray3f::new(rec.ref_p, rec.wi, Some(RAY_EPSILON), Some(dist * (1.0 - RAY_EPSILON)));

        self.intensity / dist2
    }
}
