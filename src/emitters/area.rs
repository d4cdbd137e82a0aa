// Copyright @yucwang 2026

use crate::core::emitter::EmitterSample;
use crate::core::sampler::Sampler;
use crate::core::shape::Shape;
use crate::math::constants::{Float, RAY_EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

/// Diffuse emitter bound to a shape. Only the side the geometric normal
/// points to emits.
pub struct AreaEmitter {
    shape: Arc<dyn Shape>,
    radiance: RGBSpectrum,
}

impl AreaEmitter {
    pub fn from_shape(shape: Arc<dyn Shape>, radiance: RGBSpectrum) -> Self {
        Self { shape, radiance }
    }

    pub fn sample(&self, rec: &mut EmitterSample, sampler: &mut dyn Sampler) -> RGBSpectrum {
        let surface = self.shape.sample(&sampler.next_2d());
        let its = surface.intersection();
        let d = its.p() - rec.ref_p;
        let dist = d.norm();
        rec.p = its.p();
        rec.n = its.geo_normal();
        rec.pdf = 0.0;
        if dist <= 0.0 {
            return RGBSpectrum::zero();
        }
        rec.wi = d / dist;

        let cos_light = rec.n.dot(&-rec.wi);
        if cos_light <= 0.0 || surface.pdf() <= 0.0 {
            return RGBSpectrum::zero();
        }

        rec.pdf = surface.pdf() * dist * dist / cos_light;
        rec.shadow_ray = Ray3f::new(rec.ref_p, rec.wi, Some(RAY_EPSILON), Some(dist * (1.0 - RAY_EPSILON)));

        self.radiance / rec.pdf
    }

    pub fn eval(&self, rec: &EmitterSample) -> RGBSpectrum {
        if rec.n.dot(&-rec.wi) > 0.0 {
            self.radiance
        } else {
            RGBSpectrum::zero()
        }
    }

    // Solid angle density of sampling `rec.p` from `rec.ref_p`.
    pub fn pdf(&self, rec: &EmitterSample) -> Float {
        let area = self.shape.surface_area();
        let cos_light = rec.n.dot(&-rec.wi);
        if area <= 0.0 || cos_light <= 0.0 {
            return 0.0;
        }
        let dist = rec.distance();
        dist * dist / (cos_light * area)
    }
}
