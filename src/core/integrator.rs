// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Radiance estimator. Implementations must be pure given the scene, the
/// sampler stream and the camera ray, so pixels can be traced in parallel.
pub trait Integrator: Sync {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum;
    fn samples_per_pixel(&self) -> u32;
}
