// Copyright @yucwang 2026

use crate::core::emitter::EmitterSample;
use crate::math::aabb::BoundingSphere;
use crate::math::constants::{Float, Vector3f, RAY_EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Light arriving from infinitely far away along `direction`.
pub struct DirectionalEmitter {
    direction: Vector3f,
    irradiance: RGBSpectrum,
    scene_radius: Float,
}

impl DirectionalEmitter {
    pub fn new(direction: Vector3f, irradiance: RGBSpectrum) -> Self {
        Self { direction: direction.normalize(), irradiance, scene_radius: 0.0 }
    }

    pub fn set_bounding_sphere(&mut self, sphere: &BoundingSphere) {
        self.scene_radius = sphere.radius;
    }

    pub fn sample(&self, rec: &mut EmitterSample) -> RGBSpectrum {
        // Long enough to leave the scene from any point inside it.
        let length = 2.0 * self.scene_radius.max(1.0);
        rec.wi = -self.direction;
        rec.p = rec.ref_p + rec.wi * length;
        rec.n = self.direction;
        rec.pdf = 1.0;
        rec.shadow_ray = Ray3f::new(rec.ref_p, rec.wi, Some(RAY_EPSILON), Some(length));

        self.irradiance
    }
}
