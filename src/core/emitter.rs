// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::emitters::area::AreaEmitter;
use crate::emitters::directional::DirectionalEmitter;
use crate::emitters::envmap::EnvironmentEmitter;
use crate::emitters::point::PointEmitter;
use crate::math::aabb::BoundingSphere;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Record exchanged between emitters and the integrator. `wi` points from
/// `ref_p` towards the emitter and `pdf` is in solid angle at `ref_p`
/// (discrete for delta emitters).
#[derive(Debug, Clone, Copy)]
pub struct EmitterSample {
    pub ref_p: Vector3f,
    pub p: Vector3f,
    pub n: Vector3f,
    pub wi: Vector3f,
    pub shadow_ray: Ray3f,
    pub emitter: Option<usize>,
    pub pdf: Float,
}

impl EmitterSample {
    pub fn new(ref_p: Vector3f) -> Self {
        let up = Vector3f::new(0.0, 0.0, 1.0);
        Self {
            ref_p,
            p: ref_p,
            n: up,
            wi: up,
            shadow_ray: Ray3f::new(ref_p, up, Some(0.0), Some(0.0)),
            emitter: None,
            pdf: 0.0,
        }
    }

    // Query for a point `p` with normal `n` that was found by tracing from `ref_p`.
    pub fn from_hit(ref_p: Vector3f, p: Vector3f, n: Vector3f) -> Self {
        let mut rec = Self::new(ref_p);
        let d = p - ref_p;
        let dist = d.norm();
        if dist > 0.0 {
            rec.wi = d / dist;
        }
        rec.p = p;
        rec.n = n;
        rec
    }

    // Query for a direction towards an emitter at infinity.
    pub fn from_direction(ref_p: Vector3f, wi: Vector3f) -> Self {
        let mut rec = Self::new(ref_p);
        rec.wi = wi.normalize();
        rec
    }

    pub fn distance(&self) -> Float {
        (self.p - self.ref_p).norm()
    }
}

pub enum Emitter {
    Point(PointEmitter),
    Directional(DirectionalEmitter),
    Area(AreaEmitter),
    Environment(EnvironmentEmitter),
}

impl Emitter {
    pub fn name(&self) -> &'static str {
        match self {
            Emitter::Point(_) => "point",
            Emitter::Directional(_) => "directional",
            Emitter::Area(_) => "area",
            Emitter::Environment(_) => "environment",
        }
    }

    /// Draws a direction towards the emitter, fills `rec` and returns the
    /// incident radiance divided by `rec.pdf`. Zero when the pdf vanishes.
    pub fn sample(&self, rec: &mut EmitterSample, sampler: &mut dyn Sampler) -> RGBSpectrum {
        match self {
            Emitter::Point(e) => e.sample(rec),
            Emitter::Directional(e) => e.sample(rec),
            Emitter::Area(e) => e.sample(rec, sampler),
            Emitter::Environment(e) => e.sample(rec, sampler),
        }
    }

    pub fn eval(&self, rec: &EmitterSample) -> RGBSpectrum {
        match self {
            Emitter::Point(_) | Emitter::Directional(_) => RGBSpectrum::zero(),
            Emitter::Area(e) => e.eval(rec),
            Emitter::Environment(e) => e.eval(rec),
        }
    }

    pub fn pdf(&self, rec: &EmitterSample) -> Float {
        match self {
            Emitter::Point(_) | Emitter::Directional(_) => 0.0,
            Emitter::Area(e) => e.pdf(rec),
            Emitter::Environment(e) => e.pdf(rec),
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, Emitter::Point(_) | Emitter::Directional(_))
    }

    pub fn is_environment(&self) -> bool {
        matches!(self, Emitter::Environment(_))
    }

    pub fn set_bounding_sphere(&mut self, sphere: &BoundingSphere) {
        match self {
            Emitter::Directional(e) => e.set_bounding_sphere(sphere),
            Emitter::Environment(e) => e.set_bounding_sphere(sphere),
            Emitter::Point(_) | Emitter::Area(_) => {}
        }
    }
}

impl From<PointEmitter> for Emitter {
    fn from(e: PointEmitter) -> Self {
        Emitter::Point(e)
    }
}

impl From<DirectionalEmitter> for Emitter {
    fn from(e: DirectionalEmitter) -> Self {
        Emitter::Directional(e)
    }
}

impl From<AreaEmitter> for Emitter {
    fn from(e: AreaEmitter) -> Self {
        Emitter::Area(e)
    }
}

impl From<EnvironmentEmitter> for Emitter {
    fn from(e: EnvironmentEmitter) -> Self {
        Emitter::Environment(e)
    }
}

#[cfg(test)]
mod tests {
    use super::EmitterSample;
    use crate::math::constants::Vector3f;

    #[test]
    fn test_sample_from_hit_direction() {
        let rec = EmitterSample::from_hit(Vector3f::zeros(),
                                          Vector3f::new(0.0, 3.0, 4.0),
                                          Vector3f::new(0.0, -1.0, 0.0));
        assert!((rec.distance() - 5.0).abs() < 1e-6);
        assert!((rec.wi - Vector3f::new(0.0, 0.6, 0.8)).norm() < 1e-6);
        assert_eq!(rec.emitter, None);
        assert_eq!(rec.pdf, 0.0);
    }
}
