// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, LobeType, Measure, BSDF};
use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::RGBSpectrum;

const REFLECT_TOLERANCE: Float = 1e-4;

/// Perfectly specular reflector. Only reachable through `sample`; light
/// sampling can never hit its single outgoing direction.
pub struct MirrorBSDF {
    reflectance: RGBSpectrum,
}

impl MirrorBSDF {
    pub fn new(reflectance: RGBSpectrum) -> Self {
        Self { reflectance }
    }
}

fn reflect(wo: &Vector3f) -> Vector3f {
    Vector3f::new(-wo.x, -wo.y, wo.z)
}

impl BSDF for MirrorBSDF {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f, measure: Measure) -> BSDFValue {
        if measure != Measure::Discrete || wo.z <= 0.0 || wi.z <= 0.0 {
            return RGBSpectrum::default();
        }
        if (reflect(wo) - wi).norm() > REFLECT_TOLERANCE {
            return RGBSpectrum::default();
        }

        self.reflectance
    }

    fn sample(&self, wo: &Vector3f, _sampler: &mut dyn Sampler) -> BSDFSampleRecord {
        if wo.z <= 0.0 {
            return BSDFSampleRecord::default();
        }

        BSDFSampleRecord::new(reflect(wo), self.reflectance, 1.0, LobeType::Delta)
    }

    fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }

    fn lobe_type(&self) -> LobeType {
        LobeType::Delta
    }
}
