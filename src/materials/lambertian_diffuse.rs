// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSampleRecord, BSDFValue, LobeType, Measure, BSDF};
use crate::core::sampler::Sampler;
use crate::math::constants::{ Float, INV_PI, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

pub struct LambertianDiffuseBSDF {
    color: RGBSpectrum
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f, measure: Measure) -> BSDFValue {
        if measure != Measure::SolidAngle || wo.z <= 0.0 || wi.z <= 0.0 {
            return RGBSpectrum::default();
        }

        self.color * (INV_PI * wi.z)
    }

    fn sample(&self, wo: &Vector3f, sampler: &mut dyn Sampler) -> BSDFSampleRecord {
        if wo.z <= 0.0 {
            return BSDFSampleRecord::default();
        }

        let wi = sample_cosine_hemisphere(&sampler.next_2d());
        let pdf = sample_cosine_hemisphere_pdf(wi.z);
        if pdf <= 0.0 {
            return BSDFSampleRecord::default();
        }

        // f * cos / pdf collapses to the albedo for cosine-weighted sampling.
        BSDFSampleRecord::new(wi, self.color, pdf, LobeType::Smooth)
    }

    fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if wo.z <= 0.0 || wi.z <= 0.0 {
            return 0.0;
        }

        sample_cosine_hemisphere_pdf(wi.z)
    }

    fn lobe_type(&self) -> LobeType {
        LobeType::Smooth
    }
}

impl LambertianDiffuseBSDF {
    pub fn new(rgb: RGBSpectrum) -> Self {
        Self {
            color: rgb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LambertianDiffuseBSDF;
    use crate::core::bsdf::{Measure, BSDF};
    use crate::core::sampler::IndependentSampler;
    use crate::math::constants::{Float, Vector3f, INV_PI};
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_eval_is_cosine_weighted() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5));
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.6, 0.0, 0.8);
        let f = bsdf.eval(&wo, &wi, Measure::SolidAngle);
        assert!((f[0] - 0.5 * INV_PI * 0.8).abs() < 1e-6);
        assert!(bsdf.eval(&wo, &wi, Measure::Discrete).is_black());
        assert!(bsdf.eval(&wo, &Vector3f::new(0.0, 0.0, -1.0), Measure::SolidAngle).is_black());
    }

    #[test]
    fn test_sample_matches_eval_over_pdf() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::new(0.2, 0.4, 0.6));
        let wo = Vector3f::new(0.3, 0.1, 0.9).normalize();
        let mut sampler = IndependentSampler::new(11);
        for _ in 0..64 {
            let rec = bsdf.sample(&wo, &mut sampler);
            assert!(rec.pdf > 0.0);
            assert!((rec.pdf - bsdf.pdf(&wo, &rec.wi)).abs() < 1e-5);
            let expected = bsdf.eval(&wo, &rec.wi, Measure::SolidAngle) / rec.pdf;
            for c in 0..3 {
                assert!((expected[c] - rec.value[c]).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_below_horizon_gives_no_sample() {
        let bsdf = LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5));
        let mut sampler = IndependentSampler::new(1);
        let rec = bsdf.sample(&Vector3f::new(0.0, 0.0, -1.0), &mut sampler);
        assert!(!rec.is_valid());
        let pdf: Float = bsdf.pdf(&Vector3f::new(0.0, 0.0, -1.0), &Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(pdf, 0.0);
    }
}
