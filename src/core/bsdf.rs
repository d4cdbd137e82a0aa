// Copyright @yucwang 2023

use crate::core::sampler::Sampler;
use crate::math::constants::{ Float, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Definitions of types used in BSDF sampling and eval
// processes. All directions live in the local shading frame.
pub type BSDFValue = RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobeType {
    Smooth,
    Delta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    SolidAngle,
    Discrete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    // f * |cos(theta_i)| / pdf
    pub value: BSDFValue,
    pub pdf: Float,
    pub lobe: LobeType,
}

pub trait BSDF: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
    // Returns f * |cos(theta_i)|.
    fn eval(&self, wo: &Vector3f, wi: &Vector3f, measure: Measure) -> BSDFValue;
    fn sample(&self, wo: &Vector3f, sampler: &mut dyn Sampler) -> BSDFSampleRecord;
    fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float;
    fn lobe_type(&self) -> LobeType;
}

impl Default for BSDFSampleRecord {
    fn default() -> Self {
        Self {
            wi: Vector3f::zeros(),
            value: RGBSpectrum::default(),
            pdf: 0.0,
            lobe: LobeType::Smooth,
        }
    }
}

impl BSDFSampleRecord {
    pub fn new(wi: Vector3f, value: BSDFValue, pdf: Float, lobe: LobeType) -> Self {
        Self { wi, value, pdf, lobe }
    }

    pub fn is_valid(&self) -> bool {
        self.pdf > 0.0 && !self.value.is_black()
    }
}
