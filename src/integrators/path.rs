// Copyright @yucwang 2026

use crate::core::bsdf::{LobeType, Measure, BSDF};
use crate::core::emitter::{Emitter, EmitterSample};
use crate::core::integrator::Integrator;
use crate::core::interaction::SurfaceIntersection;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

/// Unidirectional path tracer with next-event estimation. Direct light is
/// gathered from one uniformly chosen emitter per vertex, combining light
/// and BSDF sampling with the power heuristic.
pub struct PathIntegrator {
    pub max_depth: u32,
    pub rr_depth: u32,
    pub samples_per_pixel: u32,
}

// Per-bounce state. Each iteration builds a new record from the previous one.
#[derive(Clone, Copy)]
struct PathState {
    ray: Ray3f,
    radiance: RGBSpectrum,
    throughput: RGBSpectrum,
    bounce: u32,
    specular_bounce: bool,
}

impl PathState {
    fn start(ray: Ray3f) -> Self {
        Self {
            ray,
            radiance: RGBSpectrum::zero(),
            throughput: RGBSpectrum::one(),
            bounce: 0,
            specular_bounce: false,
        }
    }

    fn add(self, contribution: RGBSpectrum) -> Self {
        Self { radiance: self.radiance + self.throughput * contribution, ..self }
    }
}

pub fn power_heuristic(pdf_a: Float, pdf_b: Float) -> Float {
    let a2 = pdf_a * pdf_a;
    let b2 = pdf_b * pdf_b;
    if a2 + b2 <= 0.0 {
        0.0
    } else {
        a2 / (a2 + b2)
    }
}

impl PathIntegrator {
    pub fn new(max_depth: u32, rr_depth: u32, samples_per_pixel: u32) -> Self {
        Self { max_depth, rr_depth, samples_per_pixel }
    }

    // Radiance emitted towards the ray origin by whatever the ray found.
    fn emitted(scene: &Scene, ray: &Ray3f, its: Option<&SurfaceIntersection>) -> RGBSpectrum {
        match its {
            Some(its) => {
                let emitter = its.object_index()
                    .and_then(|idx| scene.object(idx))
                    .and_then(|obj| obj.emitter)
                    .and_then(|idx| scene.emitter(idx));
                match emitter {
                    Some(emitter) => emitter.eval(&EmitterSample::from_hit(ray.origin(), its.p(), its.geo_normal())),
                    None => RGBSpectrum::zero(),
                }
            }
            None => scene.eval_env_emitter(ray),
        }
    }

    /// One-sample MIS estimate of the light arriving from `emitter` at `its`
    /// and scattered towards `wo` (local frame). Already divided by the
    /// emitter selection probability.
    pub fn estimate_direct(scene: &Scene,
                           sampler: &mut dyn Sampler,
                           its: &SurfaceIntersection,
                           bsdf: &dyn BSDF,
                           wo: &Vector3f,
                           emitter_idx: usize,
                           emitter: &Emitter) -> RGBSpectrum {
        let sel_pdf = scene.emitter_pdf();
        if sel_pdf <= 0.0 {
            return RGBSpectrum::zero();
        }
        let mut result = RGBSpectrum::zero();

        // Light sampling.
        let mut rec = EmitterSample::new(its.p());
        let li = emitter.sample(&mut rec, sampler);
        if rec.pdf > 0.0 && !li.is_black() {
            let wi = its.to_local(&rec.wi);
            let f = bsdf.eval(wo, &wi, Measure::SolidAngle);
            if !f.is_black() && !scene.ray_intersection_t(&rec.shadow_ray) {
                let weight = if emitter.is_delta() {
                    1.0
                } else {
                    power_heuristic(rec.pdf * sel_pdf, bsdf.pdf(wo, &wi))
                };
                result += f * li * weight;
            }
        }

        // BSDF sampling; a delta emitter can never be hit this way.
        if !emitter.is_delta() {
            let bs = bsdf.sample(wo, sampler);
            if bs.is_valid() {
                let wi_world = its.to_world(&bs.wi);
                let ray = its.spawn_ray(&wi_world);
                let query = match scene.ray_intersection(&ray) {
                    Some(hit) => {
                        let hit_emitter = hit.object_index()
                            .and_then(|idx| scene.object(idx))
                            .and_then(|obj| obj.emitter);
                        if hit_emitter == Some(emitter_idx) {
                            Some(EmitterSample::from_hit(its.p(), hit.p(), hit.geo_normal()))
                        } else {
                            None
                        }
                    }
                    None if scene.env_emitter_index() == Some(emitter_idx) => {
                        Some(EmitterSample::from_direction(its.p(), wi_world))
                    }
                    None => None,
                };

                if let Some(query) = query {
                    let le = emitter.eval(&query);
                    if !le.is_black() {
                        let weight = if bs.lobe == LobeType::Delta {
                            1.0
                        } else {
                            power_heuristic(bs.pdf, emitter.pdf(&query) * sel_pdf)
                        };
                        result += bs.value * le * weight;
                    }
                }
            }
        }

        result / sel_pdf
    }
}

impl Integrator for PathIntegrator {
    fn li(&self, scene: &Scene, sampler: &mut dyn Sampler, ray: &Ray3f) -> RGBSpectrum {
        let mut state = PathState::start(*ray);

        loop {
            let its = scene.ray_intersection(&state.ray);
            if state.bounce == 0 || state.specular_bounce {
                state = state.add(Self::emitted(scene, &state.ray, its.as_ref()));
            }

            let its = match its {
                Some(its) if state.bounce < self.max_depth => its,
                _ => break,
            };
            let object = match its.object_index().and_then(|idx| scene.object(idx)) {
                Some(object) => object,
                None => break,
            };
            let bsdf = object.material();
            let wo = its.to_local(&-state.ray.dir());

            if bsdf.lobe_type() != LobeType::Delta {
                if let Some((emitter_idx, emitter)) = scene.random_emitter(sampler.next_1d()) {
                    let direct = Self::estimate_direct(scene, sampler, &its, bsdf, &wo, emitter_idx, emitter);
                    state = state.add(direct);
                }
            }

            let bs = bsdf.sample(&wo, sampler);
            if !bs.is_valid() {
                break;
            }
            let mut throughput = state.throughput * bs.value;

            if state.bounce > self.rr_depth {
                let q = 1.0 - throughput.max_value().min(0.99);
                if sampler.next_1d() < q {
                    break;
                }
                throughput /= 1.0 - q;
            }

            state = PathState {
                ray: its.spawn_ray(&its.to_world(&bs.wi)),
                throughput,
                bounce: state.bounce + 1,
                specular_bounce: bs.lobe == LobeType::Delta,
                ..state
            };
        }

        state.radiance
    }

    fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }
}
