// Copyright @yucwang 2026

use crate::core::bsdf::BSDF;
use crate::core::bvh::BVH;
use crate::core::emitter::{Emitter, EmitterSample};
use crate::core::interaction::SurfaceIntersection;
use crate::core::sampler::Sampler;
use crate::core::shape::Shape;
use crate::emitters::area::AreaEmitter;
use crate::emitters::envmap::EnvironmentEmitter;
use crate::math::aabb::{BoundingSphere, AABB};
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use std::sync::Arc;

pub struct SceneObject {
    pub shape: Arc<dyn Shape>,
    pub material: Arc<dyn BSDF>,
    // Index into the scene's emitter list.
    pub emitter: Option<usize>,
    pub name: Option<String>,
}

impl SceneObject {
    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    pub fn material(&self) -> &dyn BSDF {
        self.material.as_ref()
    }
}

/// Owns geometry, materials and emitters. Built single-threaded, then
/// frozen by `finish_initialization` and shared read-only while rendering.
pub struct Scene {
    objects: Vec<SceneObject>,
    emitters: Vec<Emitter>,
    env_emitter: Option<usize>,
    scene_bounds: AABB,
    bsphere: Option<BoundingSphere>,
    bvh: Option<BVH>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            emitters: Vec::new(),
            env_emitter: None,
            scene_bounds: AABB::default(),
            bsphere: None,
            bvh: None,
        }
    }

    /// Registers a shape. A shape whose bounds cannot be placed in the
    /// acceleration structure is dropped and `None` is returned. When
    /// `emission` is given the shape also becomes an area emitter.
    pub fn add_shape(&mut self,
                     shape: Arc<dyn Shape>,
                     material: Arc<dyn BSDF>,
                     emission: Option<RGBSpectrum>) -> Option<usize> {
        assert!(self.bvh.is_none(), "Scene::add_shape called after finish_initialization");

        let bbox = shape.bounding_box();
        if !bbox.is_valid() || !bbox.is_finite() {
            log::warn!("Dropping shape {}: invalid bounding box {:?}.", shape.name(), bbox);
            return None;
        }
        self.scene_bounds.expand_by_aabb(&bbox);

        let emitter = emission.map(|radiance| {
            self.emitters.push(Emitter::Area(AreaEmitter::from_shape(shape.clone(), radiance)));
            self.emitters.len() - 1
        });

        self.objects.push(SceneObject { shape, material, emitter, name: None });
        Some(self.objects.len() - 1)
    }

    pub fn add_named_shape(&mut self,
                           name: &str,
                           shape: Arc<dyn Shape>,
                           material: Arc<dyn BSDF>,
                           emission: Option<RGBSpectrum>) -> Option<usize> {
        let idx = self.add_shape(shape, material, emission)?;
        self.objects[idx].name = Some(name.to_string());
        Some(idx)
    }

    /// Appends an emitter. Environment emitters also take the single
    /// environment slot; a second one is rejected.
    pub fn add_emitter(&mut self, emitter: Emitter) -> Option<usize> {
        assert!(self.bvh.is_none(), "Scene::add_emitter called after finish_initialization");

        if emitter.is_environment() && self.env_emitter.is_some() {
            log::warn!("Scene already has an environment emitter, ignoring the new one.");
            return None;
        }

        let idx = self.emitters.len();
        if emitter.is_environment() {
            self.env_emitter = Some(idx);
        }
        self.emitters.push(emitter);
        Some(idx)
    }

    pub fn add_env_emitter(&mut self, emitter: EnvironmentEmitter) -> Option<usize> {
        self.add_emitter(Emitter::Environment(emitter))
    }

    pub fn finish_initialization(&mut self) {
        assert!(self.bvh.is_none(), "Scene::finish_initialization must only be called once");

        let bsphere = self.scene_bounds.bounding_sphere();
        for (idx, emitter) in self.emitters.iter_mut().enumerate() {
            emitter.set_bounding_sphere(&bsphere);
            log::debug!("Emitter {}: {}.", idx, emitter.name());
        }
        self.bsphere = Some(bsphere);

        let prim_bounds = self.objects.iter().map(|obj| obj.shape.bounding_box()).collect();
        self.bvh = Some(BVH::new(prim_bounds));

        log::info!("Scene ready: {} shapes, {} emitters (environment: {}), bounding sphere center = {:?}, radius = {}.",
                   self.objects.len(),
                   self.emitters.len(),
                   self.env_emitter.is_some(),
                   bsphere.center.as_slice(),
                   bsphere.radius);
    }

    fn committed_bvh(&self) -> &BVH {
        self.bvh.as_ref().expect("Scene queried before finish_initialization")
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (idx, hit) = self.committed_bvh().ray_intersection(ray, |idx, r| {
            self.objects[idx].shape.ray_intersection(r)
        })?;

        let its = self.objects[idx].shape.fill_intersection(ray, &hit);
        Some(its.with_object_index(Some(idx)))
    }

    // Occlusion only.
    pub fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.committed_bvh().ray_intersection_t(ray, |idx, r| {
            self.objects[idx].shape.ray_intersection_t(r)
        })
    }

    /// Uniform discrete choice among all emitters.
    pub fn random_emitter(&self, u: Float) -> Option<(usize, &Emitter)> {
        let n = self.emitters.len();
        if n == 0 {
            return None;
        }
        let idx = ((u * n as Float).max(0.0) as usize).min(n - 1);
        Some((idx, &self.emitters[idx]))
    }

    pub fn emitter_pdf(&self) -> Float {
        if self.emitters.is_empty() {
            0.0
        } else {
            1.0 / self.emitters.len() as Float
        }
    }

    /// Picks one emitter and samples it. The returned value and `rec.pdf`
    /// both account for the discrete selection probability.
    pub fn sample_emitter(&self,
                          its: &SurfaceIntersection,
                          sampler: &mut dyn Sampler,
                          rec: &mut EmitterSample) -> RGBSpectrum {
        *rec = EmitterSample::new(its.p());
        let (idx, emitter) = match self.random_emitter(sampler.next_1d()) {
            Some(choice) => choice,
            None => return RGBSpectrum::zero(),
        };

        let value = emitter.sample(rec, sampler);
        rec.emitter = Some(idx);
        if rec.pdf <= 0.0 {
            return RGBSpectrum::zero();
        }

        let sel_pdf = self.emitter_pdf();
        rec.pdf *= sel_pdf;
        value / sel_pdf
    }

    pub fn eval_env_emitter(&self, ray: &Ray3f) -> RGBSpectrum {
        match self.env_emitter() {
            Some(env) => env.eval(&EmitterSample::from_direction(ray.origin(), ray.dir())),
            None => RGBSpectrum::zero(),
        }
    }

    pub fn env_emitter(&self) -> Option<&Emitter> {
        self.env_emitter.map(|idx| &self.emitters[idx])
    }

    pub fn env_emitter_index(&self) -> Option<usize> {
        self.env_emitter
    }

    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.bsphere
    }

    pub fn bounding_box(&self) -> &AABB {
        &self.scene_bounds
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, idx: usize) -> Option<&SceneObject> {
        self.objects.get(idx)
    }

    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    pub fn emitter(&self, idx: usize) -> Option<&Emitter> {
        self.emitters.get(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::Scene;
    use crate::core::emitter::{Emitter, EmitterSample};
    use crate::core::interaction::SurfaceIntersection;
    use crate::core::sampler::IndependentSampler;
    use crate::emitters::envmap::EnvironmentEmitter;
    use crate::emitters::point::PointEmitter;
    use crate::materials::lambertian_diffuse::LambertianDiffuseBSDF;
    use crate::math::bitmap::Bitmap;
    use crate::math::constants::{Float, Vector2f, Vector3f, FLOAT_MAX};
    use crate::math::ray::Ray3f;
    use crate::math::spectrum::RGBSpectrum;
    use crate::shapes::rectangle::Rectangle;
    use crate::shapes::sphere::Sphere;
    use std::sync::Arc;

    fn diffuse() -> Arc<LambertianDiffuseBSDF> {
        Arc::new(LambertianDiffuseBSDF::new(RGBSpectrum::splat(0.5)))
    }

    fn point_light(z: Float) -> Emitter {
        Emitter::Point(PointEmitter::new(Vector3f::new(0.0, 0.0, z), RGBSpectrum::splat(1.0)))
    }

    fn surface_at_origin() -> SurfaceIntersection {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        SurfaceIntersection::new(Vector3f::zeros(), n, n, Vector2f::zeros(), 0.0)
    }

    #[test]
    fn test_nearest_hit_and_occlusion() {
        let mut scene = Scene::new();
        let near = scene.add_shape(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, -3.0), 1.0)), diffuse(), None);
        let far = scene.add_shape(Arc::new(Sphere::new(Vector3f::new(0.0, 0.0, -8.0), 1.0)), diffuse(), None);
        assert_eq!((near, far), (Some(0), Some(1)));
        scene.finish_initialization();

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let its = scene.ray_intersection(&ray).expect("expected hit");
        assert_eq!(its.object_index(), Some(0));
        assert!((its.t() - 2.0).abs() < 1e-4);
        assert!(scene.ray_intersection_t(&ray));

        let short = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, Some(1.5));
        assert!(!scene.ray_intersection_t(&short));
        let away = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 1.0, 0.0), None, None);
        assert!(scene.ray_intersection(&away).is_none());

        let bsphere = scene.bounding_sphere().expect("finished scene has a bounding sphere");
        assert!((bsphere.center - Vector3f::new(0.0, 0.0, -5.5)).norm() < 1e-5);
    }

    #[test]
    fn test_invalid_shape_is_dropped() {
        let mut scene = Scene::new();
        let bad = scene.add_shape(Arc::new(Sphere::new(Vector3f::new(FLOAT_MAX, 0.0, 0.0) * 2.0, 1.0)),
                                  diffuse(), None);
        assert_eq!(bad, None);
        assert!(scene.objects().is_empty());
        scene.finish_initialization();
    }

    #[test]
    fn test_random_emitter_selection() {
        let mut scene = Scene::new();
        for i in 0..4 {
            scene.add_emitter(point_light(i as Float + 1.0));
        }
        scene.finish_initialization();

        assert_eq!(scene.emitter_pdf(), 0.25);
        for step in 0..100 {
            let u = step as Float / 100.0;
            let (idx, _) = scene.random_emitter(u).expect("emitters exist");
            assert_eq!(idx, ((u * 4.0) as usize).min(3));
        }
        assert_eq!(scene.random_emitter(0.999999).map(|(idx, _)| idx), Some(3));
    }

    #[test]
    fn test_zero_light_scene() {
        let mut scene = Scene::new();
        scene.add_shape(Arc::new(Rectangle::xy_square(Vector3f::zeros(), 1.0)), diffuse(), None);
        scene.finish_initialization();

        assert!(scene.random_emitter(0.5).is_none());
        assert_eq!(scene.emitter_pdf(), 0.0);

        let its = surface_at_origin();
        let mut sampler = IndependentSampler::new(0);
        let mut rec = EmitterSample::new(its.p());
        assert!(scene.sample_emitter(&its, &mut sampler, &mut rec).is_black());
        assert_eq!(rec.pdf, 0.0);

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(scene.eval_env_emitter(&ray).is_black());
    }

    #[test]
    fn test_sample_emitter_includes_selection_pdf() {
        let mut scene = Scene::new();
        scene.add_emitter(point_light(1.0));
        scene.add_emitter(point_light(2.0));
        scene.finish_initialization();

        let its = surface_at_origin();
        let mut sampler = IndependentSampler::new(3);
        for _ in 0..16 {
            let mut rec = EmitterSample::new(its.p());
            let value = scene.sample_emitter(&its, &mut sampler, &mut rec);
            assert_eq!(rec.pdf, 0.5);
            let dist = match rec.emitter {
                Some(0) => 1.0,
                Some(1) => 2.0,
                other => panic!("unexpected emitter {:?}", other),
            };
            assert!((value[0] - 2.0 / (dist * dist)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_single_environment_slot() {
        let mut scene = Scene::new();
        let probe = Bitmap::filled(8, 4, RGBSpectrum::splat(0.25));
        let first = scene.add_env_emitter(EnvironmentEmitter::new(probe.clone(), 1.0).expect("probe"));
        let second = scene.add_emitter(Emitter::Environment(EnvironmentEmitter::new(probe, 1.0).expect("probe")));
        assert_eq!(first, Some(0));
        assert_eq!(second, None);
        assert_eq!(scene.emitters().len(), 1);
        assert_eq!(scene.env_emitter_index(), Some(0));
        scene.finish_initialization();

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 1.0, 0.0), None, None);
        assert!((scene.eval_env_emitter(&ray)[2] - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_emissive_shape_links_emitter() {
        let mut scene = Scene::new();
        let idx = scene.add_shape(Arc::new(Rectangle::xy_square(Vector3f::zeros(), 1.0)),
                                  diffuse(), Some(RGBSpectrum::splat(2.0))).expect("valid shape");
        assert_eq!(scene.object(idx).and_then(|obj| obj.emitter), Some(0));
        assert!(matches!(scene.emitter(0), Some(Emitter::Area(_))));
    }

    #[test]
    #[should_panic]
    fn test_query_before_finish_panics() {
        let scene = Scene::new();
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        scene.ray_intersection_t(&ray);
    }

    #[test]
    #[should_panic]
    fn test_double_finish_panics() {
        let mut scene = Scene::new();
        scene.finish_initialization();
        scene.finish_initialization();
    }
}
