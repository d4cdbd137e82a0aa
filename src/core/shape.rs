// Copyright @yucwang 2023

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f };
use crate::math::ray::Ray3f;

/// Raw output of the geometric query: hit distance, primitive id inside the
/// shape and the primitive's parametric (or barycentric) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub t: Float,
    pub prim_index: usize,
    pub uv: Vector2f,
}

impl ShapeHit {
    pub fn new(t: Float, prim_index: usize, uv: Vector2f) -> Self {
        Self { t, prim_index, uv }
    }
}

pub trait Shape: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
    fn bounding_box(&self) -> AABB;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit>;
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }
    // Turns the backend hit into a full surface record (position, normals, frame).
    fn fill_intersection(&self, ray: &Ray3f, hit: &ShapeHit) -> SurfaceIntersection;
    // Uniform sampling by area; the returned pdf is in area measure.
    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord;
    fn surface_area(&self) -> Float;
}
