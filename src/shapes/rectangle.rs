// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::{Shape, ShapeHit};
use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

/// Parallelogram spanned by `edge_u` and `edge_v` from `origin`. The front
/// face is the one `edge_u x edge_v` points to.
pub struct Rectangle {
    origin: Vector3f,
    edge_u: Vector3f,
    edge_v: Vector3f,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Rectangle {
    pub fn new(origin: Vector3f, edge_u: Vector3f, edge_v: Vector3f) -> Self {
        let cross = edge_u.cross(&edge_v);
        let area = cross.norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let normal = if area > 0.0 { cross / area } else { Vector3f::zeros() };

        Self { origin, edge_u, edge_v, normal, area, inv_area }
    }

    // Axis-aligned square of side `2 * half_size` centred at `center`, facing +z.
    pub fn xy_square(center: Vector3f, half_size: Float) -> Self {
        let origin = center - Vector3f::new(half_size, half_size, 0.0);
        Self::new(origin,
                  Vector3f::new(2.0 * half_size, 0.0, 0.0),
                  Vector3f::new(0.0, 2.0 * half_size, 0.0))
    }

    fn intersect_plane(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        if self.area <= 0.0 {
            return None;
        }
        let n_dot_dir = self.normal.dot(&ray.dir());
        if n_dot_dir.abs() < EPSILON {
            return None;
        }

        let t = (self.origin - ray.origin()).dot(&self.normal) / n_dot_dir;
        if !ray.test_segment(t) {
            return None;
        }

        // Coordinates along the (possibly skewed) edges.
        let rel = ray.at(t) - self.origin;
        let u = rel.cross(&self.edge_v).dot(&self.normal) * self.inv_area;
        let v = self.edge_u.cross(&rel).dot(&self.normal) * self.inv_area;
        if u < 0.0 || u > 1.0 || v < 0.0 || v > 1.0 {
            return None;
        }

        Some((t, Vector2f::new(u, v)))
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::new(self.origin, self.origin + self.edge_u);
        bbox.expand_by_point(&(self.origin + self.edge_v));
        bbox.expand_by_point(&(self.origin + self.edge_u + self.edge_v));
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let (t, uv) = self.intersect_plane(ray)?;
        Some(ShapeHit::new(t, 0, uv))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_plane(ray).is_some()
    }

    fn fill_intersection(&self, _ray: &Ray3f, hit: &ShapeHit) -> SurfaceIntersection {
        let p = self.origin + self.edge_u * hit.uv.x + self.edge_v * hit.uv.y;
        SurfaceIntersection::new(p, self.normal, self.normal, hit.uv, hit.t)
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let p = self.origin + self.edge_u * u.x + self.edge_v * u.y;
        let intersection = SurfaceIntersection::new(p, self.normal, self.normal, *u, 0.0);
        SurfaceSampleRecord::new(intersection, self.inv_area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}
