// Copyright @yucwang 2026

use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::{Shape, ShapeHit};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f, FOUR_PI, INV_PI, INV_TWO_PI};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
    flip_normals: bool,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius, flip_normals: false }
    }

    // Normals point inwards; useful for enclosing emitters.
    pub fn with_flipped_normals(mut self) -> Self {
        self.flip_normals = true;
        self
    }

    fn normal_at(&self, p: &Vector3f) -> Vector3f {
        let n = (p - self.center) / self.radius;
        if self.flip_normals { -n } else { n }
    }

    fn solve(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let half_b = oc.dot(&d);
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = half_b * half_b - c;
        if disc < 0.0 {
            return None;
        }

        let sqrt_disc = disc.sqrt();
        let t0 = -half_b - sqrt_disc;
        let t1 = -half_b + sqrt_disc;
        if ray.test_segment(t0) {
            Some(t0)
        } else if ray.test_segment(t1) {
            Some(t1)
        } else {
            None
        }
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let t = self.solve(ray)?;
        let local = (ray.at(t) - self.center) / self.radius;
        let phi = local.z.atan2(local.x);
        let u = (phi * INV_TWO_PI).rem_euclid(1.0);
        let v = local.y.max(-1.0).min(1.0).acos() * INV_PI;
        Some(ShapeHit::new(t, 0, Vector2f::new(u, v)))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.solve(ray).is_some()
    }

    fn fill_intersection(&self, ray: &Ray3f, hit: &ShapeHit) -> SurfaceIntersection {
        // Re-project onto the surface to limit floating point drift.
        let dir = (ray.at(hit.t) - self.center).normalize();
        let p = self.center + dir * self.radius;
        let n = self.normal_at(&p);
        SurfaceIntersection::new(p, n, n, hit.uv, hit.t)
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let dir = sample_uniform_sphere(u);
        let p = self.center + dir * self.radius;
        let n = self.normal_at(&p);
        let intersection = SurfaceIntersection::new(p, n, n, *u, 0.0);
        SurfaceSampleRecord::new(intersection, 1.0 / self.surface_area())
    }

    fn surface_area(&self) -> Float {
        FOUR_PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::Sphere;
    use crate::core::shape::Shape;
    use crate::math::constants::{Vector2f, Vector3f};
    use crate::math::ray::Ray3f;

    #[test]
    fn test_sphere_outside_hit() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, -5.0), 1.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("expected hit");
        assert!((hit.t - 4.0).abs() < 1e-4);
        let its = sphere.fill_intersection(&ray, &hit);
        assert!((its.geo_normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-4);
    }

    #[test]
    fn test_sphere_inside_hit_with_flipped_normals() {
        let sphere = Sphere::new(Vector3f::zeros(), 2.0).with_flipped_normals();
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&ray).expect("expected hit");
        assert!((hit.t - 2.0).abs() < 1e-4);
        let its = sphere.fill_intersection(&ray, &hit);
        assert!((its.geo_normal() - Vector3f::new(-1.0, 0.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn test_sphere_miss_and_sample() {
        let sphere = Sphere::new(Vector3f::zeros(), 1.0);
        let ray = Ray3f::new(Vector3f::new(0.0, 2.0, 0.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        assert!(!sphere.ray_intersection_t(&ray));

        let rec = sphere.sample(&Vector2f::new(0.1, 0.6));
        assert!((rec.intersection().p().norm() - 1.0).abs() < 1e-5);
        assert!((rec.pdf() * sphere.surface_area() - 1.0).abs() < 1e-5);
    }
}
