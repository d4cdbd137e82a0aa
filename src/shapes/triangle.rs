// Copyright @yucwang 2023

use crate::core::interaction::{ SurfaceIntersection, SurfaceSampleRecord };
use crate::core::shape::{ Shape, ShapeHit };
use crate::math::aabb::AABB;
use crate::math::constants::{ EPSILON, Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

pub struct Triangle {
    p0: Vector3f,
    p1: Vector3f,
    p2: Vector3f,
    normal: Vector3f,
    area: Float,
}

impl Triangle {
    pub fn new(new_p0: Vector3f, new_p1: Vector3f, new_p2: Vector3f) -> Self {
        let cross = (new_p1 - new_p0).cross(&(new_p2 - new_p0));
        let len = cross.norm();
        let normal = if len > 0.0 { cross / len } else { Vector3f::zeros() };

        Triangle { p0: new_p0, p1: new_p1, p2: new_p2, normal, area: 0.5 * len }
    }

    pub fn vertices(&self) -> (Vector3f, Vector3f, Vector3f) {
        (self.p0, self.p1, self.p2)
    }

    pub fn geometric_normal(&self) -> Vector3f {
        self.normal
    }

    // Moller-Trumbore; returns t and the barycentrics of p1 and p2.
    fn intersect(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        let edge0 = self.p1 - self.p0;
        let edge1 = self.p2 - self.p0;
        let pvec = ray.dir().cross(&edge1);
        let det = edge0.dot(&pvec);
        if det.abs() < EPSILON * EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - self.p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if b1 < 0.0 || b1 > 1.0 {
            return None;
        }

        let qvec = tvec.cross(&edge0);
        let b2 = ray.dir().dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = edge1.dot(&qvec) * inv_det;
        if !ray.test_segment(t) {
            return None;
        }

        Some((t, Vector2f::new(b1, b2)))
    }
}

impl Shape for Triangle {
    fn bounding_box(&self) -> AABB {
        let mut bound = AABB::new(self.p0, self.p1);
        bound.expand_by_point(&self.p2);

        bound
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let (t, bary) = self.intersect(ray)?;
        Some(ShapeHit::new(t, 0, bary))
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect(ray).is_some()
    }

    fn fill_intersection(&self, _ray: &Ray3f, hit: &ShapeHit) -> SurfaceIntersection {
        let (b1, b2) = (hit.uv.x, hit.uv.y);
        let p = self.p0 * (1.0 - b1 - b2) + self.p1 * b1 + self.p2 * b2;
        SurfaceIntersection::new(p, self.normal, self.normal, hit.uv, hit.t)
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let bary = square_to_triangle(u);
        let p = self.p0 * bary.x + self.p1 * bary.y + self.p2 * bary.z;
        let interaction = SurfaceIntersection::new(p, self.normal, self.normal, Vector2f::new(bary.y, bary.z), 0.0);

        SurfaceSampleRecord::new(interaction, 1.0 / self.area)
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box1() {
        let p0 = Vector3f::new(1.0, 1.0, 1.0);
        let p1 = Vector3f::new(1.5, 4.0, -1.0);
        let p2 = Vector3f::new(-1.0, 2.0, 2.5);

        let triangle = Triangle::new(p0, p1, p2);
        let bounding_box = triangle.bounding_box();

        assert_eq!(bounding_box.p_min, Vector3f::new(-1.0, 1.0, -1.0));
        assert_eq!(bounding_box.p_max, Vector3f::new(1.5, 4.0, 2.5));
    }

    #[test]
    fn test_ray_intersection_t() {
        let triangle = Triangle::new(Vector3f::new(1.0, 1.0, 0.0),
                                     Vector3f::new(2.0, 2.0, 0.0),
                                     Vector3f::new(2.0, 1.0, 0.0));

        let ray1 = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None);
        let ray2 = Ray3f::new(Vector3f::new(1.5, 1.1, 3.0),
            Vector3f::new(0.0, 0.0, 1.0),
            None,
            None);
        let ray3 = Ray3f::new(Vector3f::new(1.5, 2.0, 3.0),
            Vector3f::new(0.0, 0.0, -1.0),
            None,
            None);

        assert_eq!(triangle.ray_intersection_t(&ray1), true);
        assert_eq!(triangle.ray_intersection_t(&ray2), false);
        assert_eq!(triangle.ray_intersection_t(&ray3), false);
    }

    #[test]
    fn test_fill_intersection_and_sample() {
        let triangle = Triangle::new(Vector3f::new(0.0, 0.0, 0.0),
                                     Vector3f::new(2.0, 0.0, 0.0),
                                     Vector3f::new(0.0, 2.0, 0.0));
        assert!((triangle.surface_area() - 2.0).abs() < 1e-6);

        let ray = Ray3f::new(Vector3f::new(0.5, 0.5, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = triangle.ray_intersection(&ray).expect("expected hit");
        let its = triangle.fill_intersection(&ray, &hit);
        assert!((its.p() - Vector3f::new(0.5, 0.5, 0.0)).norm() < 1e-5);
        assert!((its.geo_normal() - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);

        let rec = triangle.sample(&Vector2f::new(0.3, 0.8));
        let p = rec.intersection().p();
        assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 2.0 + 1e-5);
        assert!((rec.pdf() - 0.5).abs() < 1e-6);
    }
}
