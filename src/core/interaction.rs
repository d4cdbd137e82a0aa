// Copyright @yucwang 2023

use crate::math::constants::{ Float, RAY_EPSILON, Vector2f, Vector3f };
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;

/// Result of a nearest-hit query. Lives for a single bounce.
#[derive(Debug, Clone)]
pub struct SurfaceIntersection {
    p: Vector3f,
    geo_normal: Vector3f,
    sh_frame: Frame,
    uv: Vector2f,
    t: Float,
    object_index: Option<usize>,
}

pub struct SurfaceSampleRecord {
    intersection: SurfaceIntersection,
    pdf: Float,
}

impl SurfaceIntersection {
    pub fn new(new_p: Vector3f,
               new_geo_normal: Vector3f,
               new_sh_normal: Vector3f,
               new_uv: Vector2f,
               new_t: Float) -> Self {
        Self { p: new_p, geo_normal: new_geo_normal, sh_frame: Frame::from_normal(&new_sh_normal),
               uv: new_uv, t: new_t, object_index: None }
    }

    pub fn t(&self) -> Float {
        self.t
    }

    pub fn p(&self) -> Vector3f {
        self.p
    }

    pub fn uv(&self) -> Vector2f {
        self.uv
    }

    pub fn geo_normal(&self) -> Vector3f {
        self.geo_normal
    }

    pub fn sh_normal(&self) -> Vector3f {
        self.sh_frame.n()
    }

    pub fn sh_frame(&self) -> &Frame {
        &self.sh_frame
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_local(v)
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.sh_frame.to_world(v)
    }

    pub fn object_index(&self) -> Option<usize> {
        self.object_index
    }

    pub fn with_object_index(mut self, object_index: Option<usize>) -> Self {
        self.object_index = object_index;
        self
    }

    // Secondary ray leaving the surface; the origin is pushed off the
    // surface on the side the direction points to.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray3f {
        let side = if self.geo_normal.dot(d) >= 0.0 { 1.0 } else { -1.0 };
        let origin = self.p + self.geo_normal * (RAY_EPSILON * side);
        Ray3f::new(origin, *d, Some(0.0), None)
    }
}

impl SurfaceSampleRecord {
    pub fn new(new_intersection: SurfaceIntersection,
               new_pdf: Float) -> Self {
        Self { intersection: new_intersection, pdf: new_pdf }
    }

    pub fn intersection(&self) -> &SurfaceIntersection {
        &self.intersection
    }

    pub fn pdf(&self) -> Float {
        self.pdf
    }

    pub fn set_pdf(&mut self, pdf: Float) {
        self.pdf = pdf;
    }
}
