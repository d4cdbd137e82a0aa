// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::ray::Ray3f;
use crate::core::shape::ShapeHit;

const MAX_LEAF_SIZE: usize = 2;

enum BVHNode {
    Leaf { bounds: AABB, start: usize, count: usize },
    Interior { bounds: AABB, left: usize, right: usize },
}

impl BVHNode {
    fn bounds(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bounds, .. } => bounds,
            BVHNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// Bounding volume hierarchy over opaque primitive ids. It only knows the
/// primitives' boxes; exact tests are delegated to the caller.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    prim_bounds: Vec<AABB>,
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>) -> Self {
        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * prim_bounds.len()),
            indices: (0..prim_bounds.len()).collect(),
            prim_bounds,
        };

        if !bvh.indices.is_empty() {
            let len = bvh.indices.len();
            bvh.build(0, len);
        }

        bvh
    }

    pub fn len(&self) -> usize {
        self.prim_bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prim_bounds.is_empty()
    }

    // Median split on the axis of largest centroid extent. Returns the index
    // of the node created for `indices[start..end]`.
    fn build(&mut self, start: usize, end: usize) -> usize {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&self.prim_bounds[idx]);
            centroid_bounds.expand_by_point(&self.prim_bounds[idx].center());
        }

        let count = end - start;
        let axis = centroid_bounds.max_extent();
        let flat = centroid_bounds.diagonal()[axis] <= 0.0;
        if count <= MAX_LEAF_SIZE || flat {
            self.nodes.push(BVHNode::Leaf { bounds, start, count });
            return self.nodes.len() - 1;
        }

        let mid = start + count / 2;
        let prim_bounds = &self.prim_bounds;
        self.indices[start..end].select_nth_unstable_by(mid - start, |a, b| {
            let ca = prim_bounds[*a].center()[axis];
            let cb = prim_bounds[*b].center()[axis];
            ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
        });

        // Reserve the slot so children land after their parent.
        let node_idx = self.nodes.len();
        self.nodes.push(BVHNode::Leaf { bounds, start, count: 0 });
        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[node_idx] = BVHNode::Interior { bounds, left, right };
        node_idx
    }

    /// Nearest hit. `hit_fn` is handed the current ray, whose `max_t` shrinks
    /// to the closest distance found so far.
    pub fn ray_intersection<F>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, ShapeHit)>
    where
        F: FnMut(usize, &Ray3f) -> Option<ShapeHit>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut ray = *ray;
        let mut closest: Option<(usize, ShapeHit)> = None;
        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds().ray_intersect(&ray) {
                continue;
            }

            match node {
                BVHNode::Leaf { start, count, .. } => {
                    for &prim_idx in &self.indices[*start..*start + *count] {
                        if let Some(hit) = hit_fn(prim_idx, &ray) {
                            if hit.t < ray.max_t {
                                ray.max_t = hit.t;
                                closest = Some((prim_idx, hit));
                            }
                        }
                    }
                }
                BVHNode::Interior { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        closest
    }

    /// Any hit; returns as soon as `hit_fn` reports an occluder.
    pub fn ray_intersection_t<F>(&self, ray: &Ray3f, mut hit_fn: F) -> bool
    where
        F: FnMut(usize, &Ray3f) -> bool,
    {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds().ray_intersect(ray) {
                continue;
            }

            match node {
                BVHNode::Leaf { start, count, .. } => {
                    if self.indices[*start..*start + *count].iter().any(|&idx| hit_fn(idx, ray)) {
                        return true;
                    }
                }
                BVHNode::Interior { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::BVH;
    use crate::core::shape::{Shape, ShapeHit};
    use crate::math::constants::{Float, Vector3f};
    use crate::math::ray::Ray3f;
    use crate::core::rng::LcgRng;
    use crate::shapes::sphere::Sphere;

    fn nearest_of<I>(hits: I) -> Option<(usize, ShapeHit)>
    where
        I: IntoIterator<Item = (usize, ShapeHit)>,
    {
        hits.into_iter().fold(None, |best: Option<(usize, ShapeHit)>, (idx, hit)| {
            match best {
                Some((_, b)) if b.t <= hit.t => best,
                _ => Some((idx, hit)),
            }
        })
    }

    fn random_spheres(n: usize) -> Vec<Sphere> {
        let mut rng = LcgRng::new(17);
        (0..n).map(|_| {
            let c = Vector3f::new(rng.next_f32() * 20.0 - 10.0,
                                  rng.next_f32() * 20.0 - 10.0,
                                  rng.next_f32() * 20.0 - 10.0);
            Sphere::new(c, 0.2 + rng.next_f32())
        }).collect()
    }

    #[test]
    fn test_bvh_matches_naive_nearest_hit() {
        let spheres = random_spheres(64);
        let bvh = BVH::new(spheres.iter().map(|s| s.bounding_box()).collect());
        assert_eq!(bvh.len(), 64);

        let mut rng = LcgRng::new(3);
        for _ in 0..256 {
            let o = Vector3f::new(rng.next_f32() * 30.0 - 15.0, rng.next_f32() * 30.0 - 15.0, 15.0);
            let target = Vector3f::new(rng.next_f32() * 10.0 - 5.0, rng.next_f32() * 10.0 - 5.0, 0.0);
            let ray = Ray3f::new(o, target - o, None, None);

            let bvh_hit = bvh.ray_intersection(&ray, |idx, r| spheres[idx].ray_intersection(r));
            let naive = nearest_of(spheres.iter().enumerate()
                .filter_map(|(i, s)| s.ray_intersection(&ray).map(|h| (i, h))));

            match (bvh_hit, naive) {
                (Some((bi, bh)), Some((ni, nh))) => {
                    assert!((bh.t - nh.t).abs() < 1e-4);
                    assert_eq!(bi, ni);
                }
                (None, None) => {}
                _ => panic!("bvh and naive traversal disagree"),
            }

            let any = bvh.ray_intersection_t(&ray, |idx, r| spheres[idx].ray_intersection_t(r));
            assert_eq!(any, bvh_hit.is_some());
        }
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = BVH::new(Vec::new());
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(bvh.is_empty());
        assert!(bvh.ray_intersection(&ray, |_, _| None).is_none());
        assert!(!bvh.ray_intersection_t(&ray, |_, _| true));
    }

    #[test]
    fn test_bvh_coincident_primitives() {
        let spheres: Vec<Sphere> = (0..5).map(|i| Sphere::new(Vector3f::zeros(), 1.0 + i as Float * 0.1)).collect();
        let bvh = BVH::new(spheres.iter().map(|s| s.bounding_box()).collect());
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let (idx, hit) = bvh.ray_intersection(&ray, |i, r| spheres[i].ray_intersection(r)).expect("hit");
        assert_eq!(idx, 4);
        assert!((hit.t - 3.6).abs() < 1e-4);
    }
}
