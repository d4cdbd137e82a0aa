// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector2f};

/// Source of uniform sample values for one light path. Instances are owned
/// by a single worker and never shared across threads.
pub trait Sampler {
    fn next_1d(&mut self) -> Float;
    fn next_2d(&mut self) -> Vector2f;
}

pub struct IndependentSampler {
    rng: LcgRng,
}

impl IndependentSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: LcgRng::new(seed) }
    }

    pub fn for_pixel(seed: u64, x: usize, y: usize) -> Self {
        let pixel = ((y as u64) << 32) ^ (x as u64);
        let key = LcgRng::new(seed).next_u64() ^ pixel;
        Self::new(key)
    }
}

impl Sampler for IndependentSampler {
    fn next_1d(&mut self) -> Float {
        self.rng.next_f32()
    }

    fn next_2d(&mut self) -> Vector2f {
        let u = self.rng.next_f32();
        let v = self.rng.next_f32();
        Vector2f::new(u, v)
    }
}
