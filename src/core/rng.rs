// Copyright @yucwang 2026

use crate::math::constants::{Float, ONE_MINUS_EPSILON};

#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        // Scramble the seed so neighbouring pixel seeds start far apart.
        let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        Self { state: z ^ (z >> 31) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    pub fn next_u64(&mut self) -> u64 {
        ((self.next_u32() as u64) << 32) | self.next_u32() as u64
    }

    // Uniform in [0, 1).
    pub fn next_f32(&mut self) -> Float {
        let v = (self.next_u32() >> 8) as Float * (1.0 / 16777216.0);
        v.min(ONE_MINUS_EPSILON)
    }
}
