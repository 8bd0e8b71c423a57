//! RNG module - seeded draws for refills, random layout cells and rocket directions
//!
//! A small LCG keeps whole sessions reproducible from a single seed, which is
//! what the tests and the benches rely on.

use crate::types::{Direction, ItemKind};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // The high bits of an LCG are far better distributed than the low ones.
        (self.next_u32() >> 16) % max.max(1)
    }

    /// Uniformly random cube color
    pub fn cube(&mut self) -> ItemKind {
        ItemKind::CUBES[self.next_range(ItemKind::CUBES.len() as u32) as usize]
    }

    /// Uniformly random rocket direction
    pub fn direction(&mut self) -> Direction {
        if self.next_range(2) == 0 {
            Direction::Horizontal
        } else {
            Direction::Vertical
        }
    }

    /// Current state, usable as a seed to replay from this point
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
