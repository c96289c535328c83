//! Uniform random permutations.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Owns the random source used for question and answer order.
#[derive(Debug, Clone)]
pub struct Shuffler<R = StdRng> {
    rng: R,
}

impl Shuffler<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Shuffler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Fisher-Yates over the whole vector; every order is equally likely.
    pub fn shuffle<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        items.shuffle(&mut self.rng);
        items
    }
}
