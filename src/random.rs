use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::ThreadRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 3819201;

/// Floor applied to move weights before sampling.
///
/// Sell moves of high-value letters carry negative weights; they stay selectable,
/// just very unlikely.
pub const MIN_WEIGHT: f64 = 1e-6;

/// Source of randomness for the tree search.
pub trait RandomGenerator: Default {
    type Source: Rng;

    fn rng(&mut self) -> &mut Self::Source;

    /// Picks an index with probability proportional to `weights[i]`.
    ///
    /// Weights below [`MIN_WEIGHT`] are raised to it. Returns `None` for an empty slice.
    fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let clamped = weights.iter().map(|w| {
            if w.is_nan() {
                MIN_WEIGHT
            } else {
                w.max(MIN_WEIGHT)
            }
        });
        let distribution = WeightedIndex::new(clamped).ok()?;
        Some(distribution.sample(self.rng()))
    }
}

/// Thread-local OS-seeded randomness. Not reproducible.
pub struct StandardRandomGenerator {
    rng: ThreadRng,
}

impl Default for StandardRandomGenerator {
    fn default() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RandomGenerator for StandardRandomGenerator {
    type Source = ThreadRng;

    fn rng(&mut self) -> &mut ThreadRng {
        &mut self.rng
    }
}

/// Reproducible randomness: the same seed yields the same search.
#[derive(Clone, Debug)]
pub struct SeededRandomGenerator {
    rng: ChaCha8Rng,
}

impl Default for SeededRandomGenerator {
    fn default() -> Self {
        SeededRandomGenerator::new(DEFAULT_SEED)
    }
}

impl RandomGenerator for SeededRandomGenerator {
    type Source = ChaCha8Rng;

    fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}

impl SeededRandomGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

/// Derives the next per-player seed from the current one.
pub fn advance_seed(seed: u64) -> u64 {
    ChaCha8Rng::seed_from_u64(seed).next_u64()
}

/// A generator for one-off draws keyed by a per-player seed.
pub fn rng_for_seed(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_same_numbers() {
        let mut a = SeededRandomGenerator::new(42);
        let mut b = SeededRandomGenerator::new(42);
        let weights = [1.0, 2.0, 3.0, 4.0];
        for _ in 0..20 {
            assert_eq!(a.pick_weighted(&weights), b.pick_weighted(&weights));
        }
    }

    #[test]
    fn advance_seed_is_deterministic_and_moves() {
        assert_eq!(advance_seed(7), advance_seed(7));
        assert_ne!(advance_seed(7), 7);
        assert_ne!(advance_seed(7), advance_seed(8));
    }

    #[test]
    fn empty_weights_pick_nothing() {
        let mut rg = SeededRandomGenerator::default();
        assert_eq!(rg.pick_weighted(&[]), None);
    }

    #[test]
    fn negative_weights_are_nearly_never_picked() {
        // arrange
        let mut rg = SeededRandomGenerator::default();
        let weights = [-16.0, 100.0, -4.0];

        // act
        let picks: Vec<usize> = (0..1000)
            .filter_map(|_| rg.pick_weighted(&weights))
            .collect();

        // assert
        assert_eq!(picks.len(), 1000);
        assert!(picks.iter().all(|&i| i == 1));
    }

    #[test]
    fn all_negative_weights_still_pick() {
        let mut rg = SeededRandomGenerator::default();
        let picked = rg.pick_weighted(&[-5.0, -20.0]).unwrap();
        assert!(picked < 2);
    }
}
