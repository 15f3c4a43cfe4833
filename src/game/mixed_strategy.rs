use ndarray::prelude::*;
use rand::Rng;
use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;

use super::GameError;

/// Probability distribution over the actions of one player.
#[derive(Debug, Clone)]
pub struct MixedStrategy {
    probabilities: Array1<f64>,
    sampler: WeightedIndex<f64>,
}

impl MixedStrategy {
    /// Probabilities are kept exactly as given. Negative round-off left by an
    /// optimizer is sampled as zero.
    pub fn new(probabilities: Array1<f64>) -> Result<Self, GameError> {
        let sampler = WeightedIndex::new(probabilities.iter().map(|p| p.max(0.)))?;
        Ok(MixedStrategy {
            probabilities,
            sampler,
        })
    }

    pub fn probabilities(&self) -> &Array1<f64> {
        &self.probabilities
    }

    /// Index of an action drawn from the distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.sampler.sample(rng)
    }
}
