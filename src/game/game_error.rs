use rand::distributions::WeightedError;
use thiserror::Error;

use crate::optim::OptimError;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Action set must contain at least one action.")]
    EmptyActionSet,

    #[error("Payoff for actions ({0}, {1}) is not a finite number.")]
    NonFinitePayoff(usize, usize),

    #[error("Payoff table has shape {found:?}, expected {expected:?}.")]
    PayoffShape {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Policy cannot be sampled.")]
    InvalidPolicy(#[from] WeightedError),

    #[error("Optimization failed.")]
    Optimization(#[from] OptimError),
}
