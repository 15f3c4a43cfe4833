use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimError {
    #[error("Linear program is infeasible.")]
    Infeasible,

    #[error("Linear program is unbounded.")]
    Unbounded,

    #[error("No optimum found after {0} pivots.")]
    IterationLimit(usize),

    #[error("Inconsistent problem dimensions: {0}")]
    Dimension(String),
}
