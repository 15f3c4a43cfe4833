use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use super::OptimError;

/// Lower and upper limit of a variable. `None` leaves that side unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound(pub Option<f64>, pub Option<f64>);

impl Bound {
    pub const FREE: Bound = Bound(None, None);
    pub const NON_NEGATIVE: Bound = Bound(Some(0.), None);

    pub fn lower(&self) -> f64 {
        self.0.unwrap_or(f64::NEG_INFINITY)
    }

    pub fn upper(&self) -> f64 {
        self.1.unwrap_or(f64::INFINITY)
    }
}

/// Linear program in the form
///
/// ```text
/// minimize    c·x
/// subject to  a_ub·x <= b_ub
///             a_eq·x  = b_eq
///             bounds[i].0 <= x[i] <= bounds[i].1
/// ```
#[derive(Debug, Clone)]
pub struct LinearProgram {
    pub c: Array1<f64>,
    pub a_ub: Array2<f64>,
    pub b_ub: Array1<f64>,
    pub a_eq: Array2<f64>,
    pub b_eq: Array1<f64>,
    pub bounds: Vec<Bound>,
}

impl LinearProgram {
    /// Problem with no constraints and non-negative variables.
    pub fn new(c: Array1<f64>) -> Self {
        let n = c.len();
        LinearProgram {
            c,
            a_ub: Array2::zeros((0, n)),
            b_ub: Array1::zeros(0),
            a_eq: Array2::zeros((0, n)),
            b_eq: Array1::zeros(0),
            bounds: vec![Bound::NON_NEGATIVE; n],
        }
    }

    pub fn with_inequalities(mut self, a_ub: Array2<f64>, b_ub: Array1<f64>) -> Self {
        self.a_ub = a_ub;
        self.b_ub = b_ub;
        self
    }

    pub fn with_equalities(mut self, a_eq: Array2<f64>, b_eq: Array1<f64>) -> Self {
        self.a_eq = a_eq;
        self.b_eq = b_eq;
        self
    }

    pub fn with_bounds(mut self, bounds: Vec<Bound>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    pub fn validate(&self) -> Result<(), OptimError> {
        let n = self.num_variables();
        if self.a_ub.ncols() != n || self.a_eq.ncols() != n {
            return Err(OptimError::Dimension(format!(
                "constraint matrices must have {n} columns"
            )));
        }
        if self.a_ub.nrows() != self.b_ub.len() {
            return Err(OptimError::Dimension(format!(
                "{} inequality rows but {} right hand sides",
                self.a_ub.nrows(),
                self.b_ub.len()
            )));
        }
        if self.a_eq.nrows() != self.b_eq.len() {
            return Err(OptimError::Dimension(format!(
                "{} equality rows but {} right hand sides",
                self.a_eq.nrows(),
                self.b_eq.len()
            )));
        }
        if self.bounds.len() != n {
            return Err(OptimError::Dimension(format!(
                "{} bounds for {n} variables",
                self.bounds.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LpSolution {
    pub x: Array1<f64>,
    /// Objective value at `x`.
    pub fun: f64,
    pub iterations: usize,
}

/// Backend able to find an optimal vertex of a [`LinearProgram`].
pub trait LinearSolver {
    fn solve(&self, lp: &LinearProgram) -> Result<LpSolution, OptimError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds_are_non_negative() {
        let lp = LinearProgram::new(array![1., 2., 3.]);

        assert_eq!(lp.bounds, vec![Bound::NON_NEGATIVE; 3]);
        assert_eq!(lp.a_ub.shape(), [0, 3]);
        assert!(lp.validate().is_ok());
    }

    #[test]
    fn validate_dimensions() {
        let lp = LinearProgram::new(array![1., 2.])
            .with_inequalities(array![[1., 1.]], Array1::zeros(0));
        assert!(matches!(lp.validate(), Err(OptimError::Dimension(_))));

        let lp = LinearProgram::new(array![1., 2.]).with_bounds(vec![Bound::FREE]);
        assert!(matches!(lp.validate(), Err(OptimError::Dimension(_))));
    }
}
