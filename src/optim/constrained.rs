use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use super::Bound;

/// Smooth function to minimize, with its gradient given explicitly.
pub trait Objective {
    fn value(&self, x: &Array1<f64>) -> f64;

    fn gradient(&self, x: &Array1<f64>) -> Array1<f64>;
}

/// Feasible region `inequality·x >= inequality_rhs`, `equality·x = equality_rhs`
/// plus per variable bounds. The matrices are the (constant) Jacobians of the
/// constraint functions.
#[derive(Debug, Clone)]
pub struct LinearConstraints {
    pub inequality: Array2<f64>,
    pub inequality_rhs: Array1<f64>,
    pub equality: Array2<f64>,
    pub equality_rhs: Array1<f64>,
    pub bounds: Vec<Bound>,
}

impl LinearConstraints {
    pub fn new(
        inequality: Array2<f64>,
        inequality_rhs: Array1<f64>,
        equality: Array2<f64>,
        equality_rhs: Array1<f64>,
        bounds: Vec<Bound>,
    ) -> Self {
        let n = bounds.len();
        if inequality.ncols() != n || equality.ncols() != n {
            panic!("Constraint matrices must have one column per bounded variable.");
        }
        if inequality.nrows() != inequality_rhs.len() || equality.nrows() != equality_rhs.len() {
            panic!("Constraint matrices and right hand sides must have the same rows.");
        }
        LinearConstraints {
            inequality,
            inequality_rhs,
            equality,
            equality_rhs,
            bounds,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.bounds.len()
    }

    /// Largest violation of any constraint or bound at `x`.
    pub fn violation(&self, x: &Array1<f64>) -> f64 {
        let inequality = (&self.inequality_rhs - &self.inequality.dot(x))
            .into_iter()
            .fold(0., f64::max);
        let equality = (&self.equality.dot(x) - &self.equality_rhs)
            .into_iter()
            .fold(0_f64, |acc, v| acc.max(v.abs()));
        let bounds = self
            .bounds
            .iter()
            .zip(x.iter())
            .fold(0., |acc: f64, (bound, &v)| {
                acc.max(bound.lower() - v).max(v - bound.upper())
            });
        inequality.max(equality).max(bounds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convergence {
    /// The linear model predicts no further decrease.
    Converged,
    /// Every step was rejected until the trust region fell below its minimum
    /// radius. The point is stationary up to that radius.
    TrustRegionCollapsed,
    IterationLimit,
    /// No feasible point could be found from the starting point.
    InfeasibleStart,
    /// A linearized subproblem could not be solved.
    SubproblemFailed,
}

impl Convergence {
    /// Whether the search stopped at an (approximately) stationary point.
    pub fn is_converged(self) -> bool {
        matches!(
            self,
            Convergence::Converged | Convergence::TrustRegionCollapsed
        )
    }
}

#[derive(Debug, Clone)]
pub struct Minimization {
    /// Last iterate, whatever the convergence status.
    pub x: Array1<f64>,
    pub fun: f64,
    pub iterations: usize,
    pub convergence: Convergence,
}

impl Minimization {
    pub fn converged(&self) -> bool {
        self.convergence.is_converged()
    }
}

/// Local method for smooth objectives over a polyhedron.
pub trait ConstrainedMinimizer {
    fn minimize<F>(
        &self,
        objective: &F,
        constraints: &LinearConstraints,
        x0: Array1<f64>,
    ) -> Minimization
    where
        F: Objective + ?Sized;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_simplex() -> LinearConstraints {
        LinearConstraints::new(
            array![[1., -1.]],
            array![-0.5],
            array![[1., 1.]],
            array![1.],
            vec![Bound::NON_NEGATIVE, Bound::NON_NEGATIVE],
        )
    }

    #[test]
    fn violation_of_feasible_point() {
        let constraints = unit_simplex();

        assert_abs_diff_eq!(constraints.violation(&array![0.5, 0.5]), 0.);
    }

    #[test]
    fn violation_reports_largest() {
        let constraints = unit_simplex();

        // Inequality and equality both off by 0.5, the bound on x0 by 0.25.
        assert_abs_diff_eq!(constraints.violation(&array![-0.25, 0.75]), 0.5);
        // Sum is 3.
        assert_abs_diff_eq!(constraints.violation(&array![1., 2.]), 2.);
    }

    #[test]
    #[should_panic]
    fn mismatched_columns() {
        LinearConstraints::new(
            array![[1., -1., 0.]],
            array![0.],
            array![[1., 1.]],
            array![1.],
            vec![Bound::FREE, Bound::FREE],
        );
    }
}
