use log::{debug, trace, warn};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    Bound, ConstrainedMinimizer, Convergence, LinearConstraints, LinearProgram, LinearSolver,
    Minimization, Objective, Simplex, SimplexConfig,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlpConfig {
    pub max_iterations: usize,
    /// Trust region radius (infinity norm) of the first step.
    pub initial_radius: f64,
    pub max_radius: f64,
    /// The search stops once the trust region shrinks below this radius.
    pub min_radius: f64,
    /// Relative predicted decrease under which a point is considered stationary.
    pub tolerance: f64,
    /// Minimum ratio of actual to predicted decrease for a step to be taken.
    pub acceptance: f64,
    /// Constraint violation tolerated in the starting point.
    pub feasibility_tolerance: f64,
    pub simplex: SimplexConfig,
}

impl Default for SlpConfig {
    fn default() -> Self {
        SlpConfig {
            max_iterations: 500,
            initial_radius: 0.5,
            max_radius: 1e3,
            min_radius: 1e-10,
            tolerance: 1e-12,
            acceptance: 1e-4,
            feasibility_tolerance: 1e-9,
            simplex: SimplexConfig::default(),
        }
    }
}

/// Trust region sequential linear programming.
///
/// Each iteration minimizes the first order model of the objective over the
/// feasible polyhedron intersected with a box around the current point. Steps are
/// accepted when the real decrease is a reasonable fraction of the predicted one
/// and the box grows or shrinks accordingly. Iterates are kept feasible, so an
/// infeasible starting point is first moved to the closest feasible point in the
/// L1 sense.
#[derive(Debug, Clone, Default)]
pub struct SequentialLinearProgramming {
    config: SlpConfig,
}

impl SequentialLinearProgramming {
    pub fn new(config: SlpConfig) -> Self {
        SequentialLinearProgramming { config }
    }

    fn restore_feasibility(
        &self,
        simplex: &Simplex,
        constraints: &LinearConstraints,
        x0: &Array1<f64>,
    ) -> Option<Array1<f64>> {
        if constraints.violation(x0) <= self.config.feasibility_tolerance {
            return Some(x0.clone());
        }

        // Variables: the displacement d and its absolute value t.
        let n = constraints.num_variables();
        let mut c = Array1::zeros(2 * n);
        c.slice_mut(s![n..]).fill(1.);

        let rows = constraints.inequality.nrows();
        let identity = Array2::<f64>::eye(n);
        let mut a_ub = Array2::zeros((rows + 2 * n, 2 * n));
        let mut b_ub = Array1::zeros(rows + 2 * n);
        a_ub.slice_mut(s![..rows, ..n])
            .assign(&-&constraints.inequality);
        b_ub.slice_mut(s![..rows])
            .assign(&(&constraints.inequality.dot(x0) - &constraints.inequality_rhs));
        a_ub.slice_mut(s![rows..rows + n, ..n]).assign(&identity);
        a_ub.slice_mut(s![rows..rows + n, n..]).assign(&-&identity);
        a_ub.slice_mut(s![rows + n.., ..n]).assign(&-&identity);
        a_ub.slice_mut(s![rows + n.., n..]).assign(&-&identity);

        let mut a_eq = Array2::zeros((constraints.equality.nrows(), 2 * n));
        a_eq.slice_mut(s![.., ..n]).assign(&constraints.equality);
        let b_eq = &constraints.equality_rhs - &constraints.equality.dot(x0);

        let mut bounds: Vec<Bound> = constraints
            .bounds
            .iter()
            .zip(x0.iter())
            .map(|(bound, &x)| Bound(bound.0.map(|l| l - x), bound.1.map(|u| u - x)))
            .collect();
        bounds.extend(std::iter::repeat_n(Bound::NON_NEGATIVE, n));

        let lp = LinearProgram::new(c)
            .with_inequalities(a_ub, b_ub)
            .with_equalities(a_eq, b_eq)
            .with_bounds(bounds);

        match simplex.solve(&lp) {
            Ok(solution) => {
                debug!("moved starting point by {} to reach feasibility", solution.fun);
                Some(x0 + &solution.x.slice(s![..n]))
            }
            Err(e) => {
                warn!("no feasible point: {e}");
                None
            }
        }
    }

    /// Linear model of the objective restricted to the trust region around `x`.
    fn step_problem(
        &self,
        constraints: &LinearConstraints,
        x: &Array1<f64>,
        gradient: Array1<f64>,
        radius: f64,
    ) -> LinearProgram {
        let bounds = constraints
            .bounds
            .iter()
            .zip(x.iter())
            .map(|(bound, &v)| {
                let upper = (bound.upper() - v).min(radius);
                let lower = (bound.lower() - v).max(-radius).min(upper);
                Bound(Some(lower), Some(upper))
            })
            .collect();

        LinearProgram::new(gradient)
            .with_inequalities(
                -&constraints.inequality,
                &constraints.inequality.dot(x) - &constraints.inequality_rhs,
            )
            .with_equalities(
                constraints.equality.clone(),
                &constraints.equality_rhs - &constraints.equality.dot(x),
            )
            .with_bounds(bounds)
    }
}

impl ConstrainedMinimizer for SequentialLinearProgramming {
    fn minimize<F>(
        &self,
        objective: &F,
        constraints: &LinearConstraints,
        x0: Array1<f64>,
    ) -> Minimization
    where
        F: Objective + ?Sized,
    {
        let config = &self.config;
        let simplex = Simplex::new(config.simplex);

        let Some(mut x) = self.restore_feasibility(&simplex, constraints, &x0) else {
            return Minimization {
                fun: objective.value(&x0),
                x: x0,
                iterations: 0,
                convergence: Convergence::InfeasibleStart,
            };
        };
        let mut fun = objective.value(&x);
        let mut radius = config.initial_radius;

        for iteration in 0..config.max_iterations {
            let gradient = objective.gradient(&x);
            let lp = self.step_problem(constraints, &x, gradient.clone(), radius);
            let step = match simplex.solve(&lp) {
                Ok(solution) => solution.x,
                Err(e) => {
                    warn!("linearized subproblem failed at iteration {iteration}: {e}");
                    return Minimization {
                        x,
                        fun,
                        iterations: iteration,
                        convergence: Convergence::SubproblemFailed,
                    };
                }
            };

            let predicted = -gradient.dot(&step);
            if predicted <= config.tolerance * (1. + fun.abs()) {
                debug!("stationary point after {iteration} iterations, objective {fun}");
                return Minimization {
                    x,
                    fun,
                    iterations: iteration,
                    convergence: Convergence::Converged,
                };
            }

            let candidate = &x + &step;
            let candidate_fun = objective.value(&candidate);
            let ratio = (fun - candidate_fun) / predicted;
            trace!("iteration {iteration}: objective {fun}, radius {radius}, ratio {ratio}");

            let step_size = step.iter().fold(0., |acc: f64, v| acc.max(v.abs()));
            if ratio >= config.acceptance {
                x = candidate;
                fun = candidate_fun;
            }
            if ratio < 0.25 {
                radius = 0.25 * step_size;
            } else if ratio > 0.75 && step_size >= 0.99 * radius {
                radius = (2. * radius).min(config.max_radius);
            }

            if radius < config.min_radius {
                debug!("trust region collapsed after {iteration} iterations, objective {fun}");
                return Minimization {
                    x,
                    fun,
                    iterations: iteration + 1,
                    convergence: Convergence::TrustRegionCollapsed,
                };
            }
        }

        Minimization {
            x,
            fun,
            iterations: config.max_iterations,
            convergence: Convergence::IterationLimit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    struct Linear(Array1<f64>);

    impl Objective for Linear {
        fn value(&self, x: &Array1<f64>) -> f64 {
            self.0.dot(x)
        }

        fn gradient(&self, _x: &Array1<f64>) -> Array1<f64> {
            self.0.clone()
        }
    }

    /// (x - 0.3)² + (y - 2)²
    struct Quadratic;

    impl Objective for Quadratic {
        fn value(&self, x: &Array1<f64>) -> f64 {
            (x[0] - 0.3).powi(2) + (x[1] - 2.).powi(2)
        }

        fn gradient(&self, x: &Array1<f64>) -> Array1<f64> {
            array![2. * (x[0] - 0.3), 2. * (x[1] - 2.)]
        }
    }

    fn unit_square() -> LinearConstraints {
        LinearConstraints::new(
            Array2::zeros((0, 2)),
            Array1::zeros(0),
            Array2::zeros((0, 2)),
            Array1::zeros(0),
            vec![Bound(Some(0.), Some(1.)); 2],
        )
    }

    #[test]
    fn linear_objective_reaches_vertex() {
        let constraints = LinearConstraints::new(
            array![[-1., -1.]],
            array![-1.5],
            Array2::zeros((0, 2)),
            Array1::zeros(0),
            vec![Bound::NON_NEGATIVE; 2],
        );
        let objective = Linear(array![-1., -2.]);

        let result = SequentialLinearProgramming::default().minimize(
            &objective,
            &constraints,
            array![0.1, 0.1],
        );

        assert!(result.converged());
        assert_abs_diff_eq!(result.x, array![0., 1.5], epsilon = 1e-9);
        assert_abs_diff_eq!(result.fun, -3., epsilon = 1e-9);
    }

    #[test]
    fn quadratic_with_active_bound() {
        let result = SequentialLinearProgramming::default().minimize(
            &Quadratic,
            &unit_square(),
            array![0.9, 0.1],
        );

        assert_eq!(result.convergence, Convergence::Converged);
        assert_abs_diff_eq!(result.x, array![0.3, 1.], epsilon = 1e-4);
    }

    #[test]
    fn infeasible_start_is_restored() {
        let constraints = LinearConstraints::new(
            Array2::zeros((0, 2)),
            Array1::zeros(0),
            array![[1., 1.]],
            array![1.],
            vec![Bound::NON_NEGATIVE; 2],
        );
        let objective = Linear(array![1., 0.]);

        let result = SequentialLinearProgramming::default().minimize(
            &objective,
            &constraints,
            array![3., -1.],
        );

        assert!(result.converged());
        assert!(constraints.violation(&result.x) < 1e-9);
        assert_abs_diff_eq!(result.x, array![0., 1.], epsilon = 1e-9);
    }

    #[test]
    fn empty_region() {
        let constraints = LinearConstraints::new(
            array![[1., 1.]],
            array![3.],
            Array2::zeros((0, 2)),
            Array1::zeros(0),
            vec![Bound(Some(0.), Some(1.)); 2],
        );

        let result = SequentialLinearProgramming::default().minimize(
            &Linear(array![1., 1.]),
            &constraints,
            array![0.5, 0.5],
        );

        assert_eq!(result.convergence, Convergence::InfeasibleStart);
        assert_eq!(result.x, array![0.5, 0.5]);
    }

    #[test]
    fn collapsed_trust_region_is_reported() {
        let minimizer = SequentialLinearProgramming::new(SlpConfig {
            min_radius: 1e-3,
            ..Default::default()
        });

        let result = minimizer.minimize(&Quadratic, &unit_square(), array![0.9, 0.1]);

        assert_eq!(result.convergence, Convergence::TrustRegionCollapsed);
        assert!(result.converged());
        assert_abs_diff_eq!(result.x, array![0.3, 1.], epsilon = 1e-2);
    }

    #[test]
    fn iteration_limit_keeps_last_iterate() {
        let minimizer = SequentialLinearProgramming::new(SlpConfig {
            max_iterations: 1,
            initial_radius: 0.1,
            ..Default::default()
        });

        let result = minimizer.minimize(&Quadratic, &unit_square(), array![0.9, 0.1]);

        assert_eq!(result.convergence, Convergence::IterationLimit);
        assert!(Quadratic.value(&result.x) < Quadratic.value(&array![0.9, 0.1]));
    }
}
