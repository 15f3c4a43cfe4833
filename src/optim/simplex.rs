use log::trace;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use super::{LinearProgram, LinearSolver, LpSolution, OptimError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimplexConfig {
    pub max_iterations: usize,
    /// Coefficients below this magnitude are treated as zero.
    pub tolerance: f64,
    /// Largest phase one objective (relative to the right hand side) still accepted as feasible.
    pub feasibility_tolerance: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        SimplexConfig {
            max_iterations: 10_000,
            tolerance: 1e-9,
            feasibility_tolerance: 1e-7,
        }
    }
}

/// Dense two-phase simplex method. Entering and leaving variables are chosen with
/// Bland's rule, so degenerate problems cannot cycle.
#[derive(Debug, Clone, Default)]
pub struct Simplex {
    config: SimplexConfig,
}

impl Simplex {
    pub fn new(config: SimplexConfig) -> Self {
        Simplex { config }
    }
}

/// Problem rewritten as `min c·u` subject to `a·u = b`, `u >= 0`.
///
/// The first `transform.ncols()` entries of `u` map back onto the original variables
/// through `x = offset + transform·u`, the rest are slacks.
struct StandardForm {
    transform: Array2<f64>,
    offset: Array1<f64>,
    a: Array2<f64>,
    b: Array1<f64>,
    c: Array1<f64>,
}

impl StandardForm {
    fn new(lp: &LinearProgram) -> Result<StandardForm, OptimError> {
        let n = lp.num_variables();
        let mut columns: Vec<(usize, f64)> = Vec::with_capacity(n);
        let mut upper_limits: Vec<(usize, f64)> = Vec::new();
        let mut offset = Array1::zeros(n);

        for (var, bound) in lp.bounds.iter().enumerate() {
            match (bound.0, bound.1) {
                (Some(lower), Some(upper)) => {
                    if lower > upper {
                        return Err(OptimError::Infeasible);
                    }
                    offset[var] = lower;
                    upper_limits.push((columns.len(), upper - lower));
                    columns.push((var, 1.));
                }
                (Some(lower), None) => {
                    offset[var] = lower;
                    columns.push((var, 1.));
                }
                (None, Some(upper)) => {
                    offset[var] = upper;
                    columns.push((var, -1.));
                }
                (None, None) => {
                    columns.push((var, 1.));
                    columns.push((var, -1.));
                }
            }
        }

        let k = columns.len();
        let mut transform = Array2::zeros((n, k));
        for (col, &(var, sign)) in columns.iter().enumerate() {
            transform[[var, col]] = sign;
        }

        let ub_rows = lp.a_ub.nrows();
        let slack_rows = ub_rows + upper_limits.len();
        let rows = slack_rows + lp.a_eq.nrows();
        let cols = k + slack_rows;
        let mut a = Array2::zeros((rows, cols));
        let mut b = Array1::zeros(rows);

        a.slice_mut(s![..ub_rows, ..k])
            .assign(&lp.a_ub.dot(&transform));
        b.slice_mut(s![..ub_rows])
            .assign(&(&lp.b_ub - &lp.a_ub.dot(&offset)));
        for (i, &(col, limit)) in upper_limits.iter().enumerate() {
            a[[ub_rows + i, col]] = 1.;
            b[ub_rows + i] = limit;
        }
        for row in 0..slack_rows {
            a[[row, k + row]] = 1.;
        }
        a.slice_mut(s![slack_rows.., ..k])
            .assign(&lp.a_eq.dot(&transform));
        b.slice_mut(s![slack_rows..])
            .assign(&(&lp.b_eq - &lp.a_eq.dot(&offset)));

        let mut c = Array1::zeros(cols);
        c.slice_mut(s![..k]).assign(&transform.t().dot(&lp.c));

        Ok(StandardForm {
            transform,
            offset,
            a,
            b,
            c,
        })
    }

    fn recover(&self, u: &Array1<f64>) -> Array1<f64> {
        let k = self.transform.ncols();
        &self.offset + &self.transform.dot(&u.slice(s![..k]))
    }
}

struct Tableau {
    basis: Vec<usize>,
    /// Constraint rows followed by the reduced cost row. The last column holds the
    /// right hand side.
    coefficients: Array2<f64>,
    /// Number of standard form columns. Artificial variables are placed after them.
    structural: usize,
}

impl Tableau {
    /// Tableau minimizing the sum of one artificial variable per row.
    fn phase_one(form: &StandardForm) -> Tableau {
        let (rows, cols) = form.a.dim();
        let rhs = cols + rows;
        let mut coefficients = Array2::zeros((rows + 1, rhs + 1));

        for i in 0..rows {
            let sign = if form.b[i] < 0. { -1. } else { 1. };
            coefficients
                .slice_mut(s![i, ..cols])
                .assign(&(&form.a.row(i) * sign));
            coefficients[[i, cols + i]] = 1.;
            coefficients[[i, rhs]] = sign * form.b[i];
        }

        let reduced_costs = -coefficients.slice(s![..rows, ..]).sum_axis(Axis(0));
        coefficients.row_mut(rows).assign(&reduced_costs);
        coefficients.slice_mut(s![rows, cols..rhs]).fill(0.);

        Tableau {
            basis: (cols..rhs).collect(),
            coefficients,
            structural: cols,
        }
    }

    fn objective_row(&self) -> usize {
        self.basis.len()
    }

    fn rhs(&self) -> usize {
        self.coefficients.ncols() - 1
    }

    fn value(&self) -> f64 {
        -self.coefficients[[self.objective_row(), self.rhs()]]
    }

    /// Pivots until no column below `eligible` has a negative reduced cost.
    fn iterate(&mut self, eligible: usize, config: &SimplexConfig) -> Result<usize, OptimError> {
        let objective = self.objective_row();
        for iteration in 0..config.max_iterations {
            let entering =
                (0..eligible).find(|&j| self.coefficients[[objective, j]] < -config.tolerance);
            let Some(col) = entering else {
                return Ok(iteration);
            };
            let row = self
                .leaving_row(col, config.tolerance)
                .ok_or(OptimError::Unbounded)?;
            self.pivot(row, col);
        }
        Err(OptimError::IterationLimit(config.max_iterations))
    }

    fn leaving_row(&self, col: usize, tolerance: f64) -> Option<usize> {
        let rhs = self.rhs();
        let mut best: Option<(usize, f64)> = None;
        for (i, &basic) in self.basis.iter().enumerate() {
            let a = self.coefficients[[i, col]];
            if a <= tolerance {
                continue;
            }
            let ratio = self.coefficients[[i, rhs]] / a;
            best = match best {
                Some((row, min_ratio))
                    if ratio > min_ratio + tolerance
                        || (ratio >= min_ratio - tolerance && self.basis[row] < basic) =>
                {
                    Some((row, min_ratio))
                }
                _ => Some((i, ratio)),
            };
        }
        best.map(|(row, _)| row)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self.coefficients[[row, col]];
        self.coefficients.row_mut(row).mapv_inplace(|v| v / pivot);
        let pivot_row = self.coefficients.row(row).to_owned();

        for (i, mut r) in self.coefficients.rows_mut().into_iter().enumerate() {
            if i == row {
                continue;
            }
            let factor = r[col];
            if factor != 0. {
                r.scaled_add(-factor, &pivot_row);
                r[col] = 0.;
            }
        }
        self.basis[row] = col;
    }

    /// Replaces artificial variables still basic (at zero level) by structural ones.
    /// Rows where that is impossible are linearly dependent and get dropped.
    fn drive_out_artificials(&mut self, tolerance: f64) {
        let mut redundant = Vec::new();
        for row in 0..self.basis.len() {
            if self.basis[row] < self.structural {
                continue;
            }
            let replacement =
                (0..self.structural).find(|&j| self.coefficients[[row, j]].abs() > tolerance);
            match replacement {
                Some(col) => self.pivot(row, col),
                None => redundant.push(row),
            }
        }

        if !redundant.is_empty() {
            let keep: Vec<usize> = (0..=self.basis.len())
                .filter(|row| !redundant.contains(row))
                .collect();
            self.coefficients = self.coefficients.select(Axis(0), &keep);
            self.basis = self
                .basis
                .iter()
                .enumerate()
                .filter(|(row, _)| !redundant.contains(row))
                .map(|(_, &basic)| basic)
                .collect();
        }
    }

    fn phase_two(&mut self, costs: &Array1<f64>) {
        let rhs = self.rhs();
        let mut reduced_costs = Array1::zeros(rhs + 1);
        reduced_costs
            .slice_mut(s![..self.structural])
            .assign(costs);
        for (i, &basic) in self.basis.iter().enumerate() {
            reduced_costs.scaled_add(-costs[basic], &self.coefficients.row(i));
        }
        let objective = self.objective_row();
        self.coefficients.row_mut(objective).assign(&reduced_costs);
    }

    fn solution(&self) -> Array1<f64> {
        let rhs = self.rhs();
        let mut u = Array1::zeros(self.structural);
        for (i, &basic) in self.basis.iter().enumerate() {
            if basic < self.structural {
                u[basic] = self.coefficients[[i, rhs]].max(0.);
            }
        }
        u
    }
}

impl LinearSolver for Simplex {
    fn solve(&self, lp: &LinearProgram) -> Result<LpSolution, OptimError> {
        lp.validate()?;
        let form = StandardForm::new(lp)?;

        let mut tableau = Tableau::phase_one(&form);
        let all_columns = tableau.rhs();
        let mut iterations = tableau.iterate(all_columns, &self.config)?;

        let scale = 1. + form.b.mapv(f64::abs).sum();
        if tableau.value() > self.config.feasibility_tolerance * scale {
            return Err(OptimError::Infeasible);
        }

        tableau.drive_out_artificials(self.config.tolerance);
        tableau.phase_two(&form.c);
        let structural = tableau.structural;
        iterations += tableau.iterate(structural, &self.config)?;

        let x = form.recover(&tableau.solution());
        let fun = lp.c.dot(&x);
        trace!(
            "simplex: {} rows, {} columns, {iterations} pivots, objective {fun}",
            tableau.basis.len(),
            structural
        );

        Ok(LpSolution { x, fun, iterations })
    }
}
