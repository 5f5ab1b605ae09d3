//! Bounded-variable two-phase simplex over a dense tableau
//!
//! Operates on the standard form produced by
//! [`StandardForm`](crate::solver::standard_form::StandardForm): equality
//! rows, every column in `[0, span]`. Finite spans are enforced by the
//! bounded-variable pivoting rule (a nonbasic column rests at either of
//! its bounds and may flip between them without a pivot), so upper bounds
//! never consume constraint rows.
//!
//! Pivot selection follows Bland's rule: the entering column is the
//! smallest-index eligible column, and ratio-test ties keep the smallest
//! row index. Phase 1 minimizes the sum of artificial columns; a positive
//! phase-1 optimum means the model is infeasible.
use indexmap::IndexMap;
use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::configuration::SolveOptions;
use crate::model::model::Model;
use crate::solver::standard_form::StandardForm;
use crate::solver::SolverError;

/// Outcome of solving the continuous relaxation of a model
pub(crate) enum RelaxationOutcome {
    Optimal {
        values: IndexMap<String, f64>,
        objective: f64,
    },
    Infeasible,
    Unbounded,
}

/// Solve the continuous relaxation of a model
///
/// Integer and binary variables are treated as continuous within their
/// bounds; the caller decides what to do with fractional values.
pub(crate) fn solve_relaxation(
    model: &Model,
    options: &SolveOptions,
) -> Result<RelaxationOutcome, SolverError> {
    let form = StandardForm::build(model);
    let mut tableau = Tableau::new(&form, options);
    debug!(
        "simplex: {} rows, {} columns ({} artificial)",
        tableau.rows,
        tableau.a.ncols(),
        tableau.a.ncols() - tableau.artificial_start
    );

    if tableau.needs_phase_one() {
        if !tableau.run_phase_one()? {
            debug!("simplex: phase one positive, infeasible");
            return Ok(RelaxationOutcome::Infeasible);
        }
    }

    match tableau.run_phase_two(&form)? {
        IterationOutcome::Optimal => {}
        IterationOutcome::Unbounded => {
            debug!("simplex: unbounded");
            return Ok(RelaxationOutcome::Unbounded);
        }
    }

    let values = form.recover(model, &tableau.x);
    // Every declared variable has a value, so evaluation cannot miss
    let objective = model.objective().expression.evaluate(&values).unwrap();
    debug!("simplex: optimal, objective {}", objective);
    Ok(RelaxationOutcome::Optimal { values, objective })
}

enum IterationOutcome {
    Optimal,
    Unbounded,
}

/// Simplex working state
///
/// `a` holds the updated constraint rows (the basis inverse applied to
/// the original matrix), `obj` the reduced-cost row of the active phase,
/// and `x` the current value of every column. Basic columns of `a` form
/// an identity submatrix, one per row.
struct Tableau {
    a: DMatrix<f64>,
    obj: DVector<f64>,
    x: DVector<f64>,
    span: Vec<f64>,
    at_upper: Vec<bool>,
    basis: Vec<usize>,
    in_basis: Vec<bool>,
    /// First artificial column; phase 2 never lets these enter
    artificial_start: usize,
    rows: usize,
    eps: f64,
    /// Relative feasibility tolerance for the phase-1 optimum
    feas_tol: f64,
    pivots: usize,
    pivot_cap: usize,
}

impl Tableau {
    fn new(form: &StandardForm, options: &SolveOptions) -> Tableau {
        let rows = form.a.nrows();
        let structural = form.a.ncols();

        // Pick the initial basis: a row's slack column serves when its
        // value would be nonnegative, otherwise the row gets an
        // artificial column. Rows are normalized so every initial basic
        // column has coefficient +1.
        enum Seed {
            Slack(usize),
            Artificial(usize),
        }
        let mut negate = vec![false; rows];
        let mut seeds = Vec::with_capacity(rows);
        let mut artificials = 0;
        for row in 0..rows {
            let rhs = form.b[row];
            match form.slack_of_row[row] {
                Some((col, sign)) if sign * rhs >= 0.0 => {
                    negate[row] = sign < 0.0;
                    seeds.push(Seed::Slack(col));
                }
                _ => {
                    negate[row] = rhs < 0.0;
                    seeds.push(Seed::Artificial(structural + artificials));
                    artificials += 1;
                }
            }
        }

        let total = structural + artificials;
        let mut a = DMatrix::zeros(rows, total);
        for row in 0..rows {
            let flip = if negate[row] { -1.0 } else { 1.0 };
            for col in 0..structural {
                a[(row, col)] = flip * form.a[(row, col)];
            }
        }

        let mut x = DVector::zeros(total);
        let mut basis = Vec::with_capacity(rows);
        let mut in_basis = vec![false; total];
        for (row, seed) in seeds.iter().enumerate() {
            let col = match seed {
                Seed::Slack(col) => *col,
                Seed::Artificial(col) => {
                    a[(row, *col)] = 1.0;
                    *col
                }
            };
            x[col] = form.b[row].abs();
            basis.push(col);
            in_basis[col] = true;
        }

        let mut span = form.span.clone();
        span.extend(std::iter::repeat(f64::INFINITY).take(artificials));

        let eps = options.epsilon;
        let rhs_scale = (0..rows).map(|row| form.b[row].abs()).fold(0.0, f64::max);
        Tableau {
            a,
            obj: DVector::zeros(total),
            x,
            span,
            at_upper: vec![false; total],
            basis,
            in_basis,
            artificial_start: structural,
            rows,
            eps,
            feas_tol: eps * (1.0 + rhs_scale),
            pivots: 0,
            pivot_cap: options.pivot_cap(rows, total),
        }
    }

    fn needs_phase_one(&self) -> bool {
        self.artificial_start < self.a.ncols()
    }

    /// Minimize the sum of artificial columns; true when it reaches zero
    fn run_phase_one(&mut self) -> Result<bool, SolverError> {
        let total = self.a.ncols();
        let mut costs = DVector::zeros(total);
        for col in self.artificial_start..total {
            costs[col] = 1.0;
        }
        self.canonicalize_objective(&costs);
        match self.iterate(total)? {
            IterationOutcome::Optimal => {}
            IterationOutcome::Unbounded => {
                // The phase-1 objective is bounded below by zero
                return Err(SolverError::Numeric {
                    detail: "phase one reported unbounded".to_string(),
                });
            }
        }

        let infeasibility: f64 = (self.artificial_start..total).map(|col| self.x[col]).sum();
        if infeasibility > self.feas_tol {
            return Ok(false);
        }

        self.drive_out_artificials()?;
        // Pin artificials at zero so phase 2 cannot move them
        for col in self.artificial_start..total {
            self.span[col] = 0.0;
        }
        Ok(true)
    }

    /// Minimize the real costs over the feasible basis from phase 1
    fn run_phase_two(&mut self, form: &StandardForm) -> Result<IterationOutcome, SolverError> {
        let total = self.a.ncols();
        let mut costs = DVector::zeros(total);
        for col in 0..self.artificial_start {
            costs[col] = form.cost[col];
        }
        self.canonicalize_objective(&costs);
        self.iterate(self.artificial_start)
    }

    /// Set the reduced-cost row for `costs`, zeroing basic columns
    fn canonicalize_objective(&mut self, costs: &DVector<f64>) {
        self.obj.copy_from(costs);
        for row in 0..self.rows {
            let basic_cost = costs[self.basis[row]];
            if basic_cost != 0.0 {
                for col in 0..self.a.ncols() {
                    self.obj[col] -= basic_cost * self.a[(row, col)];
                }
            }
        }
    }

    /// Run pivots until optimal or unbounded, within the pivot cap
    fn iterate(&mut self, allowed: usize) -> Result<IterationOutcome, SolverError> {
        loop {
            let Some(entering) = self.entering_column(allowed) else {
                return Ok(IterationOutcome::Optimal);
            };
            let direction = if self.at_upper[entering] { -1.0 } else { 1.0 };

            // Ratio test: how far the entering column can move before a
            // basic column hits one of its bounds, capped by the entering
            // column's own span (a bound flip)
            let mut limit = self.span[entering];
            let mut leaving: Option<(usize, bool)> = None;
            for row in 0..self.rows {
                let rate = direction * self.a[(row, entering)];
                let basic = self.basis[row];
                if rate > self.eps {
                    let ratio = self.x[basic].max(0.0) / rate;
                    if ratio < limit - self.eps {
                        limit = ratio;
                        leaving = Some((row, false));
                    }
                } else if rate < -self.eps {
                    let cap = self.span[basic];
                    if cap.is_finite() {
                        let headroom = (cap - self.x[basic]).max(0.0);
                        let ratio = headroom / -rate;
                        if ratio < limit - self.eps {
                            limit = ratio;
                            leaving = Some((row, true));
                        }
                    }
                }
            }

            if limit.is_infinite() {
                return Ok(IterationOutcome::Unbounded);
            }

            if limit > 0.0 {
                self.x[entering] += direction * limit;
                for row in 0..self.rows {
                    let basic = self.basis[row];
                    self.x[basic] -= direction * limit * self.a[(row, entering)];
                    self.snap_to_bounds(basic);
                }
            }

            match leaving {
                None => {
                    // The entering column ran all the way to its other bound
                    self.at_upper[entering] = !self.at_upper[entering];
                    self.x[entering] = if self.at_upper[entering] {
                        self.span[entering]
                    } else {
                        0.0
                    };
                }
                Some((row, to_upper)) => {
                    let departing = self.basis[row];
                    self.in_basis[departing] = false;
                    self.at_upper[departing] = to_upper;
                    self.x[departing] = if to_upper { self.span[departing] } else { 0.0 };
                    self.basis[row] = entering;
                    self.in_basis[entering] = true;
                    self.at_upper[entering] = false;
                    self.pivot(row, entering)?;
                }
            }

            self.pivots += 1;
            if self.pivots > self.pivot_cap {
                return Err(SolverError::PivotLimit {
                    pivots: self.pivots,
                });
            }
        }
    }

    /// Bland's rule: smallest-index nonbasic column that improves
    fn entering_column(&self, allowed: usize) -> Option<usize> {
        for col in 0..allowed {
            if self.in_basis[col] || self.span[col] == 0.0 {
                continue;
            }
            let reduced = self.obj[col];
            if self.at_upper[col] {
                if reduced > self.eps {
                    return Some(col);
                }
            } else if reduced < -self.eps {
                return Some(col);
            }
        }
        None
    }

    /// Gaussian elimination step on (row, col), updating the reduced costs
    fn pivot(&mut self, row: usize, col: usize) -> Result<(), SolverError> {
        let total = self.a.ncols();
        let pivot = self.a[(row, col)];
        if pivot.abs() <= self.eps {
            return Err(SolverError::Numeric {
                detail: "pivot element vanished".to_string(),
            });
        }
        for j in 0..total {
            self.a[(row, j)] /= pivot;
        }
        self.a[(row, col)] = 1.0;
        for i in 0..self.rows {
            if i == row {
                continue;
            }
            let factor = self.a[(i, col)];
            if factor != 0.0 {
                for j in 0..total {
                    self.a[(i, j)] -= factor * self.a[(row, j)];
                }
                self.a[(i, col)] = 0.0;
            }
        }
        let factor = self.obj[col];
        if factor != 0.0 {
            for j in 0..total {
                self.obj[j] -= factor * self.a[(row, j)];
            }
            self.obj[col] = 0.0;
        }
        Ok(())
    }

    /// Absorb round-off by snapping a column onto a bound it is within
    /// epsilon of
    fn snap_to_bounds(&mut self, col: usize) {
        if self.x[col].abs() < self.eps {
            self.x[col] = 0.0;
        }
        let cap = self.span[col];
        if cap.is_finite() && (self.x[col] - cap).abs() < self.eps {
            self.x[col] = cap;
        }
    }

    /// Pivot basic artificial columns out of the basis where possible
    ///
    /// A row whose artificial stays basic after this has no structural
    /// coefficient left: the row is redundant and the artificial remains
    /// pinned at zero.
    fn drive_out_artificials(&mut self) -> Result<(), SolverError> {
        for row in 0..self.rows {
            if self.basis[row] < self.artificial_start {
                continue;
            }
            let replacement = (0..self.artificial_start)
                .find(|&col| !self.in_basis[col] && self.a[(row, col)].abs() > self.eps);
            if let Some(col) = replacement {
                let departing = self.basis[row];
                self.in_basis[departing] = false;
                self.at_upper[departing] = false;
                self.x[departing] = 0.0;
                self.basis[row] = col;
                self.in_basis[col] = true;
                self.at_upper[col] = false;
                self.pivot(row, col)?;
            }
        }
        Ok(())
    }
}
