//! Implements a solver interface for Clarabel
//!
//! Clarabel minimizes `q'x` subject to `Ax + s = b` with `s` in a product of cones. Rows
//! whose bounds are equal become zero cone constraints, all other finite row and column
//! bounds become nonnegative cone constraints.
use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT};
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::configuration::Configuration;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::{LoadedModel, RawSolution, Solver, SolverError};
use crate::optimize::OptimizationStatus;

/// Interior point backend, the default solver
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    model: Option<LoadedModel>,
    verbose: bool,
    tolerance: f64,
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        ClarabelSolver {
            model: None,
            verbose: false,
            tolerance: Configuration::current().tolerance,
        }
    }
}

impl ClarabelSolver {
    /// Create a solver using the configured tolerance
    pub fn new() -> Self {
        Self::default()
    }

    /// Feasibility and duality gap tolerance
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Have Clarabel print its iteration log
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Constraint rows of the conic problem, split by cone
#[derive(Default)]
struct ConicRows {
    equalities: Vec<(Vec<(usize, f64)>, f64)>,
    inequalities: Vec<(Vec<(usize, f64)>, f64)>,
}

impl ConicRows {
    /// Add lower <= row <= upper, returns false if the row can never be satisfied
    fn add(&mut self, entries: Vec<(usize, f64)>, lower: f64, upper: f64) -> bool {
        if entries.is_empty() {
            // An empty row is always 0
            return lower <= 0.0 && 0.0 <= upper;
        }
        if lower == upper {
            self.equalities.push((entries, lower));
            return true;
        }
        if upper.is_finite() {
            self.inequalities.push((entries.clone(), upper));
        }
        if lower.is_finite() {
            let negated = entries.into_iter().map(|(j, v)| (j, -v)).collect();
            self.inequalities.push((negated, -lower));
        }
        true
    }
}

impl Solver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn loaded(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    fn loaded_mut(&mut self) -> &mut Option<LoadedModel> {
        &mut self.model
    }

    fn optimize(&self, model: &LoadedModel) -> Result<RawSolution, SolverError> {
        let n = model.ncols();
        let mut rows = ConicRows::default();
        let mut feasible = true;
        for (entries, &(lower, upper)) in model.row_entries().into_iter().zip(model.row_bounds())
        {
            feasible &= rows.add(entries, lower, upper);
        }
        for (j, &(lower, upper)) in model.col_bounds().iter().enumerate() {
            feasible &= rows.add(vec![(j, 1.0)], lower, upper);
        }
        if !feasible {
            return Ok(RawSolution {
                status: OptimizationStatus::Infeasible,
                primals: None,
            });
        }

        let n_eq = rows.equalities.len();
        let n_ineq = rows.inequalities.len();
        let mut coo = CooMatrix::new(n_eq + n_ineq, n);
        let mut b = Vec::with_capacity(n_eq + n_ineq);
        for (i, (entries, rhs)) in rows
            .equalities
            .iter()
            .chain(rows.inequalities.iter())
            .enumerate()
        {
            for &(j, v) in entries {
                coo.push(i, j, v);
            }
            b.push(*rhs);
        }
        let a = to_clarabel(&CscMatrix::from(&coo));

        // Clarabel always minimizes
        let q: Vec<f64> = match model.sense() {
            ObjectiveSense::Minimize => model.objective().to_vec(),
            ObjectiveSense::Maximize => model.objective().iter().map(|c| -c).collect(),
        };
        let p = ClarabelCsc::new(n, n, vec![0; n + 1], vec![], vec![]);

        let mut cones = Vec::new();
        if n_eq > 0 {
            cones.push(SupportedConeT::ZeroConeT(n_eq));
        }
        if n_ineq > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(n_ineq));
        }

        let settings = DefaultSettings::<f64> {
            verbose: self.verbose,
            tol_feas: self.tolerance,
            tol_gap_abs: self.tolerance,
            tol_gap_rel: self.tolerance,
            ..DefaultSettings::default()
        };
        let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, settings);
        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => OptimizationStatus::Optimal,
            SolverStatus::AlmostSolved => OptimizationStatus::AlmostOptimal,
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                OptimizationStatus::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                OptimizationStatus::Unbounded
            }
            SolverStatus::NumericalError => OptimizationStatus::NumericalError,
            _ => OptimizationStatus::SolverHalted,
        };
        let primals = if status.is_optimal() {
            Some(solver.solution.x.clone())
        } else {
            None
        };
        Ok(RawSolution { status, primals })
    }
}

/// Copy a nalgebra sparse matrix into Clarabel's own CSC type
fn to_clarabel(matrix: &CscMatrix<f64>) -> ClarabelCsc<f64> {
    ClarabelCsc::new(
        matrix.nrows(),
        matrix.ncols(),
        matrix.col_offsets().to_vec(),
        matrix.row_indices().to_vec(),
        matrix.values().to_vec(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> CscMatrix<f64> {
        // uptake -> A, A -> B, B -> biomass
        let mut coo = CooMatrix::new(2, 3);
        coo.push(0, 0, 1.);
        coo.push(0, 1, -1.);
        coo.push(1, 1, 1.);
        coo.push(1, 2, -1.);
        CscMatrix::from(&coo)
    }

    #[test]
    fn maximize_chain() {
        let mut solver = ClarabelSolver::new();
        solver
            .load(&chain(), None, None, ObjectiveSense::Maximize)
            .unwrap();
        solver.row_bounds(&[(0., 0.), (0., 0.)]).unwrap();
        solver
            .col_bounds(&[(0., 10.), (0., 1000.), (0., 1000.)])
            .unwrap();
        solver.objective_coefficients(&[0., 0., 1.]).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 10.).abs() < 1e-4);
        let x = solver.col_primals().unwrap();
        assert!((x[1] - 10.).abs() < 1e-4);
    }

    #[test]
    fn minimize_chain() {
        let mut solver = ClarabelSolver::new();
        solver
            .load(&chain(), None, None, ObjectiveSense::Minimize)
            .unwrap();
        solver.row_bounds(&[(0., 0.), (0., 0.)]).unwrap();
        solver
            .col_bounds(&[(0., 10.), (0., 1000.), (2., 1000.)])
            .unwrap();
        solver.objective_coefficients(&[1., 0., 0.]).unwrap();
        let solution = solver.solve().unwrap();
        assert!(solution.is_optimal());
        // The biomass lower bound forces two units through the chain
        assert!((solution.objective_value.unwrap() - 2.).abs() < 1e-4);
    }

    #[test]
    fn infeasible() {
        let mut solver = ClarabelSolver::new();
        solver
            .load(&chain(), None, None, ObjectiveSense::Maximize)
            .unwrap();
        solver
            .col_bounds(&[(0., 0.), (0., 1000.), (5., 1000.)])
            .unwrap();
        solver.objective_coefficients(&[0., 0., 1.]).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
        assert!(solution.objective_value.is_none());
        if let Err(SolverError::NotSolved) = solver.col_primals() {
        } else {
            panic!("Primals available after infeasible solve")
        }
    }

    #[test]
    fn empty_row_out_of_bounds() {
        let coo = CooMatrix::<f64>::new(1, 1);
        let mut solver = ClarabelSolver::new();
        solver
            .load(&CscMatrix::from(&coo), None, None, ObjectiveSense::Maximize)
            .unwrap();
        solver.row_bounds(&[(1., 2.)]).unwrap();
        solver.col_bounds(&[(0., 1.)]).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Infeasible);
    }

    #[test]
    fn configured_tolerance() {
        let solver = ClarabelSolver::new();
        assert!((solver.tolerance - Configuration::default().tolerance).abs() < 1e-25);

        let mut solver = ClarabelSolver::new().tolerance(1e-10);
        solver
            .load(&chain(), None, None, ObjectiveSense::Maximize)
            .unwrap();
        solver.row_bounds(&[(0., 0.), (0., 0.)]).unwrap();
        solver
            .col_bounds(&[(0., 10.), (0., 1000.), (0., 1000.)])
            .unwrap();
        solver.objective_coefficients(&[0., 0., 1.]).unwrap();
        let solution = solver.solve().unwrap();
        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 10.).abs() < 1e-6);
    }
}
