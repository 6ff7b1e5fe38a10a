//! Implements a solver interface for microlp, a pure rust simplex solver
use microlp::{ComparisonOp, Error as MicrolpError, OptimizationDirection, Problem};

use crate::configuration::Configuration;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::solvers::{LoadedModel, RawSolution, Solver, SolverError};
use crate::optimize::OptimizationStatus;

#[derive(Clone, Debug)]
pub struct MicrolpSolver {
    model: Option<LoadedModel>,
    tolerance: f64,
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        MicrolpSolver {
            model: None,
            tolerance: Configuration::current().tolerance,
        }
    }
}

impl MicrolpSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// How far from zero the bounds of an empty row may be and still be met
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Solver for MicrolpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn loaded(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    fn loaded_mut(&mut self) -> &mut Option<LoadedModel> {
        &mut self.model
    }

    fn optimize(&self, model: &LoadedModel) -> Result<RawSolution, SolverError> {
        let direction = match model.sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut problem = Problem::new(direction);
        let vars: Vec<_> = model
            .objective()
            .iter()
            .zip(model.col_bounds())
            .map(|(&c, &bounds)| problem.add_var(c, bounds))
            .collect();

        for (entries, &(lower, upper)) in model.row_entries().iter().zip(model.row_bounds()) {
            if entries.is_empty() {
                if lower > self.tolerance || upper < -self.tolerance {
                    return Ok(RawSolution {
                        status: OptimizationStatus::Infeasible,
                        primals: None,
                    });
                }
                continue;
            }
            let expr = || entries.iter().map(|&(j, v)| (vars[j], v));
            if lower == upper {
                problem.add_constraint(expr(), ComparisonOp::Eq, lower);
                continue;
            }
            if lower.is_finite() {
                problem.add_constraint(expr(), ComparisonOp::Ge, lower);
            }
            if upper.is_finite() {
                problem.add_constraint(expr(), ComparisonOp::Le, upper);
            }
        }

        match problem.solve() {
            Ok(solution) => Ok(RawSolution {
                status: OptimizationStatus::Optimal,
                primals: Some(vars.iter().map(|&v| solution[v]).collect()),
            }),
            Err(MicrolpError::Infeasible) => Ok(RawSolution {
                status: OptimizationStatus::Infeasible,
                primals: None,
            }),
            Err(MicrolpError::Unbounded) => Ok(RawSolution {
                status: OptimizationStatus::Unbounded,
                primals: None,
            }),
            Err(err) => Err(SolverError::Backend {
                solver: self.name(),
                message: err.to_string(),
            }),
        }
    }
}
