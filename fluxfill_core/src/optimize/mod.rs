//! Module for loading and solving linear flux balance problems

pub mod objective;
pub mod solvers;

use indexmap::IndexMap;

/// Struct representing the solution to an optimization problem
#[derive(Clone, Debug)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the variables at the optimum,
    ///
    /// Some(IndexMap), keyed by column label, with values corresponding to variable
    /// values at optimum if the problem could be solved and the columns were labelled,
    /// None otherwise
    pub variable_values: Option<IndexMap<String, f64>>,
    /// Values of the dual variables at the optimum
    ///
    /// Some(IndexMap), keyed by row label, if the solver reports duals. Neither the
    /// Clarabel nor the microlp backend does, so this is currently always None
    pub dual_values: Option<IndexMap<String, f64>>,
}

impl ProblemSolution {
    /// Whether the solver reached an optimum (or very nearly so)
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OptimizationStatus {
    /// Problem has not yet attempted to be optimized
    Unoptimized,
    /// Problem has been optimized
    Optimal,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// An approximate solution has been found
    AlmostOptimal,
    /// A numerical error occurred during solving
    NumericalError,
    /// The solver hit the maximum allowed iterations, or max time, or made insufficient progress
    SolverHalted,
}

impl OptimizationStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(
            self,
            OptimizationStatus::Optimal | OptimizationStatus::AlmostOptimal
        )
    }
}
