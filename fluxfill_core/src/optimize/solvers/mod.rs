//! Interface linear programming backends have to satisfy
//!
//! A solver holds a single loaded model at a time. Every call to [`Solver::load`] erases
//! the previous model and replaces it, after which the bounds and objective are set in
//! the row and column order established by the load, the model is solved, and the primal
//! values can be read back.
use cfg_if::cfg_if;
use indexmap::IndexMap;
use log::warn;
use nalgebra_sparse::CscMatrix;
use thiserror::Error;

use crate::configuration::{Configuration, SolverKind};
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::{OptimizationStatus, ProblemSolution};

pub mod clarabel;
#[cfg(feature = "minilp")]
pub mod microlp;

pub use self::clarabel::ClarabelSolver;
#[cfg(feature = "minilp")]
pub use self::microlp::MicrolpSolver;

/// A linear programming backend
///
/// Backends only need to provide access to their [`LoadedModel`] and an [`Solver::optimize`]
/// method; loading, bounds, objective and read back are shared.
pub trait Solver {
    /// Short name of the backend, used in log messages
    fn name(&self) -> &'static str;

    /// The currently loaded model, if any
    fn loaded(&self) -> Option<&LoadedModel>;

    /// Mutable access to the slot holding the loaded model
    fn loaded_mut(&mut self) -> &mut Option<LoadedModel>;

    /// Run the backend on a loaded model
    fn optimize(&self, model: &LoadedModel) -> Result<RawSolution, SolverError>;

    /// Load a matrix into the solver, replacing any previously loaded model
    ///
    /// # Parameters
    /// - `matrix`: rows are constraints, columns are variables
    /// - `row_labels`: optional names of the rows, one per row
    /// - `col_labels`: optional names of the columns, one per column
    /// - `sense`: whether the objective will be maximized or minimized
    fn load(
        &mut self,
        matrix: &CscMatrix<f64>,
        row_labels: Option<&[String]>,
        col_labels: Option<&[String]>,
        sense: ObjectiveSense,
    ) -> Result<(), SolverError> {
        let model = LoadedModel::new(matrix, row_labels, col_labels, sense)?;
        *self.loaded_mut() = Some(model);
        Ok(())
    }

    /// Set the (lower, upper) bounds of every row, in row order
    fn row_bounds(&mut self, bounds: &[(f64, f64)]) -> Result<(), SolverError> {
        self.loaded_mut()
            .as_mut()
            .ok_or(SolverError::NotLoaded)?
            .set_row_bounds(bounds)
    }

    /// Set the (lower, upper) bounds of every column, in column order
    fn col_bounds(&mut self, bounds: &[(f64, f64)]) -> Result<(), SolverError> {
        self.loaded_mut()
            .as_mut()
            .ok_or(SolverError::NotLoaded)?
            .set_col_bounds(bounds)
    }

    /// Set the objective coefficient of every column, in column order
    fn objective_coefficients(&mut self, coefficients: &[f64]) -> Result<(), SolverError> {
        self.loaded_mut()
            .as_mut()
            .ok_or(SolverError::NotLoaded)?
            .set_objective(coefficients)
    }

    /// Solve the loaded model, blocking until the backend finishes
    fn solve(&mut self) -> Result<ProblemSolution, SolverError> {
        let raw = {
            let model = self.loaded().ok_or(SolverError::NotLoaded)?;
            self.optimize(model)?
        };
        let model = self.loaded_mut().as_mut().ok_or(SolverError::NotLoaded)?;
        Ok(model.record(raw))
    }

    /// Map of column label to column primal (activity) from the last solve
    fn col_primal_hash(&self) -> Result<IndexMap<String, f64>, SolverError> {
        self.loaded().ok_or(SolverError::NotLoaded)?.col_primal_hash()
    }

    /// Map of row label to row primal (activity) from the last solve
    fn row_primal_hash(&self) -> Result<IndexMap<String, f64>, SolverError> {
        self.loaded().ok_or(SolverError::NotLoaded)?.row_primal_hash()
    }

    /// Column primals from the last solve, in column order
    fn col_primals(&self) -> Result<Vec<f64>, SolverError> {
        Ok(self.loaded().ok_or(SolverError::NotLoaded)?.col_primals()?.to_vec())
    }

    /// Row primals from the last solve, in row order
    fn row_primals(&self) -> Result<Vec<f64>, SolverError> {
        self.loaded().ok_or(SolverError::NotLoaded)?.row_primals()
    }
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn loaded(&self) -> Option<&LoadedModel> {
        (**self).loaded()
    }

    fn loaded_mut(&mut self) -> &mut Option<LoadedModel> {
        (**self).loaded_mut()
    }

    fn optimize(&self, model: &LoadedModel) -> Result<RawSolution, SolverError> {
        (**self).optimize(model)
    }
}

/// Create the solver selected in the process wide configuration
pub fn solver_from_config() -> Box<dyn Solver> {
    match Configuration::current().solver {
        SolverKind::Clarabel => Box::new(ClarabelSolver::new()),
        SolverKind::Microlp => {
            cfg_if! {
                if #[cfg(feature = "minilp")] {
                    Box::new(MicrolpSolver::new())
                } else {
                    warn!("The microlp solver requires the minilp feature, using Clarabel");
                    Box::new(ClarabelSolver::new())
                }
            }
        }
    }
}

/// What a backend reports after running on a model
#[derive(Clone, Debug)]
pub struct RawSolution {
    pub status: OptimizationStatus,
    /// Column values, present when the backend found a solution
    pub primals: Option<Vec<f64>>,
}

/// The model currently held by a solver
///
/// Bounds default to (0, 0) for rows, which is the steady state assumption, and
/// (0, inf) for columns, the objective defaults to all zeros.
#[derive(Clone, Debug)]
pub struct LoadedModel {
    matrix: CscMatrix<f64>,
    row_labels: Option<Vec<String>>,
    col_labels: Option<Vec<String>>,
    row_bounds: Vec<(f64, f64)>,
    col_bounds: Vec<(f64, f64)>,
    objective: Vec<f64>,
    sense: ObjectiveSense,
    status: OptimizationStatus,
    primals: Option<Vec<f64>>,
}

impl LoadedModel {
    /// Validate the labels against the matrix, truncating long labels
    pub fn new(
        matrix: &CscMatrix<f64>,
        row_labels: Option<&[String]>,
        col_labels: Option<&[String]>,
        sense: ObjectiveSense,
    ) -> Result<LoadedModel, SolverError> {
        let label_cap = Configuration::current().label_cap;
        let row_labels = row_labels
            .map(|labels| Self::checked_labels(labels, matrix.nrows(), "row", label_cap))
            .transpose()?;
        let col_labels = col_labels
            .map(|labels| Self::checked_labels(labels, matrix.ncols(), "column", label_cap))
            .transpose()?;
        Ok(LoadedModel {
            matrix: matrix.clone(),
            row_labels,
            col_labels,
            row_bounds: vec![(0., 0.); matrix.nrows()],
            col_bounds: vec![(0., f64::INFINITY); matrix.ncols()],
            objective: vec![0.; matrix.ncols()],
            sense,
            status: OptimizationStatus::Unoptimized,
            primals: None,
        })
    }

    fn checked_labels(
        labels: &[String],
        expected: usize,
        kind: &'static str,
        label_cap: usize,
    ) -> Result<Vec<String>, SolverError> {
        if labels.len() != expected {
            return Err(SolverError::LabelMismatch {
                kind,
                labels: labels.len(),
                expected,
            });
        }
        Ok(labels
            .iter()
            .map(|label| {
                if label.chars().count() > label_cap {
                    warn!("{} label {} truncated to {} characters", kind, label, label_cap);
                    label.chars().take(label_cap).collect()
                } else {
                    label.clone()
                }
            })
            .collect())
    }

    fn checked_bounds(
        bounds: &[(f64, f64)],
        expected: usize,
        kind: &'static str,
    ) -> Result<Vec<(f64, f64)>, SolverError> {
        if bounds.len() != expected {
            return Err(SolverError::BoundsLengthMismatch {
                kind,
                bounds: bounds.len(),
                expected,
            });
        }
        for (index, &(lower, upper)) in bounds.iter().enumerate() {
            if lower.is_nan() || upper.is_nan() || lower > upper {
                return Err(SolverError::InvalidBounds {
                    kind,
                    index,
                    lower,
                    upper,
                });
            }
        }
        Ok(bounds.to_vec())
    }

    fn set_row_bounds(&mut self, bounds: &[(f64, f64)]) -> Result<(), SolverError> {
        self.row_bounds = Self::checked_bounds(bounds, self.matrix.nrows(), "row")?;
        Ok(())
    }

    fn set_col_bounds(&mut self, bounds: &[(f64, f64)]) -> Result<(), SolverError> {
        self.col_bounds = Self::checked_bounds(bounds, self.matrix.ncols(), "column")?;
        Ok(())
    }

    fn set_objective(&mut self, coefficients: &[f64]) -> Result<(), SolverError> {
        if coefficients.len() != self.matrix.ncols() {
            return Err(SolverError::ObjectiveLengthMismatch {
                coefficients: coefficients.len(),
                expected: self.matrix.ncols(),
            });
        }
        self.objective = coefficients.to_vec();
        Ok(())
    }

    /// Store what the backend found and turn it into a solution
    fn record(&mut self, raw: RawSolution) -> ProblemSolution {
        self.status = raw.status;
        self.primals = raw.primals;
        let objective_value = self.primals.as_ref().map(|x| {
            self.objective
                .iter()
                .zip(x)
                .map(|(c, v)| c * v)
                .sum::<f64>()
        });
        let variable_values = match (&self.col_labels, &self.primals) {
            (Some(labels), Some(x)) => Some(labels.iter().cloned().zip(x.iter().copied()).collect()),
            _ => None,
        };
        ProblemSolution {
            status: self.status,
            objective_value,
            variable_values,
            dual_values: None,
        }
    }

    pub fn matrix(&self) -> &CscMatrix<f64> {
        &self.matrix
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn row_bounds(&self) -> &[(f64, f64)] {
        &self.row_bounds
    }

    pub fn col_bounds(&self) -> &[(f64, f64)] {
        &self.col_bounds
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn status(&self) -> OptimizationStatus {
        self.status
    }

    /// The non-zero entries of each row as (column, value) pairs
    pub fn row_entries(&self) -> Vec<Vec<(usize, f64)>> {
        let mut rows = vec![Vec::new(); self.matrix.nrows()];
        for (i, j, v) in self.matrix.triplet_iter() {
            if *v != 0.0 {
                rows[i].push((j, *v));
            }
        }
        rows
    }

    fn col_primals(&self) -> Result<&[f64], SolverError> {
        match &self.primals {
            Some(x) => Ok(x),
            None => Err(SolverError::NotSolved),
        }
    }

    fn row_primals(&self) -> Result<Vec<f64>, SolverError> {
        let x = self.col_primals()?;
        let mut activity = vec![0.; self.matrix.nrows()];
        for (i, j, v) in self.matrix.triplet_iter() {
            activity[i] += v * x[j];
        }
        Ok(activity)
    }

    fn col_primal_hash(&self) -> Result<IndexMap<String, f64>, SolverError> {
        let x = self.col_primals()?;
        let labels = self.col_labels.as_ref().ok_or(SolverError::Unlabelled)?;
        Ok(labels.iter().cloned().zip(x.iter().copied()).collect())
    }

    fn row_primal_hash(&self) -> Result<IndexMap<String, f64>, SolverError> {
        let activity = self.row_primals()?;
        let labels = self.row_labels.as_ref().ok_or(SolverError::Unlabelled)?;
        Ok(labels.iter().cloned().zip(activity).collect())
    }
}

/// Errors associated with loading and solving a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Tried to use the solver before a model was loaded
    #[error("No model has been loaded into the solver")]
    NotLoaded,
    /// Tried to read back values before a successful solve
    #[error("The loaded model has not been solved")]
    NotSolved,
    /// Tried to read back values by label from a model loaded without labels
    #[error("The loaded model has no labels")]
    Unlabelled,
    /// The number of labels doesn't match the matrix
    #[error("The size of {kind} labels ({labels}) does not match the expected number ({expected})")]
    LabelMismatch {
        kind: &'static str,
        labels: usize,
        expected: usize,
    },
    /// The number of bounds doesn't match the matrix
    #[error("There must be the same number of {kind} bounds as {kind}s, got {bounds} expected {expected}")]
    BoundsLengthMismatch {
        kind: &'static str,
        bounds: usize,
        expected: usize,
    },
    /// A bound pair with lower > upper, or a NaN
    #[error("Invalid bounds ({lower}, {upper}) for {kind} {index}")]
    InvalidBounds {
        kind: &'static str,
        index: usize,
        lower: f64,
        upper: f64,
    },
    /// The number of objective coefficients doesn't match the number of columns
    #[error("Got {coefficients} objective coefficients for {expected} columns")]
    ObjectiveLengthMismatch { coefficients: usize, expected: usize },
    /// The backend failed in a way that isn't a property of the model
    #[error("{solver} failed: {message}")]
    Backend {
        solver: &'static str,
        message: String,
    },
}
