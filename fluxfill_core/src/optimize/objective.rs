//! Provides struct for representing the objective of a flux balance problem

/// Represents the linear objective of an optimization problem, one coefficient per column
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients of the objective, in column order
    pub coefficients: Vec<f64>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    pub sense: ObjectiveSense,
}

impl Objective {
    /// Create a new objective, with a given sense
    pub fn new(coefficients: Vec<f64>, sense: ObjectiveSense) -> Self {
        Self {
            coefficients,
            sense,
        }
    }

    /// Create a new maximization objective
    pub fn new_maximize(coefficients: Vec<f64>) -> Self {
        Self::new(coefficients, ObjectiveSense::Maximize)
    }

    /// Create a new minimization objective
    pub fn new_minimize(coefficients: Vec<f64>) -> Self {
        Self::new(coefficients, ObjectiveSense::Minimize)
    }

    /// Value of the objective for the given column values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}
