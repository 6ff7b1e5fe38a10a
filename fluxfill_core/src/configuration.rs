//! Process wide defaults used when building and solving flux balance problems
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Default lower flux bound for reactions without explicit bounds
    pub lower_bound: f64,
    /// Default upper flux bound for reactions without explicit bounds
    pub upper_bound: f64,
    /// Solver feasibility and gap tolerance, also the slack allowed when checking growth
    pub tolerance: f64,
    /// Biomass flux that must be exceeded for a model to be considered growing
    pub growth_threshold: f64,
    /// Lower bound on the biomass flux when running in likelihood mode
    pub likelihood_biomass_minimum: f64,
    /// Maximum length of a row or column label handed to a solver
    pub label_cap: usize,
    pub solver: SolverKind,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            growth_threshold: 1e-03,
            likelihood_biomass_minimum: 1e-03,
            label_cap: 255,
            solver: SolverKind::Clarabel,
        }
    }
}

impl Configuration {
    /// Read a configuration from a JSON file, missing keys take their default values
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Configuration, ConfigurationError> {
        let data = fs::read_to_string(path).map_err(|_| ConfigurationError::FileNotFound)?;
        Self::from_json_str(&data)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(data: &str) -> Result<Configuration, ConfigurationError> {
        serde_json::from_str(data).map_err(|e| ConfigurationError::Deserialize(e.to_string()))
    }

    /// Replace the process wide configuration with this one
    pub fn install(self) -> Result<(), ConfigurationError> {
        let mut global = CONFIGURATION
            .write()
            .map_err(|_| ConfigurationError::Poisoned)?;
        *global = self;
        Ok(())
    }

    /// Snapshot of the current process wide configuration
    pub fn current() -> Configuration {
        match CONFIGURATION.read() {
            Ok(config) => config.clone(),
            // A panic while holding the lock can't leave the plain data half written
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Enum used to specify the default solver to use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Use the Clarabel interior point solver
    Clarabel,
    /// Use the microlp simplex solver, requires the minilp feature to be enabled
    Microlp,
}

/// Errors associated with loading a configuration
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Configuration file could not be read")]
    FileNotFound,
    #[error("Configuration could not be deserialized: {0}")]
    Deserialize(String),
    #[error("Configuration lock was poisoned")]
    Poisoned,
}
