use std::collections::BTreeSet;

use fluxfill_core::configuration::Configuration;
use fluxfill_core::fba::{run_fba, FbaMode};
use fluxfill_core::gapfill::{CandidateSource, SourcePriority, StaticCandidates};
use fluxfill_core::io::json::GapfillProblem;
use fluxfill_core::optimize::solvers::solver_from_config;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error<E: std::fmt::Display>(err: E) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// A gapfill problem read from JSON
///
/// Reactions cache their input/output classification in a cell, so the class stays on
/// the thread that created it
#[pyclass(unsendable)]
struct PyGapfillProblem {
    inner: GapfillProblem,
}

#[pymethods]
impl PyGapfillProblem {
    #[staticmethod]
    fn read_json(path: String) -> PyResult<Self> {
        let inner = GapfillProblem::read_json(path).map_err(value_error)?;
        Ok(PyGapfillProblem { inner })
    }

    #[staticmethod]
    fn from_json_str(data: String) -> PyResult<Self> {
        let inner = GapfillProblem::from_json_str(&data).map_err(value_error)?;
        Ok(PyGapfillProblem { inner })
    }

    fn to_json_str(&self) -> PyResult<String> {
        self.inner.to_json_string().map_err(value_error)
    }

    fn reactions_to_run(&self) -> Vec<String> {
        self.inner.reactions_to_run.iter().cloned().collect()
    }

    /// Run FBA on the network, returning (status, objective value, growth)
    fn run_fba(&mut self) -> PyResult<(String, Option<f64>, bool)> {
        let conditions = self.inner.conditions();
        let mut solver = solver_from_config();
        let outcome = run_fba(
            &mut solver,
            &mut self.inner.compounds,
            &mut self.inner.reactions,
            &self.inner.reactions_to_run,
            &conditions,
            &FbaMode::Standard,
        )
        .map_err(value_error)?;
        Ok((format!("{:?}", outcome.status), outcome.value, outcome.growth))
    }

    /// Gapfill the network from batches of candidate reactions, keyed by their source
    ///
    /// Returns the final reaction set and whether it grows. Known source labels (e.g.
    /// "essential", "media") are tried in their usual order, other labels last.
    fn gapfill(&self, candidates: Vec<(String, Vec<String>)>) -> PyResult<(Vec<String>, bool)> {
        let mut sources: Vec<Box<dyn CandidateSource>> = candidates
            .into_iter()
            .map(|(label, reactions)| {
                let reactions: BTreeSet<String> = reactions.into_iter().collect();
                let source = match SourcePriority::ALL.iter().find(|p| p.label() == label) {
                    Some(priority) => StaticCandidates::new(*priority, reactions),
                    None => StaticCandidates::labelled(&label, reactions),
                };
                Box::new(source) as Box<dyn CandidateSource>
            })
            .collect();
        let mut session = self.inner.clone().into_session(solver_from_config());
        let result = session.gapfill(&mut sources).map_err(value_error)?;
        Ok((result.reactions.into_iter().collect(), result.grew))
    }
}

/// Replace the process wide configuration from a JSON string, missing keys use defaults
#[pyfunction]
fn configure(data: String) -> PyResult<()> {
    Configuration::from_json_str(&data)
        .and_then(Configuration::install)
        .map_err(value_error)
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(configure, m)?)?;
    m.add_class::<PyGapfillProblem>()?;
    Ok(())
}
