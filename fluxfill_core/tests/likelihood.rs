//! Likelihood runs with no forced biomass flux
//!
//! Installs a process wide configuration, so it lives in its own test binary.
use std::collections::BTreeSet;
use std::path::PathBuf;

use fluxfill_core::configuration::Configuration;
use fluxfill_core::fba::{run_fba, FbaMode, BIOMASS_EQN};
use fluxfill_core::io::json::GapfillProblem;
use fluxfill_core::optimize::solvers::ClarabelSolver;
use indexmap::IndexMap;

fn chain() -> GapfillProblem {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join("chain.json");
    GapfillProblem::read_json(path).unwrap()
}

#[test]
fn zero_biomass_minimum() {
    let _ = env_logger::builder().is_test(true).try_init();
    Configuration {
        likelihood_biomass_minimum: 0.,
        ..Configuration::default()
    }
    .install()
    .unwrap();

    let mut problem = chain();
    let conditions = problem.conditions();
    let mode = FbaMode::Likelihood {
        reaction_probs: IndexMap::from([("rxn2".to_string(), 0.9)]),
        original_reactions: BTreeSet::from(["rxn1".to_string()]),
    };
    let mut solver = ClarabelSolver::new();

    // Without rxn2 nothing reaches C, all zero fluxes are feasible but that isn't growth
    let broken = BTreeSet::from(["rxn1".to_string()]);
    let outcome = run_fba(
        &mut solver,
        &mut problem.compounds,
        &mut problem.reactions,
        &broken,
        &conditions,
        &mode,
    )
    .unwrap();
    assert!(outcome.status.is_optimal());
    assert!(!outcome.growth);

    let full = BTreeSet::from(["rxn1".to_string(), "rxn2".to_string()]);
    let outcome = run_fba(
        &mut solver,
        &mut problem.compounds,
        &mut problem.reactions,
        &full,
        &conditions,
        &mode,
    )
    .unwrap();
    assert!(outcome.growth);
    assert!(outcome.fluxes.unwrap()[BIOMASS_EQN] > 1.);
}
