//! Flux balance analysis of a reaction network in a medium
//!
//! A run builds the stoichiometric matrix for a set of reactions, loads it into a
//! [`Solver`], sets the reaction and compound bounds, solves, and decides whether the
//! network grows. Not growing is a normal outcome, only solver and data errors are
//! returned as errors.
pub mod bounds;
pub mod stoichiometry;
pub mod uptake_secretion;

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::fba::bounds::{compound_bounds, reaction_bounds};
use crate::fba::stoichiometry::StoichiometryBuilder;
use crate::metabolism::compound::Compound;
use crate::metabolism::reaction::{Reaction, ReactionError};
use crate::metabolism::{CompoundRegistry, ReactionRegistry};
use crate::optimize::solvers::{Solver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

/// Name of the column holding the biomass equation, always the last column
pub const BIOMASS_EQN: &str = "BIOMASS_EQN";

/// How the objective of a run is formed
#[derive(Clone, Debug, Default)]
pub enum FbaMode {
    /// Maximize the flux through the biomass equation
    #[default]
    Standard,
    /// Minimize the penalty of the reactions used, while forcing a minimal biomass flux
    ///
    /// Reactions in `original_reactions` carry no penalty, others are penalized by one
    /// minus their probability, or by 1 if no probability is known.
    Likelihood {
        reaction_probs: IndexMap<String, f64>,
        original_reactions: BTreeSet<String>,
    },
}

impl FbaMode {
    pub fn is_likelihood(&self) -> bool {
        matches!(self, FbaMode::Likelihood { .. })
    }
}

/// The medium a network grows in and what growing means
#[derive(Clone, Debug)]
pub struct GrowthConditions {
    /// Compounds available for uptake
    pub media: BTreeSet<Compound>,
    /// Equation consuming the compounds needed to grow
    pub biomass: Reaction,
    /// Boundary reactions to use, synthesized from the external compounds if None
    pub uptake_secretion: Option<IndexMap<String, Reaction>>,
}

impl GrowthConditions {
    pub fn new(media: BTreeSet<Compound>, biomass: Reaction) -> Self {
        GrowthConditions {
            media,
            biomass,
            uptake_secretion: None,
        }
    }
}

/// Result of a single flux balance run
#[derive(Clone, Debug)]
pub struct FbaOutcome {
    pub status: OptimizationStatus,
    /// Objective value, None if the solver found no solution
    pub value: Option<f64>,
    /// Whether the network grows
    pub growth: bool,
    /// Flux through every column, None if the solver found no solution
    pub fluxes: Option<IndexMap<String, f64>>,
}

/// Run flux balance analysis on a set of reactions
///
/// # Parameters
/// - `solver`: backend the model is loaded into, any previous model is erased
/// - `compounds`: compound registry, compounds first seen in the medium or biomass are added
/// - `reactions`: reaction registry, synthesized boundary reactions are added
/// - `reactions_to_run`: names of the reactions making up the network
/// - `conditions`: medium, biomass equation and boundary reactions
/// - `mode`: standard or likelihood objective
pub fn run_fba<S: Solver + ?Sized>(
    solver: &mut S,
    compounds: &mut CompoundRegistry,
    reactions: &mut ReactionRegistry,
    reactions_to_run: &BTreeSet<String>,
    conditions: &GrowthConditions,
    mode: &FbaMode,
) -> Result<FbaOutcome, FbaError> {
    let config = Configuration::current();
    let sm = StoichiometryBuilder::new(reactions_to_run, &conditions.media, &conditions.biomass)
        .uptake_secretion(conditions.uptake_secretion.as_ref())
        .mode(mode)
        .load(solver, compounds, reactions)?;
    debug!(
        "Running {} FBA on {} compounds and {} reactions with {}",
        if mode.is_likelihood() { "likelihood" } else { "standard" },
        sm.compounds.len(),
        sm.reactions.len(),
        solver.name()
    );

    reaction_bounds(
        solver,
        reactions,
        &sm.reactions,
        &conditions.media,
        mode,
        &config,
    )?;
    compound_bounds(solver, &sm.compounds, 0., 0.)?;

    let solution = solver.solve()?;
    let growth = classify_growth(&solution, mode, &config);
    debug!(
        "FBA finished with status {:?} and objective {:?}",
        solution.status, solution.objective_value
    );
    Ok(FbaOutcome {
        status: solution.status,
        value: solution.objective_value,
        growth,
        fluxes: solution.variable_values,
    })
}

/// Decide whether a solution means the network grows
///
/// In standard mode the objective, the biomass flux, has to exceed the growth threshold.
/// In likelihood mode the objective is a penalty, so the biomass column of the solution
/// has to reach the threshold, within the configured tolerance.
pub fn classify_growth(solution: &ProblemSolution, mode: &FbaMode, config: &Configuration) -> bool {
    if !solution.is_optimal() {
        return false;
    }
    match mode {
        FbaMode::Standard => solution
            .objective_value
            .is_some_and(|v| v > config.growth_threshold),
        FbaMode::Likelihood { .. } => solution
            .variable_values
            .as_ref()
            .and_then(|fluxes| fluxes.get(BIOMASS_EQN))
            .is_some_and(|&flux| flux + config.tolerance > config.growth_threshold),
    }
}

/// Errors associated with running flux balance analysis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FbaError {
    /// Tried to run a reaction which isn't in the reaction registry
    #[error("Reaction {0} is not in the reaction registry")]
    UnknownReaction(String),
    /// A reaction in the network uses the name reserved for the biomass column
    #[error("Reaction name {0} is reserved for the biomass equation")]
    ReservedName(String),
    /// A reaction in the network is malformed
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    /// The solver rejected the model or failed
    #[error(transparent)]
    Solver(#[from] SolverError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::solvers::ClarabelSolver;

    fn solution(status: OptimizationStatus, value: Option<f64>) -> ProblemSolution {
        ProblemSolution {
            status,
            objective_value: value,
            variable_values: None,
            dual_values: None,
        }
    }

    fn with_biomass(status: OptimizationStatus, value: f64, biomass: f64) -> ProblemSolution {
        ProblemSolution {
            status,
            objective_value: Some(value),
            variable_values: Some(IndexMap::from([
                ("rxn1".to_string(), biomass),
                (BIOMASS_EQN.to_string(), biomass),
            ])),
            dual_values: None,
        }
    }

    #[test]
    fn growth_classification() {
        let config = Configuration::default();
        let standard = FbaMode::Standard;
        assert!(classify_growth(
            &solution(OptimizationStatus::Optimal, Some(1.)),
            &standard,
            &config
        ));
        assert!(classify_growth(
            &solution(OptimizationStatus::AlmostOptimal, Some(1.)),
            &standard,
            &config
        ));
        assert!(!classify_growth(
            &solution(OptimizationStatus::Optimal, Some(1e-9)),
            &standard,
            &config
        ));
        assert!(!classify_growth(
            &solution(OptimizationStatus::Infeasible, None),
            &standard,
            &config
        ));
    }

    #[test]
    fn likelihood_growth_needs_biomass_flux() {
        let config = Configuration::default();
        let likelihood = FbaMode::Likelihood {
            reaction_probs: IndexMap::new(),
            original_reactions: BTreeSet::new(),
        };
        // A zero penalty with biomass flowing is growth
        assert!(classify_growth(
            &with_biomass(OptimizationStatus::Optimal, 0., 10.),
            &likelihood,
            &config
        ));
        // Biomass held at the minimum, up to solver accuracy
        assert!(classify_growth(
            &with_biomass(OptimizationStatus::Optimal, 0., config.growth_threshold - 1e-9),
            &likelihood,
            &config
        ));
        // An optimal solution without biomass flux is not growth
        assert!(!classify_growth(
            &with_biomass(OptimizationStatus::Optimal, 0., 0.),
            &likelihood,
            &config
        ));
        assert!(!classify_growth(
            &solution(OptimizationStatus::Optimal, Some(0.)),
            &likelihood,
            &config
        ));
        assert!(!classify_growth(
            &solution(OptimizationStatus::Unbounded, None),
            &likelihood,
            &config
        ));
    }

    /// A (e) -> B (c) -> C (c), with the biomass consuming C
    fn chain() -> (CompoundRegistry, ReactionRegistry, GrowthConditions) {
        let a = Compound::external("A");
        let b = Compound::new("B", Some("c"));
        let c = Compound::new("C", Some("c"));
        let mut compounds = CompoundRegistry::new();
        for compound in [&a, &b, &c] {
            compounds.insert(compound.id(), compound.clone());
        }
        let mut reactions = ReactionRegistry::new();
        for (name, left, right) in [("rxn1", &a, &b), ("rxn2", &b, &c)] {
            let reaction = Reaction::from_sides(
                name,
                crate::metabolism::reaction::Direction::Forward,
                &[(left.clone(), 1.)],
                &[(right.clone(), 1.)],
            )
            .unwrap();
            reactions.insert(name.to_string(), reaction);
        }
        let mut biomass = Reaction::from_sides(
            BIOMASS_EQN,
            crate::metabolism::reaction::Direction::Forward,
            &[(c, 1.)],
            &[],
        )
        .unwrap();
        biomass.is_biomass_reaction = true;
        let conditions = GrowthConditions::new(BTreeSet::from([a]), biomass);
        (compounds, reactions, conditions)
    }

    #[test]
    fn chain_grows() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (mut compounds, mut reactions, conditions) = chain();
        let mut solver = ClarabelSolver::new();
        let to_run = BTreeSet::from(["rxn1".to_string(), "rxn2".to_string()]);
        let outcome = run_fba(
            &mut solver,
            &mut compounds,
            &mut reactions,
            &to_run,
            &conditions,
            &FbaMode::Standard,
        )
        .unwrap();
        assert!(outcome.growth);
        assert!((outcome.value.unwrap() - 1000.).abs() < 1e-2);
        let fluxes = outcome.fluxes.unwrap();
        assert!(fluxes["UPTAKE_SECRETION_REACTION A (e)"] < -999.);
        // The boundary reaction is now in the registry
        assert!(reactions.contains_key("UPTAKE_SECRETION_REACTION A (e)"));
    }

    #[test]
    fn broken_chain_does_not_grow() {
        let (mut compounds, mut reactions, conditions) = chain();
        let mut solver = ClarabelSolver::new();
        let to_run = BTreeSet::from(["rxn1".to_string()]);
        let outcome = run_fba(
            &mut solver,
            &mut compounds,
            &mut reactions,
            &to_run,
            &conditions,
            &FbaMode::Standard,
        )
        .unwrap();
        assert!(!outcome.growth);
    }

    #[test]
    fn likelihood_chain() {
        let (mut compounds, mut reactions, conditions) = chain();
        let mut solver = ClarabelSolver::new();
        let to_run = BTreeSet::from(["rxn1".to_string(), "rxn2".to_string()]);
        let mode = FbaMode::Likelihood {
            reaction_probs: IndexMap::from([("rxn2".to_string(), 0.75)]),
            original_reactions: BTreeSet::from(["rxn1".to_string()]),
        };
        let outcome = run_fba(
            &mut solver,
            &mut compounds,
            &mut reactions,
            &to_run,
            &conditions,
            &mode,
        )
        .unwrap();
        assert!(outcome.growth);
        // rxn2 costs 0.25 per unit while the uptake runs negative at a cost of 1, so the
        // penalty is lowest at the maximal flux of 1000
        let value = outcome.value.unwrap();
        assert!((value + 750.).abs() < 1e-2);

        let broken = BTreeSet::from(["rxn1".to_string()]);
        let outcome = run_fba(
            &mut solver,
            &mut compounds,
            &mut reactions,
            &broken,
            &conditions,
            &mode,
        )
        .unwrap();
        assert!(!outcome.growth);
        assert_eq!(outcome.status, OptimizationStatus::Infeasible);
    }

    #[test]
    fn unknown_reaction() {
        let (mut compounds, mut reactions, conditions) = chain();
        let mut solver = ClarabelSolver::new();
        let to_run = BTreeSet::from(["rxn9".to_string()]);
        if let Err(FbaError::UnknownReaction(name)) = run_fba(
            &mut solver,
            &mut compounds,
            &mut reactions,
            &to_run,
            &conditions,
            &FbaMode::Standard,
        ) {
            assert_eq!(name, "rxn9");
        } else {
            panic!("Unknown reaction not caught")
        }
    }
}
