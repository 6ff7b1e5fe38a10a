//! Assembly of the stoichiometric matrix and objective for a flux balance run
//!
//! Rows are compounds, sorted by id. Columns are the sorted reactions to run, then the
//! boundary reactions in the order they were registered, then [`BIOMASS_EQN`], which is
//! always last so that the objective can address it by position.
use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use log::debug;
use nalgebra::DMatrix;
use nalgebra_sparse::convert::serial::convert_csc_dense;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::fba::uptake_secretion::uptake_and_secretion_reactions;
use crate::fba::{FbaError, FbaMode, BIOMASS_EQN};
use crate::metabolism::compound::Compound;
use crate::metabolism::reaction::Reaction;
use crate::metabolism::{CompoundRegistry, ReactionRegistry};
use crate::optimize::objective::Objective;
use crate::optimize::solvers::Solver;

/// A stoichiometric matrix with its row and column labels and objective
#[derive(Clone, Debug)]
pub struct StoichiometricMatrix {
    /// Compound ids, one per row
    pub compounds: Vec<String>,
    /// Reaction names, one per column, ending with [`BIOMASS_EQN`]
    pub reactions: Vec<String>,
    pub matrix: CscMatrix<f64>,
    pub objective: Objective,
}

impl StoichiometricMatrix {
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.matrix.nrows(), self.matrix.ncols())
    }

    /// Dense copy of the matrix, for inspection
    pub fn dense(&self) -> DMatrix<f64> {
        convert_csc_dense(&self.matrix)
    }

    /// Coefficient of a compound in a reaction, 0 if either isn't in the matrix
    pub fn coefficient(&self, compound: &str, reaction: &str) -> f64 {
        let row = self.compounds.iter().position(|c| c == compound);
        let col = self.reactions.iter().position(|r| r == reaction);
        match (row, col) {
            (Some(i), Some(j)) => self
                .matrix
                .get_entry(i, j)
                .map(|entry| entry.into_value())
                .unwrap_or(0.),
            _ => 0.,
        }
    }
}

/// Builds the stoichiometric matrix for a set of reactions growing in a medium
///
/// # Examples
/// ```rust
/// use std::collections::BTreeSet;
/// use fluxfill_core::fba::stoichiometry::StoichiometryBuilder;
/// use fluxfill_core::metabolism::compound::Compound;
/// use fluxfill_core::metabolism::reaction::{Direction, Reaction};
/// use fluxfill_core::metabolism::{CompoundRegistry, ReactionRegistry};
///
/// let a = Compound::external("A");
/// let b = Compound::new("B", Some("c"));
/// let mut reactions = ReactionRegistry::new();
/// reactions.insert(
///     "rxn1".to_string(),
///     Reaction::from_sides("rxn1", Direction::Forward, &[(a.clone(), 1.)], &[(b.clone(), 1.)]).unwrap(),
/// );
/// let biomass = Reaction::from_sides("biomass", Direction::Forward, &[(b, 1.)], &[]).unwrap();
/// let to_run = BTreeSet::from(["rxn1".to_string()]);
/// let media = BTreeSet::from([a]);
/// let mut compounds = CompoundRegistry::new();
///
/// let sm = StoichiometryBuilder::new(&to_run, &media, &biomass)
///     .build(&mut compounds, &mut reactions)
///     .unwrap();
/// // rxn1, the uptake of A, and the biomass
/// assert_eq!(sm.shape(), (2, 3));
/// ```
#[derive(Clone, Debug)]
pub struct StoichiometryBuilder<'a> {
    reactions_to_run: &'a BTreeSet<String>,
    media: &'a BTreeSet<Compound>,
    biomass: &'a Reaction,
    uptake_secretion: Option<&'a IndexMap<String, Reaction>>,
    mode: Option<&'a FbaMode>,
}

impl<'a> StoichiometryBuilder<'a> {
    pub fn new(
        reactions_to_run: &'a BTreeSet<String>,
        media: &'a BTreeSet<Compound>,
        biomass: &'a Reaction,
    ) -> Self {
        StoichiometryBuilder {
            reactions_to_run,
            media,
            biomass,
            uptake_secretion: None,
            mode: None,
        }
    }

    /// Use these boundary reactions instead of synthesizing them
    pub fn uptake_secretion(mut self, uptake_secretion: Option<&'a IndexMap<String, Reaction>>) -> Self {
        self.uptake_secretion = uptake_secretion;
        self
    }

    /// Objective policy, standard if not set
    pub fn mode(mut self, mode: &'a FbaMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Build the matrix, registering new compounds and the boundary reactions
    pub fn build(
        self,
        compounds: &mut CompoundRegistry,
        reactions: &mut ReactionRegistry,
    ) -> Result<StoichiometricMatrix, FbaError> {
        // (compound id, column) -> coefficient, a later write to the same cell replaces it
        let mut cells: BTreeMap<(String, String), f64> = BTreeMap::new();
        let mut rows: BTreeSet<String> = BTreeSet::new();

        if self.reactions_to_run.contains(BIOMASS_EQN) {
            return Err(FbaError::ReservedName(BIOMASS_EQN.to_string()));
        }

        for compound in self.media {
            register(compounds, compound);
            rows.insert(compound.id());
        }

        for name in self.reactions_to_run {
            let reaction = reactions
                .get(name)
                .ok_or_else(|| FbaError::UnknownReaction(name.clone()))?;
            for compound in reaction.left_compounds().iter().chain(reaction.right_compounds()) {
                register(compounds, compound);
            }
            fold(&mut cells, &mut rows, name, reaction, true)?;
        }

        for compound in self.biomass.all_compounds() {
            register(compounds, &compound);
        }
        fold(&mut cells, &mut rows, BIOMASS_EQN, self.biomass, true)?;

        let synthesized;
        let boundary = match self.uptake_secretion {
            Some(boundary) if !boundary.is_empty() => boundary,
            _ => {
                synthesized = uptake_and_secretion_reactions(&rows, compounds)?;
                &synthesized
            }
        };
        let mut boundary_columns = Vec::with_capacity(boundary.len());
        for reaction in boundary.values() {
            if reaction.name == BIOMASS_EQN {
                return Err(FbaError::ReservedName(reaction.name.clone()));
            }
            // Keep an existing entry, it may carry gapfill provenance from earlier runs
            reactions
                .entry(reaction.name.clone())
                .or_insert_with(|| reaction.clone());
            if self.reactions_to_run.contains(&reaction.name) {
                debug!("Boundary reaction {} is already being run", reaction.name);
                continue;
            }
            for compound in reaction.left_compounds() {
                register(compounds, compound);
            }
            // Only the left side of a boundary reaction is part of the network
            fold(&mut cells, &mut rows, &reaction.name, reaction, false)?;
            boundary_columns.push(reaction.name.clone());
        }

        let compound_ids: Vec<String> = rows.into_iter().collect();
        let reaction_ids: Vec<String> = self
            .reactions_to_run
            .iter()
            .cloned()
            .chain(boundary_columns)
            .chain([BIOMASS_EQN.to_string()])
            .collect();

        let row_index: IndexMap<&str, usize> = compound_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let col_index: IndexMap<&str, usize> = reaction_ids
            .iter()
            .enumerate()
            .map(|(j, id)| (id.as_str(), j))
            .collect();
        let mut coo = CooMatrix::new(compound_ids.len(), reaction_ids.len());
        for ((compound, reaction), value) in &cells {
            if let (Some(&i), Some(&j)) = (
                row_index.get(compound.as_str()),
                col_index.get(reaction.as_str()),
            ) {
                coo.push(i, j, *value);
            }
        }
        let matrix = CscMatrix::from(&coo);

        let objective = match self.mode.unwrap_or(&FbaMode::Standard) {
            FbaMode::Standard => standard_objective(reaction_ids.len()),
            FbaMode::Likelihood {
                reaction_probs,
                original_reactions,
            } => likelihood_objective(&reaction_ids, reaction_probs, original_reactions),
        };

        debug!(
            "Built a {} by {} stoichiometric matrix with {} non-zero entries",
            compound_ids.len(),
            reaction_ids.len(),
            matrix.nnz()
        );
        Ok(StoichiometricMatrix {
            compounds: compound_ids,
            reactions: reaction_ids,
            matrix,
            objective,
        })
    }

    /// Build the matrix and load it, with its labels and objective, into a solver
    pub fn load<S: Solver + ?Sized>(
        self,
        solver: &mut S,
        compounds: &mut CompoundRegistry,
        reactions: &mut ReactionRegistry,
    ) -> Result<StoichiometricMatrix, FbaError> {
        let sm = self.build(compounds, reactions)?;
        solver.load(
            &sm.matrix,
            Some(sm.compounds.as_slice()),
            Some(sm.reactions.as_slice()),
            sm.objective.sense,
        )?;
        solver.objective_coefficients(&sm.objective.coefficients)?;
        Ok(sm)
    }
}

fn register(compounds: &mut CompoundRegistry, compound: &Compound) {
    compounds
        .entry(compound.id())
        .or_insert_with(|| compound.clone());
}

/// Write the coefficients of a reaction into the cells of its column
fn fold(
    cells: &mut BTreeMap<(String, String), f64>,
    rows: &mut BTreeSet<String>,
    column: &str,
    reaction: &Reaction,
    include_right: bool,
) -> Result<(), FbaError> {
    for compound in reaction.left_compounds() {
        let abundance = reaction.get_left_compound_abundance(compound)?;
        rows.insert(compound.id());
        cells.insert((compound.id(), column.to_string()), -abundance);
    }
    if include_right {
        for compound in reaction.right_compounds() {
            let abundance = reaction.get_right_compound_abundance(compound)?;
            rows.insert(compound.id());
            cells.insert((compound.id(), column.to_string()), abundance);
        }
    }
    Ok(())
}

/// Maximize the flux through the last column
pub fn standard_objective(columns: usize) -> Objective {
    let mut coefficients = vec![0.; columns];
    if let Some(last) = coefficients.last_mut() {
        *last = 1.;
    }
    Objective::new_maximize(coefficients)
}

/// Minimize the penalty of using reactions that weren't in the original network
///
/// Original reactions cost nothing, reactions with a known probability cost one minus
/// that probability, all others cost 1. The last column, the biomass, costs nothing.
pub fn likelihood_objective(
    columns: &[String],
    reaction_probs: &IndexMap<String, f64>,
    original_reactions: &BTreeSet<String>,
) -> Objective {
    let mut coefficients: Vec<f64> = columns
        .iter()
        .map(|r| {
            if original_reactions.contains(r) {
                0.
            } else if let Some(p) = reaction_probs.get(r) {
                (1. - p).clamp(0., 1.)
            } else {
                1.
            }
        })
        .collect();
    if let Some(last) = coefficients.last_mut() {
        *last = 0.;
    }
    Objective::new_minimize(coefficients)
}
