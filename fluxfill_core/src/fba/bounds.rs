//! Flux bounds of the reactions (columns) and compounds (rows) of a flux balance run
use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::configuration::Configuration;
use crate::fba::{FbaMode, BIOMASS_EQN};
use crate::metabolism::compound::Compound;
use crate::metabolism::reaction::{Direction, Reaction};
use crate::metabolism::ReactionRegistry;
use crate::optimize::solvers::{Solver, SolverError};

/// Set the bounds of every column and return them keyed by reaction name
///
/// Reactions with both bounds set keep them. Otherwise boundary and transport reactions
/// can only run backwards (taking compounds up) when every external compound they
/// consume is in the medium, and other reactions are bounded by their direction.
///
/// # Parameters
/// - `reactions`: the reaction registry
/// - `columns`: reaction names in column order
/// - `media`: compounds available for uptake
/// - `mode`: in likelihood mode the biomass flux has a positive lower bound
/// - `config`: supplies the default lower and upper bounds
pub fn reaction_bounds<S: Solver + ?Sized>(
    solver: &mut S,
    reactions: &ReactionRegistry,
    columns: &[String],
    media: &BTreeSet<Compound>,
    mode: &FbaMode,
    config: &Configuration,
) -> Result<IndexMap<String, (f64, f64)>, SolverError> {
    let bounds = column_bounds(reactions, columns, media, mode, config);
    let ordered: Vec<(f64, f64)> = bounds.values().copied().collect();
    solver.col_bounds(&ordered)?;
    Ok(bounds)
}

/// Compute the column bounds without touching a solver
pub fn column_bounds(
    reactions: &ReactionRegistry,
    columns: &[String],
    media: &BTreeSet<Compound>,
    mode: &FbaMode,
    config: &Configuration,
) -> IndexMap<String, (f64, f64)> {
    let (lower, upper) = (config.lower_bound, config.upper_bound);
    let mut media_boundary = 0;
    let mut other_boundary = 0;
    let mut bounds = IndexMap::with_capacity(columns.len());

    for name in columns {
        if name == BIOMASS_EQN {
            let min = if mode.is_likelihood() {
                config.likelihood_biomass_minimum
            } else {
                0.
            };
            bounds.insert(name.clone(), (min, upper));
            continue;
        }
        let reaction = match reactions.get(name) {
            Some(reaction) => reaction,
            None => {
                warn!("Did not find {} in reactions, treating it as bidirectional", name);
                bounds.insert(name.clone(), (lower, upper));
                continue;
            }
        };
        if let (Some(lb), Some(ub)) = (reaction.lower_bound, reaction.upper_bound) {
            bounds.insert(name.clone(), (lb, ub));
            continue;
        }
        if reaction.is_uptake_secretion || reaction.is_transport {
            if takes_up_from_media(reaction, media) {
                media_boundary += 1;
                bounds.insert(name.clone(), (lower, upper));
            } else {
                other_boundary += 1;
                bounds.insert(name.clone(), (0., upper));
            }
            continue;
        }
        let pair = match reaction.direction {
            Direction::Bidirectional => (lower, upper),
            Direction::Forward => (0., upper),
            // Reverse reactions are left open in both directions
            Direction::Reverse => (lower, upper),
            Direction::Unknown => {
                warn!("Direction of {} is unknown, only running it forwards", name);
                (0., upper)
            }
        };
        bounds.insert(name.clone(), pair);
    }
    debug!(
        "Found {} media uptake and secretion reactions and {} other uptake and secretion reactions",
        media_boundary, other_boundary
    );
    bounds
}

/// Whether a boundary or transport reaction has an external compound in the medium on its
/// left side, and no external compound missing from the medium
fn takes_up_from_media(reaction: &Reaction, media: &BTreeSet<Compound>) -> bool {
    let mut in_media = false;
    for compound in reaction.left_compounds().iter().filter(|c| c.is_external()) {
        if media.contains(compound) {
            in_media = true;
        } else {
            return false;
        }
    }
    in_media
}

/// Set every row to the same bounds, (0, 0) for steady state, and return them keyed by
/// compound id
pub fn compound_bounds<S: Solver + ?Sized>(
    solver: &mut S,
    compounds: &[String],
    lower: f64,
    upper: f64,
) -> Result<IndexMap<String, (f64, f64)>, SolverError> {
    solver.row_bounds(&vec![(lower, upper); compounds.len()])?;
    Ok(compounds
        .iter()
        .map(|c| (c.clone(), (lower, upper)))
        .collect())
}
