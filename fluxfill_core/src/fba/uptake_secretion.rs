//! Synthesis of the boundary reactions that exchange external compounds with the medium
use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;

use crate::metabolism::reaction::{Direction, Reaction, ReactionError};
use crate::metabolism::CompoundRegistry;

/// Prefix of every synthesized boundary reaction name
pub const UPTAKE_SECRETION_PREFIX: &str = "UPTAKE_SECRETION_REACTION";

/// Name of the boundary reaction for a compound id
pub fn uptake_secretion_name(compound_id: &str) -> String {
    format!("{} {}", UPTAKE_SECRETION_PREFIX, compound_id)
}

/// Create a boundary reaction for every external compound among `compound_ids`
///
/// Each reaction has the compound on the left with an abundance of 1, nothing on the
/// right, and can run in both directions so the compound can be taken up or secreted.
/// The bounds are left unset; whether uptake is allowed depends on the medium and is
/// decided when the column bounds are computed.
///
/// # Parameters
/// - `compound_ids`: ids of the rows of the stoichiometric matrix
/// - `compounds`: registry the ids are looked up in, ids that aren't registered are skipped
pub fn uptake_and_secretion_reactions(
    compound_ids: &BTreeSet<String>,
    compounds: &CompoundRegistry,
) -> Result<IndexMap<String, Reaction>, ReactionError> {
    let mut boundary = IndexMap::new();
    for id in compound_ids {
        let compound = match compounds.get(id) {
            Some(compound) => compound,
            None => {
                debug!("Compound {} is not registered, no boundary reaction made", id);
                continue;
            }
        };
        if !compound.is_external() {
            continue;
        }
        let name = uptake_secretion_name(id);
        let mut reaction =
            Reaction::from_sides(&name, Direction::Bidirectional, &[(compound.clone(), 1.0)], &[])?;
        reaction.equation = Some(format!("(1) {} <=> ", compound));
        reaction.is_uptake_secretion = true;
        boundary.insert(name, reaction);
    }
    Ok(boundary)
}
