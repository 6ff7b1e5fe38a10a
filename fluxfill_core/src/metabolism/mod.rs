//! Module providing the compounds and reactions making up a metabolic network.

pub mod compound;
pub mod reaction;

use indexmap::IndexMap;

use crate::metabolism::compound::Compound;
use crate::metabolism::reaction::Reaction;

/// Map of compound ids to compounds, shared across a gapfilling session
pub type CompoundRegistry = IndexMap<String, Compound>;

/// Map of reaction names to reactions, shared across a gapfilling session
pub type ReactionRegistry = IndexMap<String, Reaction>;
