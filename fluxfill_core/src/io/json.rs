//! Module providing JSON IO for gapfill problems
//!
//! A problem lists its compounds once, and reactions refer to them by id. Each side of a
//! reaction is a map of compound id to its (non-negative) abundance on that side.
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::fba::GrowthConditions;
use crate::gapfill::GapfillSession;
use crate::io::IoError;
use crate::metabolism::compound::Compound;
use crate::metabolism::reaction::{Reaction, ReactionBuilder, ReactionError};
use crate::metabolism::{CompoundRegistry, ReactionRegistry};
use crate::optimize::solvers::Solver;

// region JSON Problem
/// Represents a JSON serialized gapfill problem
#[derive(Serialize, Deserialize)]
struct JsonProblem {
    compounds: Vec<Compound>,
    reactions: Vec<JsonReaction>,
    /// Ids of the compounds in the medium
    media: Vec<String>,
    biomass: JsonReaction,
    /// Names of the reactions making up the network before gapfilling
    reactions_to_run: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    description: Option<String>,
    equation: Option<String>,
    #[serde(default)]
    direction: String,
    #[serde(default)]
    left: IndexMap<String, f64>,
    #[serde(default)]
    right: IndexMap<String, f64>,
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
    #[serde(default)]
    p_lr: f64,
    #[serde(default)]
    p_rl: f64,
    #[serde(default)]
    enzymes: BTreeSet<String>,
    #[serde(default)]
    pegs: BTreeSet<String>,
    #[serde(default)]
    delta_g: f64,
    #[serde(default)]
    delta_g_error: f64,
    #[serde(default)]
    is_transport: bool,
    #[serde(default)]
    is_biomass_reaction: bool,
    #[serde(default)]
    is_gapfilled: bool,
    #[serde(default)]
    gapfill_method: String,
    #[serde(default)]
    is_uptake_secretion: bool,
}
// endregion JSON Problem

// region Conversions
impl JsonReaction {
    fn from_reaction(r: &Reaction) -> Result<Self, ReactionError> {
        let mut left = IndexMap::new();
        for compound in r.left_compounds() {
            left.insert(compound.id(), r.get_left_compound_abundance(compound)?);
        }
        let mut right = IndexMap::new();
        for compound in r.right_compounds() {
            right.insert(compound.id(), r.get_right_compound_abundance(compound)?);
        }
        Ok(Self {
            id: r.name.clone(),
            description: r.description.clone(),
            equation: r.equation.clone(),
            direction: r.direction.symbol().to_string(),
            left,
            right,
            lower_bound: r.lower_bound,
            upper_bound: r.upper_bound,
            p_lr: r.p_lr,
            p_rl: r.p_rl,
            enzymes: r.enzymes.clone(),
            pegs: r.pegs.clone(),
            delta_g: r.delta_g,
            delta_g_error: r.delta_g_error,
            is_transport: r.is_transport,
            is_biomass_reaction: r.is_biomass_reaction,
            is_gapfilled: r.is_gapfilled,
            gapfill_method: r.gapfill_method.clone(),
            is_uptake_secretion: r.is_uptake_secretion,
        })
    }

    fn into_reaction(self, compounds: &CompoundRegistry) -> Result<Reaction, IoError> {
        let side = |entries: &IndexMap<String, f64>| -> Result<Vec<(Compound, f64)>, IoError> {
            entries
                .iter()
                .map(|(id, abundance)| match compounds.get(id) {
                    Some(compound) => Ok((compound.clone(), *abundance)),
                    None => Err(IoError::UnknownCompound {
                        compound: id.clone(),
                        referrer: self.id.clone(),
                    }),
                })
                .collect()
        };
        let left = side(&self.left)?;
        let right = side(&self.right)?;

        let mut reaction = ReactionBuilder::default()
            .name(self.id.clone())
            .description(self.description.clone())
            .equation(self.equation.clone())
            .lower_bound(self.lower_bound)
            .upper_bound(self.upper_bound)
            .p_lr(self.p_lr)
            .p_rl(self.p_rl)
            .enzymes(self.enzymes.clone())
            .pegs(self.pegs.clone())
            .delta_g(self.delta_g)
            .delta_g_error(self.delta_g_error)
            .is_transport(self.is_transport)
            .is_biomass_reaction(self.is_biomass_reaction)
            .is_gapfilled(self.is_gapfilled)
            .gapfill_method(self.gapfill_method.clone())
            .is_uptake_secretion(self.is_uptake_secretion)
            .build()?;
        reaction.set_direction(&self.direction);
        reaction.add_left_compounds(left.iter().map(|(c, _)| c.clone()));
        reaction.add_right_compounds(right.iter().map(|(c, _)| c.clone()));
        for (compound, abundance) in &left {
            reaction.set_left_compound_abundance(compound, *abundance)?;
        }
        for (compound, abundance) in &right {
            reaction.set_right_compound_abundance(compound, *abundance)?;
        }
        Ok(reaction)
    }
}
// endregion Conversions

/// Everything needed to run FBA on a network and gapfill it
#[derive(Clone, Debug)]
pub struct GapfillProblem {
    pub compounds: CompoundRegistry,
    pub reactions: ReactionRegistry,
    pub media: BTreeSet<Compound>,
    pub biomass: Reaction,
    /// The network before gapfilling
    pub reactions_to_run: BTreeSet<String>,
}

impl GapfillProblem {
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<GapfillProblem, IoError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(IoError::UnableToRead(format!("{:?}", err))),
        };
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<GapfillProblem, IoError> {
        let json_problem = match serde_json::from_str::<JsonProblem>(data) {
            Ok(problem) => problem,
            Err(err) => return Err(IoError::UnableToParse(format!("{:?}", err))),
        };
        Self::from_json(json_problem)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, IoError> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }

    fn from_json(json_problem: JsonProblem) -> Result<Self, IoError> {
        let compounds: CompoundRegistry = json_problem
            .compounds
            .into_iter()
            .map(|c| (c.id(), c))
            .collect();
        let mut reactions = ReactionRegistry::new();
        for rxn in json_problem.reactions {
            let reaction = rxn.into_reaction(&compounds)?;
            reactions.insert(reaction.name.clone(), reaction);
        }
        let mut biomass = json_problem.biomass.into_reaction(&compounds)?;
        biomass.is_biomass_reaction = true;
        let mut media = BTreeSet::new();
        for id in json_problem.media {
            match compounds.get(&id) {
                Some(compound) => media.insert(compound.clone()),
                None => {
                    return Err(IoError::UnknownCompound {
                        compound: id,
                        referrer: "media".to_string(),
                    })
                }
            };
        }
        Ok(GapfillProblem {
            compounds,
            reactions,
            media,
            biomass,
            reactions_to_run: json_problem.reactions_to_run.into_iter().collect(),
        })
    }

    fn to_json(&self) -> Result<JsonProblem, IoError> {
        let mut json_reactions = Vec::with_capacity(self.reactions.len());
        for r in self.reactions.values() {
            json_reactions.push(JsonReaction::from_reaction(r)?);
        }
        Ok(JsonProblem {
            compounds: self.compounds.values().cloned().collect(),
            reactions: json_reactions,
            media: self.media.iter().map(|c| c.id()).collect(),
            biomass: JsonReaction::from_reaction(&self.biomass)?,
            reactions_to_run: self.reactions_to_run.iter().cloned().collect(),
        })
    }

    /// Medium and biomass of the problem, with synthesized boundary reactions
    pub fn conditions(&self) -> GrowthConditions {
        GrowthConditions::new(self.media.clone(), self.biomass.clone())
    }

    /// Start gapfilling the problem's network with a solver
    pub fn into_session<S: Solver>(self, solver: S) -> GapfillSession<S> {
        let conditions = self.conditions();
        GapfillSession::new(
            solver,
            self.compounds,
            self.reactions,
            conditions,
            self.reactions_to_run,
        )
    }
}
