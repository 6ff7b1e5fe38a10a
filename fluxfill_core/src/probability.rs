//! Propagation of functional role probabilities to reactions
//!
//! A role is a function a protein is predicted to perform, a complex is a set of roles that
//! together form an enzyme, and a complex catalyses reactions. A complex is only as likely
//! as its least likely role, and a reaction is as likely as its most likely complex.
use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;

use crate::gapfill::{CandidateSource, GapfillError, SourcePriority, SuggestionContext};

/// Map of role to the complexes it is part of
pub type RoleComplexes = IndexMap<String, BTreeSet<String>>;

/// Map of complex to the reactions it catalyses
pub type ComplexReactions = IndexMap<String, BTreeSet<String>>;

/// Convert role probabilities into reaction probabilities
///
/// # Parameters
/// - `role_probs`: probability of each role being present
/// - `role_to_complexes`: complexes each role is part of
/// - `complex_to_reactions`: reactions each complex catalyses
///
/// # Returns
/// Probability of each reaction reachable from a role, roles and complexes missing from
/// the mappings are skipped
pub fn role_probs_to_reaction_probs(
    role_probs: &IndexMap<String, f64>,
    role_to_complexes: &RoleComplexes,
    complex_to_reactions: &ComplexReactions,
) -> IndexMap<String, f64> {
    let mut complex_probs: IndexMap<String, Vec<f64>> = IndexMap::new();
    for (role, p) in role_probs {
        let Some(complexes) = role_to_complexes.get(role) else {
            debug!("Role {} is not part of any complex", role);
            continue;
        };
        for complex in complexes {
            complex_probs.entry(complex.clone()).or_default().push(*p);
        }
    }

    let mut reaction_probs: IndexMap<String, Vec<f64>> = IndexMap::new();
    for (complex, probs) in &complex_probs {
        let p = probs.iter().copied().fold(f64::INFINITY, f64::min);
        let Some(reactions) = complex_to_reactions.get(complex) else {
            debug!("Complex {} does not catalyse any reaction", complex);
            continue;
        };
        for reaction in reactions {
            reaction_probs.entry(reaction.clone()).or_default().push(p);
        }
    }

    reaction_probs
        .into_iter()
        .map(|(reaction, probs)| {
            let p = probs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (reaction, p)
        })
        .collect()
}

/// Suggests reactions whose probability exceeds a cutoff
///
/// Probabilities come from a reaction probability map when one is given, otherwise from
/// the larger of the left to right and right to left probabilities of each reaction.
#[derive(Clone, Debug)]
pub struct ProbabilityCandidates {
    reaction_probs: Option<IndexMap<String, f64>>,
    cutoff: f64,
}

impl ProbabilityCandidates {
    /// Use the probabilities stored on the reactions
    pub fn from_reactions(cutoff: f64) -> Self {
        ProbabilityCandidates {
            reaction_probs: None,
            cutoff,
        }
    }

    /// Use a reaction probability map, e.g. from [`role_probs_to_reaction_probs`]
    pub fn from_map(reaction_probs: IndexMap<String, f64>, cutoff: f64) -> Self {
        ProbabilityCandidates {
            reaction_probs: Some(reaction_probs),
            cutoff,
        }
    }
}

impl CandidateSource for ProbabilityCandidates {
    fn label(&self) -> &str {
        SourcePriority::Probability.label()
    }

    fn priority(&self) -> SourcePriority {
        SourcePriority::Probability
    }

    fn suggest(&mut self, context: &SuggestionContext) -> Result<BTreeSet<String>, GapfillError> {
        let suggested: BTreeSet<String> = match &self.reaction_probs {
            Some(probs) => probs
                .iter()
                .filter(|(_, p)| **p > self.cutoff)
                .map(|(name, _)| name.clone())
                .collect(),
            None => context
                .reactions
                .iter()
                .filter(|(_, r)| r.p_lr.max(r.p_rl) > self.cutoff)
                .map(|(name, _)| name.clone())
                .collect(),
        };
        Ok(suggested)
    }
}
