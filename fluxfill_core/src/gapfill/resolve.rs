//! Reduction of the accepted gapfill batches to the reactions that are needed
use std::collections::BTreeSet;

use log::{debug, info};

use crate::gapfill::minimize::minimize;
use crate::metabolism::ReactionRegistry;

/// A batch of candidate reactions and the label of the source that suggested it
pub type Batch = (String, BTreeSet<String>);

/// Reduce every batch to the reactions needed for growth
///
/// Batches are processed last in first out. Each batch is reduced in the context of the
/// original reactions, the reactions already found to be required, and every batch still
/// waiting to be processed. The reactions that survive are marked as gapfilled by the
/// batch's source and become required for the batches after it.
///
/// # Parameters
/// - `original`: reactions of the network before gapfilling
/// - `batches`: accepted batches in the order they were added
/// - `reactions`: registry whose entries are marked with their gapfill provenance
/// - `grows`: whether a set of reactions grows, given the registry so that it can run FBA
///
/// # Returns
/// The required additional reactions, the final network is these plus `original`
pub fn resolve_additional_reactions<F, E>(
    original: &BTreeSet<String>,
    batches: &[Batch],
    reactions: &mut ReactionRegistry,
    mut grows: F,
) -> Result<BTreeSet<String>, E>
where
    F: FnMut(&mut ReactionRegistry, &BTreeSet<String>) -> Result<bool, E>,
{
    let mut required: BTreeSet<String> = BTreeSet::new();
    for (position, (label, batch)) in batches.iter().enumerate().rev() {
        let mut context: BTreeSet<String> = original.union(&required).cloned().collect();
        for (_, pending) in &batches[..position] {
            context.extend(pending.iter().cloned());
        }
        let candidates: BTreeSet<String> = batch.difference(&context).cloned().collect();
        let essential = minimize(&candidates, &context, |trial| grows(reactions, trial))?;
        info!(
            "{} of the {} reactions from {} are required",
            essential.len(),
            batch.len(),
            label
        );
        for name in &essential {
            match reactions.get_mut(name) {
                Some(reaction) => {
                    reaction.is_gapfilled = true;
                    reaction.gapfill_method = label.clone();
                }
                None => debug!("Gapfilled reaction {} is not in the registry", name),
            }
        }
        required.extend(essential);
    }
    Ok(required)
}
