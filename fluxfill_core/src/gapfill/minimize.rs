//! Search for an essential subset of a batch of reactions
//!
//! The search only needs to know whether a set of reactions grows, so it is written
//! against a predicate rather than a solver. Minimality is local: no single reaction can be
//! removed from the result without losing growth, but a smaller set may still exist.
use std::collections::BTreeSet;

use log::{debug, warn};

/// Find a subset of `batch` which, together with `context`, still grows
///
/// # Parameters
/// - `batch`: the candidate reactions to reduce
/// - `context`: reactions which are always present
/// - `grows`: whether a set of reactions grows
///
/// # Returns
/// The empty set if the context grows alone, the whole batch if the context and batch
/// together don't grow, otherwise a subset of the batch from which no single reaction
/// can be removed.
pub fn minimize<F, E>(
    batch: &BTreeSet<String>,
    context: &BTreeSet<String>,
    mut grows: F,
) -> Result<BTreeSet<String>, E>
where
    F: FnMut(&BTreeSet<String>) -> Result<bool, E>,
{
    if grows(context)? {
        return Ok(BTreeSet::new());
    }
    if !grows(&union(context, batch))? {
        warn!(
            "The batch of {} reactions does not grow with its context, it can't be reduced",
            batch.len()
        );
        return Ok(batch.clone());
    }
    let candidates: Vec<String> = batch.iter().cloned().collect();
    let reduced = bisect(&candidates, context, &mut grows)?;
    let essential = removal_pass(reduced, context, &mut grows)?;
    debug!(
        "Reduced a batch of {} reactions to {}",
        batch.len(),
        essential.len()
    );
    Ok(essential)
}

/// Reduce `candidates`, assuming that context plus candidates grows and context alone doesn't
fn bisect<F, E>(
    candidates: &[String],
    context: &BTreeSet<String>,
    grows: &mut F,
) -> Result<Vec<String>, E>
where
    F: FnMut(&BTreeSet<String>) -> Result<bool, E>,
{
    if candidates.len() <= 1 {
        return Ok(candidates.to_vec());
    }
    let (left, right) = candidates.split_at(candidates.len() / 2);
    if grows(&extend(context, left))? {
        return bisect(left, context, grows);
    }
    if grows(&extend(context, right))? {
        return bisect(right, context, grows);
    }
    // Both halves are needed, reduce each while holding the other
    let left = bisect(left, &extend(context, right), grows)?;
    let right = bisect(right, &extend(context, &left), grows)?;
    Ok(left.into_iter().chain(right).collect())
}

/// Drop single reactions while growth is kept, until none can be dropped
fn removal_pass<F, E>(
    candidates: Vec<String>,
    context: &BTreeSet<String>,
    grows: &mut F,
) -> Result<BTreeSet<String>, E>
where
    F: FnMut(&BTreeSet<String>) -> Result<bool, E>,
{
    let mut kept: BTreeSet<String> = candidates.into_iter().collect();
    loop {
        let mut removed = None;
        for reaction in &kept {
            let mut trial = union(context, &kept);
            trial.remove(reaction);
            if grows(&trial)? {
                removed = Some(reaction.clone());
                break;
            }
        }
        match removed {
            Some(reaction) => {
                kept.remove(&reaction);
            }
            None => return Ok(kept),
        }
    }
}

fn union(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.union(b).cloned().collect()
}

fn extend(context: &BTreeSet<String>, extra: &[String]) -> BTreeSet<String> {
    context.iter().chain(extra).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// Grows when every reaction in one of the alternatives is present
    fn any_of(alternatives: Vec<BTreeSet<String>>) -> impl FnMut(&BTreeSet<String>) -> Result<bool, Infallible> {
        move |reactions| Ok(alternatives.iter().any(|a| a.is_subset(reactions)))
    }

    fn assert_sound(
        result: &BTreeSet<String>,
        context: &BTreeSet<String>,
        mut grows: impl FnMut(&BTreeSet<String>) -> Result<bool, Infallible>,
    ) {
        let full = union(context, result);
        assert!(grows(&full).unwrap());
        for reaction in result {
            let mut trial = full.clone();
            trial.remove(reaction);
            assert!(!grows(&trial).unwrap(), "{} could be removed", reaction);
        }
    }

    #[test]
    fn context_grows_alone() {
        let context = set(&["a"]);
        let batch = set(&["b", "c"]);
        let result = minimize(&batch, &context, any_of(vec![set(&["a"])])).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn batch_does_not_grow() {
        let batch = set(&["b", "c"]);
        let result = minimize(&batch, &BTreeSet::new(), any_of(vec![set(&["z"])])).unwrap();
        assert_eq!(result, batch);
    }

    #[test]
    fn single_essential() {
        let context = set(&["a"]);
        let batch = set(&["b", "c", "d", "e", "f", "g", "h"]);
        let needed = vec![set(&["a", "f"])];
        let result = minimize(&batch, &context, any_of(needed.clone())).unwrap();
        assert_eq!(result, set(&["f"]));
        assert_sound(&result, &context, any_of(needed));
    }

    #[test]
    fn split_across_halves() {
        let context = set(&["x"]);
        let batch = set(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let needed = vec![set(&["b", "g", "x"])];
        let result = minimize(&batch, &context, any_of(needed.clone())).unwrap();
        assert_eq!(result, set(&["b", "g"]));
        assert_sound(&result, &context, any_of(needed));
    }

    #[test]
    fn alternatives_are_locally_minimal() {
        let context = BTreeSet::new();
        let batch = set(&["a", "b", "c", "d", "e"]);
        let needed = vec![set(&["a", "d"]), set(&["b", "c", "e"]), set(&["e"])];
        let result = minimize(&batch, &context, any_of(needed.clone())).unwrap();
        assert_sound(&result, &context, any_of(needed));
    }

    #[test]
    fn errors_propagate() {
        let batch = set(&["a", "b"]);
        let result: Result<_, &str> = minimize(&batch, &BTreeSet::new(), |_| Err("solver failed"));
        assert_eq!(result, Err("solver failed"));
    }
}
