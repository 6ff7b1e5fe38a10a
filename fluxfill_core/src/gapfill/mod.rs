//! Gapfilling: adding reactions to a network that doesn't grow until it does
//!
//! Candidate reactions come from [`CandidateSource`]s, which are tried one batch at a time
//! in priority order. Once a batch makes the network grow, every accepted batch is reduced
//! to the reactions that are needed (see [`resolve::resolve_additional_reactions`]).
pub mod minimize;
pub mod resolve;

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use log::{debug, info, warn};
use thiserror::Error;

use crate::fba::{run_fba, FbaError, FbaMode, FbaOutcome, GrowthConditions};
use crate::gapfill::resolve::{resolve_additional_reactions, Batch};
use crate::metabolism::{CompoundRegistry, ReactionRegistry};
use crate::optimize::solvers::{Solver, SolverError};

// region Candidate Sources
/// Order in which the kinds of candidate sources are tried
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourcePriority {
    /// Reactions catalysed by essential genes
    Essential,
    /// Reactions that import or export compounds of the medium
    Media,
    /// Reactions from subsystems which are mostly present
    Subsystems,
    /// Reactions consuming or producing compounds that only appear once
    Orphans,
    /// Reactions of closely related genomes
    CloseGenomes,
    /// Reactions of other genera
    OtherGenera,
    /// Reactions with a high probability of being present
    Probability,
    /// Reactions with proteins associated
    WithProteins,
    /// Anything else, tried last
    Other,
}

impl SourcePriority {
    /// The kinds of sources, in the order they are tried
    pub const ALL: [SourcePriority; 9] = [
        SourcePriority::Essential,
        SourcePriority::Media,
        SourcePriority::Subsystems,
        SourcePriority::Orphans,
        SourcePriority::CloseGenomes,
        SourcePriority::OtherGenera,
        SourcePriority::Probability,
        SourcePriority::WithProteins,
        SourcePriority::Other,
    ];

    /// Label recorded as the gapfill method of reactions from this kind of source
    pub fn label(&self) -> &'static str {
        match self {
            SourcePriority::Essential => "essential",
            SourcePriority::Media => "media",
            SourcePriority::Subsystems => "subsystems",
            SourcePriority::Orphans => "orphans",
            SourcePriority::CloseGenomes => "close genomes",
            SourcePriority::OtherGenera => "other genera",
            SourcePriority::Probability => "probability",
            SourcePriority::WithProteins => "with proteins",
            SourcePriority::Other => "other",
        }
    }
}

impl Display for SourcePriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// What a candidate source can look at when making suggestions
#[derive(Clone, Copy, Debug)]
pub struct SuggestionContext<'a> {
    pub compounds: &'a CompoundRegistry,
    pub reactions: &'a ReactionRegistry,
    /// Reactions currently in the network, including earlier batches
    pub current: &'a BTreeSet<String>,
    pub conditions: &'a GrowthConditions,
}

/// Something that suggests reactions to add to the network
pub trait CandidateSource {
    /// Recorded as the gapfill method of the reactions this source adds
    fn label(&self) -> &str;

    /// Where this source sits in the order sources are tried
    fn priority(&self) -> SourcePriority {
        SourcePriority::Other
    }

    /// Suggest reaction names, names already in the network are ignored
    fn suggest(&mut self, context: &SuggestionContext) -> Result<BTreeSet<String>, GapfillError>;
}

/// A fixed set of candidate reactions, e.g. read from a file
#[derive(Clone, Debug)]
pub struct StaticCandidates {
    label: String,
    priority: SourcePriority,
    reactions: BTreeSet<String>,
}

impl StaticCandidates {
    /// Candidates of a known kind, labelled by that kind
    pub fn new(priority: SourcePriority, reactions: BTreeSet<String>) -> Self {
        StaticCandidates {
            label: priority.label().to_string(),
            priority,
            reactions,
        }
    }

    /// Candidates with a custom label, tried after all known kinds
    pub fn labelled(label: &str, reactions: BTreeSet<String>) -> Self {
        StaticCandidates {
            label: label.to_string(),
            priority: SourcePriority::Other,
            reactions,
        }
    }
}

impl CandidateSource for StaticCandidates {
    fn label(&self) -> &str {
        &self.label
    }

    fn priority(&self) -> SourcePriority {
        self.priority
    }

    fn suggest(&mut self, _context: &SuggestionContext) -> Result<BTreeSet<String>, GapfillError> {
        Ok(self.reactions.clone())
    }
}

/// A candidate source backed by a closure
pub struct FnCandidates<F> {
    priority: SourcePriority,
    suggest: F,
}

impl<F> FnCandidates<F>
where
    F: FnMut(&SuggestionContext) -> Result<BTreeSet<String>, GapfillError>,
{
    pub fn new(priority: SourcePriority, suggest: F) -> Self {
        FnCandidates { priority, suggest }
    }
}

impl<F> CandidateSource for FnCandidates<F>
where
    F: FnMut(&SuggestionContext) -> Result<BTreeSet<String>, GapfillError>,
{
    fn label(&self) -> &str {
        self.priority.label()
    }

    fn priority(&self) -> SourcePriority {
        self.priority
    }

    fn suggest(&mut self, context: &SuggestionContext) -> Result<BTreeSet<String>, GapfillError> {
        (self.suggest)(context)
    }
}
// endregion Candidate Sources

// region Session
/// Outcome of gapfilling
#[derive(Clone, Debug)]
pub struct GapfillResult {
    /// The final network, the original reactions plus the required additions
    pub reactions: BTreeSet<String>,
    /// Reactions gapfilling had to add
    pub added: BTreeSet<String>,
    /// Whether the final network grows
    pub grew: bool,
}

/// State of gapfilling a single network
///
/// The solver and registries are reused for every FBA run of the session. The boundary
/// reactions registered by a run stay in the reaction registry.
pub struct GapfillSession<S: Solver> {
    solver: S,
    compounds: CompoundRegistry,
    reactions: ReactionRegistry,
    conditions: GrowthConditions,
    mode: FbaMode,
    original: BTreeSet<String>,
    current: BTreeSet<String>,
    batches: Vec<Batch>,
}

impl<S: Solver> GapfillSession<S> {
    /// Start a session on the network made of `reactions_to_run`
    pub fn new(
        solver: S,
        compounds: CompoundRegistry,
        reactions: ReactionRegistry,
        conditions: GrowthConditions,
        reactions_to_run: BTreeSet<String>,
    ) -> Self {
        GapfillSession {
            solver,
            compounds,
            reactions,
            conditions,
            mode: FbaMode::Standard,
            original: reactions_to_run.clone(),
            current: reactions_to_run,
            batches: Vec::new(),
        }
    }

    /// Use a different objective for the growth tests
    pub fn with_mode(mut self, mode: FbaMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn original(&self) -> &BTreeSet<String> {
        &self.original
    }

    /// Original reactions plus every batch added so far
    pub fn current(&self) -> &BTreeSet<String> {
        &self.current
    }

    /// Accepted batches, in the order they were added
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn compounds(&self) -> &CompoundRegistry {
        &self.compounds
    }

    pub fn reactions(&self) -> &ReactionRegistry {
        &self.reactions
    }

    /// Hand back the registries, with the provenance of gapfilled reactions
    pub fn into_registries(self) -> (CompoundRegistry, ReactionRegistry) {
        (self.compounds, self.reactions)
    }

    /// Run FBA on an arbitrary set of reactions
    pub fn evaluate(&mut self, reactions_to_run: &BTreeSet<String>) -> Result<FbaOutcome, GapfillError> {
        Ok(run_fba(
            &mut self.solver,
            &mut self.compounds,
            &mut self.reactions,
            reactions_to_run,
            &self.conditions,
            &self.mode,
        )?)
    }

    /// Run FBA on the original network
    pub fn run_initial(&mut self) -> Result<FbaOutcome, GapfillError> {
        let original = self.original.clone();
        let outcome = self.evaluate(&original)?;
        info!(
            "For the initial run we get growth of {:?} which is {}",
            outcome.value, outcome.growth
        );
        Ok(outcome)
    }

    /// Add the new reactions suggested by a source and run FBA on the result
    ///
    /// Suggested reactions which are already in the network, or aren't in the reaction
    /// registry, are dropped. The batch is recorded even when it is empty.
    pub fn try_batch(&mut self, source: &mut dyn CandidateSource) -> Result<FbaOutcome, GapfillError> {
        let suggested = source.suggest(&SuggestionContext {
            compounds: &self.compounds,
            reactions: &self.reactions,
            current: &self.current,
            conditions: &self.conditions,
        })?;
        let mut batch = BTreeSet::new();
        for name in suggested.difference(&self.current) {
            if self.reactions.contains_key(name) {
                batch.insert(name.clone());
            } else {
                debug!("Suggested reaction {} from {} is not known", name, source.label());
            }
        }
        let added = batch.len();
        self.current.extend(batch.iter().cloned());
        self.batches.push((source.label().to_string(), batch));

        let current = self.current.clone();
        let outcome = self.evaluate(&current)?;
        info!(
            "After adding {} {} reactions we get {:?} (growth is {})",
            added,
            source.label(),
            outcome.value,
            outcome.growth
        );
        Ok(outcome)
    }

    /// Reduce every accepted batch to the reactions needed for growth
    pub fn resolve(&mut self) -> Result<BTreeSet<String>, GapfillError> {
        let GapfillSession {
            solver,
            compounds,
            reactions,
            conditions,
            mode,
            original,
            batches,
            ..
        } = self;
        resolve_additional_reactions(original, batches, reactions, |reactions, trial| {
            let outcome = run_fba(solver, compounds, reactions, trial, conditions, mode)?;
            Ok::<bool, GapfillError>(outcome.growth)
        })
    }

    /// Try the sources in priority order until the network grows, then reduce the additions
    pub fn gapfill(
        &mut self,
        sources: &mut [Box<dyn CandidateSource + '_>],
    ) -> Result<GapfillResult, GapfillError> {
        if self.run_initial()?.growth {
            info!("The network grows without gapfilling");
            return Ok(GapfillResult {
                reactions: self.original.clone(),
                added: BTreeSet::new(),
                grew: true,
            });
        }
        sources.sort_by_key(|source| source.priority());
        for source in sources.iter_mut() {
            if !self.try_batch(source.as_mut())?.growth {
                continue;
            }
            let added = self.resolve()?;
            info!(
                "Gapfilling added {} reactions to the {} original reactions",
                added.len(),
                self.original.len()
            );
            return Ok(GapfillResult {
                reactions: self.original.union(&added).cloned().collect(),
                added,
                grew: true,
            });
        }
        warn!(
            "The network does not grow after trying {} candidate sources",
            sources.len()
        );
        Ok(GapfillResult {
            reactions: self.original.clone(),
            added: BTreeSet::new(),
            grew: false,
        })
    }
}
// endregion Session

/// Errors associated with gapfilling
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GapfillError {
    #[error(transparent)]
    Fba(#[from] FbaError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    /// A candidate source failed to make suggestions
    #[error("Candidate source {label} failed: {message}")]
    Source { label: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolism::compound::Compound;
    use crate::metabolism::reaction::{Direction, Reaction};
    use crate::optimize::solvers::ClarabelSolver;

    /// A (e) -> B (c) -> C (c) -> D (c), biomass consumes D, with spare reactions around
    fn session() -> GapfillSession<ClarabelSolver> {
        let a = Compound::external("A");
        let b = Compound::new("B", Some("c"));
        let c = Compound::new("C", Some("c"));
        let d = Compound::new("D", Some("c"));
        let e = Compound::new("E", Some("c"));
        let mut reactions = ReactionRegistry::new();
        for (name, left, right) in [
            ("r1", &a, &b),
            ("r2", &b, &c),
            ("r3", &c, &d),
            ("spare1", &b, &e),
            ("spare2", &e, &b),
        ] {
            let reaction =
                Reaction::from_sides(name, Direction::Forward, &[(left.clone(), 1.)], &[(right.clone(), 1.)])
                    .unwrap();
            reactions.insert(name.to_string(), reaction);
        }
        let biomass = Reaction::from_sides("biomass", Direction::Forward, &[(d, 1.)], &[]).unwrap();
        let conditions = GrowthConditions::new(BTreeSet::from([a]), biomass);
        GapfillSession::new(
            ClarabelSolver::new(),
            CompoundRegistry::new(),
            reactions,
            conditions,
            BTreeSet::from(["r1".to_string()]),
        )
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn priority_order() {
        let mut sorted = SourcePriority::ALL.to_vec();
        sorted.reverse();
        sorted.sort();
        assert_eq!(sorted, SourcePriority::ALL.to_vec());
        assert_eq!(SourcePriority::CloseGenomes.to_string(), "close genomes");
    }

    #[test]
    fn batch_filters_suggestions() {
        let mut session = session();
        let mut source = StaticCandidates::new(
            SourcePriority::Media,
            set(&["r1", "spare1", "not a reaction"]),
        );
        let outcome = session.try_batch(&mut source).unwrap();
        assert!(!outcome.growth);
        assert_eq!(session.batches().len(), 1);
        assert_eq!(session.batches()[0], ("media".to_string(), set(&["spare1"])));
        assert_eq!(session.current(), &set(&["r1", "spare1"]));
    }

    #[test]
    fn gapfill_in_priority_order() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = session();
        let mut sources: Vec<Box<dyn CandidateSource>> = vec![
            // Tried last even though it is listed first
            Box::new(StaticCandidates::labelled("everything", set(&["r2", "r3"]))),
            Box::new(StaticCandidates::new(
                SourcePriority::Orphans,
                set(&["r3", "spare2"]),
            )),
            Box::new(FnCandidates::new(SourcePriority::Essential, |context| {
                // Everything consuming B that isn't in the network yet
                let b = Compound::new("B", Some("c"));
                Ok(context
                    .reactions
                    .iter()
                    .filter(|(name, r)| !context.current.contains(*name) && r.left_compounds().contains(&b))
                    .map(|(name, _)| name.clone())
                    .collect())
            })),
        ];
        let result = session.gapfill(&mut sources).unwrap();
        assert!(result.grew);
        assert_eq!(result.added, set(&["r2", "r3"]));
        assert_eq!(result.reactions, set(&["r1", "r2", "r3"]));
        let labels: Vec<&str> = session.batches().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["essential", "orphans"]);

        let reactions = session.reactions();
        assert_eq!(reactions["r2"].gapfill_method, "essential");
        assert_eq!(reactions["r3"].gapfill_method, "orphans");
        assert!(!reactions["spare1"].is_gapfilled);
        assert!(!reactions["r1"].is_gapfilled);
    }

    #[test]
    fn source_errors_propagate() {
        let mut session = session();
        let mut sources: Vec<Box<dyn CandidateSource>> =
            vec![Box::new(FnCandidates::new(SourcePriority::Subsystems, |_| {
                Err(GapfillError::Source {
                    label: "subsystems".to_string(),
                    message: "no subsystem data".to_string(),
                })
            }))];
        if let Err(GapfillError::Source { label, .. }) = session.gapfill(&mut sources) {
            assert_eq!(label, "subsystems");
        } else {
            panic!("Source error not caught")
        }
    }

    #[test]
    fn no_growth_after_all_sources() {
        let mut session = session();
        let mut sources: Vec<Box<dyn CandidateSource>> = vec![Box::new(StaticCandidates::new(
            SourcePriority::Probability,
            set(&["spare1", "spare2"]),
        ))];
        let result = session.gapfill(&mut sources).unwrap();
        assert!(!result.grew);
        assert_eq!(result.reactions, set(&["r1"]));
        assert!(result.added.is_empty());
    }
}
