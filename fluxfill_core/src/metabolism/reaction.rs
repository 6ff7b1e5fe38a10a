//! This module provides a struct for representing reactions
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use derive_builder::Builder;
use log::warn;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::metabolism::compound::Compound;

/// Represents a reaction in the metabolic network
///
/// The compounds on each side, and their abundances, can only be changed through the
/// methods on the reaction so that an abundance can never exist for a compound which
/// isn't on that side of the equation.
///
/// # Note:
/// Two reactions are equal when they have the same compounds on the left and right, in
/// either orientation, regardless of their names. The hash is computed from the same
/// compound sets so that it agrees with equality. Use the reaction name (the key of the
/// reaction registry) when identity by name is needed.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct Reaction {
    /// Used to identify the reaction
    pub name: String,
    /// Human readable description of the reaction
    #[builder(default = "None")]
    pub description: Option<String>,
    /// The equation of the reaction as text
    #[builder(default = "None")]
    pub equation: Option<String>,
    /// Direction the reaction can run in
    #[builder(default = "Direction::Unknown")]
    pub direction: Direction,
    #[builder(setter(skip))]
    left_compounds: BTreeSet<Compound>,
    #[builder(setter(skip))]
    left_abundance: BTreeMap<Compound, f64>,
    #[builder(setter(skip))]
    right_compounds: BTreeSet<Compound>,
    #[builder(setter(skip))]
    right_abundance: BTreeMap<Compound, f64>,
    /// Lower flux bound, None if it should be derived from the direction
    #[builder(default = "None")]
    pub lower_bound: Option<f64>,
    /// Upper flux bound, None if it should be derived from the direction
    #[builder(default = "None")]
    pub upper_bound: Option<f64>,
    /// Probability that the reaction runs left to right
    #[builder(default = "0.0")]
    pub p_lr: f64,
    /// Probability that the reaction runs right to left
    #[builder(default = "0.0")]
    pub p_rl: f64,
    /// Enzyme complex ids catalysing the reaction
    #[builder(default)]
    pub enzymes: BTreeSet<String>,
    /// Protein encoding genes associated with the reaction
    #[builder(default)]
    pub pegs: BTreeSet<String>,
    /// Gibbs free energy change, negative is favourable
    #[builder(default = "0.0")]
    pub delta_g: f64,
    #[builder(default = "0.0")]
    pub delta_g_error: f64,
    /// Whether the reaction moves compounds across a membrane
    #[builder(default = "false")]
    pub is_transport: bool,
    #[builder(default = "false")]
    pub is_biomass_reaction: bool,
    /// Whether the reaction was added by gapfilling
    #[builder(default = "false")]
    pub is_gapfilled: bool,
    /// Which candidate source suggested the reaction, empty unless gapfilled
    #[builder(default)]
    pub gapfill_method: String,
    /// Whether the reaction is a boundary reaction exchanging a compound with the outside
    #[builder(default = "false")]
    pub is_uptake_secretion: bool,
    /// Cached input/output classification, computed on first use
    #[builder(setter(skip))]
    input_output: OnceCell<InputOutput>,
}

/// Which sides of a reaction touch the outside of the cell
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct InputOutput {
    inp: bool,
    outp: bool,
}

impl Reaction {
    /// Create a new reaction with no compounds
    pub fn new(name: &str) -> Reaction {
        Reaction::with_direction(name, Direction::Unknown)
    }

    /// Create a new reaction with no compounds and a given direction
    pub fn with_direction(name: &str, direction: Direction) -> Reaction {
        Reaction {
            name: name.to_string(),
            description: None,
            equation: None,
            direction,
            left_compounds: BTreeSet::new(),
            left_abundance: BTreeMap::new(),
            right_compounds: BTreeSet::new(),
            right_abundance: BTreeMap::new(),
            lower_bound: None,
            upper_bound: None,
            p_lr: 0.0,
            p_rl: 0.0,
            enzymes: BTreeSet::new(),
            pegs: BTreeSet::new(),
            delta_g: 0.0,
            delta_g_error: 0.0,
            is_transport: false,
            is_biomass_reaction: false,
            is_gapfilled: false,
            gapfill_method: String::new(),
            is_uptake_secretion: false,
            input_output: OnceCell::new(),
        }
    }

    /// Create a reaction from the compounds and abundances on each side
    ///
    /// # Examples
    /// ```rust
    /// use fluxfill_core::metabolism::compound::Compound;
    /// use fluxfill_core::metabolism::reaction::{Direction, Reaction};
    /// let a = Compound::new("A", Some("c"));
    /// let b = Compound::new("B", Some("c"));
    /// // 2 A -> B
    /// let reaction = Reaction::from_sides("rxn1", Direction::Forward, &[(a, 2.0)], &[(b, 1.0)]).unwrap();
    /// assert_eq!(reaction.number_of_compounds(), 2);
    /// ```
    pub fn from_sides(
        name: &str,
        direction: Direction,
        left: &[(Compound, f64)],
        right: &[(Compound, f64)],
    ) -> Result<Reaction, ReactionError> {
        let mut reaction = Reaction::with_direction(name, direction);
        reaction.add_left_compounds(left.iter().map(|(c, _)| c.clone()));
        reaction.add_right_compounds(right.iter().map(|(c, _)| c.clone()));
        for (compound, abundance) in left {
            reaction.set_left_compound_abundance(compound, *abundance)?;
        }
        for (compound, abundance) in right {
            reaction.set_right_compound_abundance(compound, *abundance)?;
        }
        Ok(reaction)
    }

    // region Direction
    /// Set the direction of the reaction from its symbol (`>`, `<`, `=`)
    ///
    /// Unrecognised symbols are ignored with a warning, leaving the direction unknown
    pub fn set_direction(&mut self, symbol: &str) -> Direction {
        self.direction = match Direction::from_symbol(symbol) {
            Some(direction) => direction,
            None => {
                warn!(
                    "Direction {} is not a permitted direction for {}, ignored",
                    symbol, self.name
                );
                Direction::Unknown
            }
        };
        self.direction
    }
    // endregion Direction

    // region Compounds
    /// Add compounds to the left side of the equation
    pub fn add_left_compounds<I: IntoIterator<Item = Compound>>(&mut self, compounds: I) {
        self.left_compounds.extend(compounds);
        self.input_output = OnceCell::new();
    }

    /// Add compounds to the right side of the equation
    pub fn add_right_compounds<I: IntoIterator<Item = Compound>>(&mut self, compounds: I) {
        self.right_compounds.extend(compounds);
        self.input_output = OnceCell::new();
    }

    /// Set the abundance of a compound already on the left side of the equation
    pub fn set_left_compound_abundance(
        &mut self,
        compound: &Compound,
        abundance: f64,
    ) -> Result<(), ReactionError> {
        Self::set_abundance(
            &self.left_compounds,
            &mut self.left_abundance,
            Side::Left,
            compound,
            abundance,
        )
    }

    /// Set the abundance of a compound already on the right side of the equation
    pub fn set_right_compound_abundance(
        &mut self,
        compound: &Compound,
        abundance: f64,
    ) -> Result<(), ReactionError> {
        Self::set_abundance(
            &self.right_compounds,
            &mut self.right_abundance,
            Side::Right,
            compound,
            abundance,
        )
    }

    fn set_abundance(
        compounds: &BTreeSet<Compound>,
        abundances: &mut BTreeMap<Compound, f64>,
        side: Side,
        compound: &Compound,
        abundance: f64,
    ) -> Result<(), ReactionError> {
        if !compounds.contains(compound) {
            return Err(ReactionError::CompoundNotOnSide {
                compound: compound.id(),
                side,
            });
        }
        if !abundance.is_finite() || abundance < 0.0 {
            return Err(ReactionError::InvalidAbundance {
                compound: compound.id(),
                abundance,
            });
        }
        abundances.insert(compound.clone(), abundance);
        Ok(())
    }

    /// Get the abundance of a compound on the left side of the equation
    pub fn get_left_compound_abundance(&self, compound: &Compound) -> Result<f64, ReactionError> {
        self.left_abundance
            .get(compound)
            .copied()
            .ok_or_else(|| ReactionError::MissingAbundance {
                compound: compound.id(),
                side: Side::Left,
            })
    }

    /// Get the abundance of a compound on the right side of the equation
    pub fn get_right_compound_abundance(&self, compound: &Compound) -> Result<f64, ReactionError> {
        self.right_abundance
            .get(compound)
            .copied()
            .ok_or_else(|| ReactionError::MissingAbundance {
                compound: compound.id(),
                side: Side::Right,
            })
    }

    pub fn left_compounds(&self) -> &BTreeSet<Compound> {
        &self.left_compounds
    }

    pub fn right_compounds(&self) -> &BTreeSet<Compound> {
        &self.right_compounds
    }

    pub fn number_of_left_compounds(&self) -> usize {
        self.left_compounds.len()
    }

    pub fn number_of_right_compounds(&self) -> usize {
        self.right_compounds.len()
    }

    /// All the compounds involved in the reaction
    pub fn all_compounds(&self) -> BTreeSet<Compound> {
        self.left_compounds
            .union(&self.right_compounds)
            .cloned()
            .collect()
    }

    pub fn number_of_compounds(&self) -> usize {
        self.left_compounds.union(&self.right_compounds).count()
    }

    /// Whether the compound is on either side of the reaction
    pub fn has(&self, compound: &Compound) -> bool {
        self.left_compounds.contains(compound) || self.right_compounds.contains(compound)
    }

    /// Whether two compounds of the reaction are on opposite sides
    pub fn opposite_sides(
        &self,
        compound1: &Compound,
        compound2: &Compound,
    ) -> Result<bool, ReactionError> {
        for c in [compound1, compound2] {
            if !self.has(c) {
                return Err(ReactionError::CompoundNotInReaction(c.id()));
            }
        }
        Ok((self.left_compounds.contains(compound1) && self.right_compounds.contains(compound2))
            || (self.right_compounds.contains(compound1)
                && self.left_compounds.contains(compound2)))
    }
    // endregion Compounds

    // region Thermodynamics and probabilities
    pub fn set_probability_left_to_right(&mut self, p: f64) {
        self.p_lr = p;
    }

    pub fn set_probability_right_to_left(&mut self, p: f64) {
        self.p_rl = p;
    }

    pub fn set_delta_g(&mut self, delta_g: f64) {
        self.delta_g = delta_g;
    }
    // endregion Thermodynamics and probabilities

    // region Input/Output
    fn input_output(&self) -> InputOutput {
        *self.input_output.get_or_init(|| InputOutput {
            inp: self.left_compounds.iter().any(Compound::is_external),
            outp: self.right_compounds.iter().any(Compound::is_external),
        })
    }

    /// Whether the reaction takes compounds from outside the cell
    pub fn is_input_reaction(&self) -> bool {
        self.input_output().inp
    }

    /// Whether the reaction releases compounds outside the cell
    pub fn is_output_reaction(&self) -> bool {
        self.input_output().outp
    }

    /// Flip whether this reaction is treated as an input reaction
    pub fn toggle_input_reaction(&mut self) {
        let current = self.input_output();
        self.input_output = OnceCell::from(InputOutput {
            inp: !current.inp,
            outp: current.outp,
        });
    }

    /// Flip whether this reaction is treated as an output reaction
    pub fn toggle_output_reaction(&mut self) {
        let current = self.input_output();
        self.input_output = OnceCell::from(InputOutput {
            inp: current.inp,
            outp: !current.outp,
        });
    }
    // endregion Input/Output

    // region Reversal
    /// Create the reverse of this reaction
    ///
    /// The compounds and abundances change sides, the input/output flags and the
    /// left to right / right to left probabilities are swapped, forward and reverse
    /// directions are flipped and delta G is negated. The original is left untouched.
    pub fn reverse_reaction(&self) -> Result<Reaction, ReactionError> {
        let direction = match self.direction {
            Direction::Unknown => {
                return Err(ReactionError::IndeterminateDirection(self.name.clone()))
            }
            d => d.reversed(),
        };
        Ok(self.reversed_as(&self.name, direction))
    }

    /// Copy of the reaction with the sides swapped, under a new name and direction
    fn reversed_as(&self, name: &str, direction: Direction) -> Reaction {
        let mut reversed = self.clone();
        reversed.name = name.to_string();
        reversed.direction = direction;
        reversed.left_compounds = self.right_compounds.clone();
        reversed.right_compounds = self.left_compounds.clone();
        reversed.left_abundance = self.right_abundance.clone();
        reversed.right_abundance = self.left_abundance.clone();
        reversed.p_lr = self.p_rl;
        reversed.p_rl = self.p_lr;
        reversed.delta_g = -self.delta_g;
        let io = self.input_output();
        reversed.input_output = OnceCell::from(InputOutput {
            inp: io.outp,
            outp: io.inp,
        });
        reversed
    }

    /// Split a bidirectional reaction into a forward and a reverse reaction
    ///
    /// # Note:
    /// The forward reaction is "{name}_f", runs `>` and has bounds (0, upper bound).
    /// The reverse reaction is "{name}_r", runs `<`, has its sides swapped and bounds
    /// (default lower bound, 0). Bounds are only set on the copies if the original
    /// reaction had them.
    pub fn split_reaction(&self) -> Result<(Reaction, Reaction), ReactionError> {
        if self.direction != Direction::Bidirectional {
            return Err(ReactionError::NotBidirectional(self.name.clone()));
        }
        let default_lower = Configuration::current().lower_bound;

        let mut forward = self.clone();
        forward.name = format!("{}_f", self.name);
        forward.direction = Direction::Forward;
        forward.lower_bound = self.lower_bound.map(|_| 0.0);

        let mut reverse = self.reversed_as(&format!("{}_r", self.name), Direction::Reverse);
        // The reversed copy keeps the input/output flags of the original
        reverse.input_output = OnceCell::from(self.input_output());
        reverse.lower_bound = self.lower_bound.map(|_| default_lower);
        reverse.upper_bound = self.upper_bound.map(|_| 0.0);

        Ok((forward, reverse))
    }
    // endregion Reversal
}

impl PartialEq for Reaction {
    fn eq(&self, other: &Self) -> bool {
        (self.left_compounds == other.left_compounds
            && self.right_compounds == other.right_compounds)
            || (self.left_compounds == other.right_compounds
                && self.right_compounds == other.left_compounds)
    }
}

impl Eq for Reaction {}

impl Hash for Reaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the two sides in a fixed order so reversed reactions collide
        let (first, second) = if self.left_compounds <= self.right_compounds {
            (&self.left_compounds, &self.right_compounds)
        } else {
            (&self.right_compounds, &self.left_compounds)
        };
        first.hash(state);
        second.hash(state);
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The direction a reaction can carry flux in
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right, `>`
    Forward,
    /// Right to left, `<`
    Reverse,
    /// Either way, `=`
    Bidirectional,
    /// Direction isn't known
    Unknown,
}

impl Direction {
    /// Parse a direction symbol, empty strings and `?` are an unknown direction
    pub fn from_symbol(symbol: &str) -> Option<Direction> {
        match symbol.trim() {
            ">" => Some(Direction::Forward),
            "<" => Some(Direction::Reverse),
            "=" => Some(Direction::Bidirectional),
            "" | "?" => Some(Direction::Unknown),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Direction::Forward => ">",
            Direction::Reverse => "<",
            Direction::Bidirectional => "=",
            Direction::Unknown => "?",
        }
    }

    /// Direction after swapping the sides of a reaction
    pub fn reversed(&self) -> Direction {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
            d => *d,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Side of a reaction equation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Errors associated with misuse of a Reaction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReactionError {
    /// Tried to set an abundance for a compound not on that side of the equation
    #[error("{compound} is not in the {side} compounds, add it before setting its abundance")]
    CompoundNotOnSide { compound: String, side: Side },
    /// Tried to set a negative or non-finite abundance
    #[error("Invalid abundance {abundance} for {compound}")]
    InvalidAbundance { compound: String, abundance: f64 },
    /// Asked for an abundance that was never set
    #[error("There is no abundance for {compound} on the {side} side of the equation")]
    MissingAbundance { compound: String, side: Side },
    /// Asked about a compound which isn't in the reaction
    #[error("{0} is not in this reaction")]
    CompoundNotInReaction(String),
    /// Tried to reverse a reaction whose direction is unknown
    #[error("Can't reverse {0}, its direction is unknown")]
    IndeterminateDirection(String),
    /// Tried to split a reaction which isn't bidirectional
    #[error("Can't split {0}, it isn't bidirectional")]
    NotBidirectional(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn a() -> Compound {
        Compound::new("A", Some("c"))
    }

    fn b() -> Compound {
        Compound::new("B", Some("c"))
    }

    fn a_to_b() -> Reaction {
        let mut reaction =
            Reaction::from_sides("rxn1", Direction::Forward, &[(a(), 2.0)], &[(b(), 1.0)])
                .unwrap();
        reaction.set_delta_g(-3.5);
        reaction.set_probability_left_to_right(0.9);
        reaction.set_probability_right_to_left(0.1);
        reaction
    }

    #[test]
    fn abundance_requires_compound() {
        let mut reaction = Reaction::new("rxn1");
        reaction.add_left_compounds([a()]);
        reaction.set_left_compound_abundance(&a(), 1.0).unwrap();
        assert!((reaction.get_left_compound_abundance(&a()).unwrap() - 1.0).abs() < 1e-25);

        // B was never added to the left
        if let Err(ReactionError::CompoundNotOnSide { side, .. }) =
            reaction.set_left_compound_abundance(&b(), 1.0)
        {
            assert_eq!(side, Side::Left);
        } else {
            panic!("Abundance for missing compound not caught")
        }
        // A isn't on the right either
        if let Err(ReactionError::CompoundNotOnSide { .. }) =
            reaction.set_right_compound_abundance(&a(), 1.0)
        {
        } else {
            panic!("Abundance for compound on wrong side not caught")
        }
    }

    #[test]
    fn invalid_abundance() {
        let mut reaction = Reaction::new("rxn1");
        reaction.add_left_compounds([a()]);
        if let Err(ReactionError::InvalidAbundance { .. }) =
            reaction.set_left_compound_abundance(&a(), -1.0)
        {
        } else {
            panic!("Negative abundance not caught")
        }
        if let Err(ReactionError::InvalidAbundance { .. }) =
            reaction.set_left_compound_abundance(&a(), f64::NAN)
        {
        } else {
            panic!("NaN abundance not caught")
        }
        // Unset abundances can't be read
        if let Err(ReactionError::MissingAbundance { .. }) =
            reaction.get_left_compound_abundance(&a())
        {
        } else {
            panic!("Missing abundance not caught")
        }
    }

    #[test]
    fn direction_symbols() {
        let mut reaction = Reaction::new("rxn1");
        assert_eq!(reaction.set_direction("="), Direction::Bidirectional);
        assert_eq!(reaction.set_direction(">"), Direction::Forward);
        assert_eq!(reaction.set_direction("<=>"), Direction::Unknown);
        assert_eq!(format!("{}", Direction::Reverse), "<");
    }

    #[test]
    fn compound_queries() {
        let reaction = a_to_b();
        assert!(reaction.has(&a()));
        assert_eq!(reaction.number_of_compounds(), 2);
        assert!(reaction.opposite_sides(&a(), &b()).unwrap());
        let c = Compound::new("C", Some("c"));
        if let Err(ReactionError::CompoundNotInReaction(_)) = reaction.opposite_sides(&a(), &c) {
        } else {
            panic!("Missing compound not caught")
        }
    }

    #[test]
    fn structural_equality() {
        let forward = a_to_b();
        let backward =
            Reaction::from_sides("other", Direction::Forward, &[(b(), 1.0)], &[(a(), 1.0)])
                .unwrap();
        assert_eq!(forward, backward);
        // Hashing agrees with equality
        let mut set = HashSet::new();
        set.insert(forward);
        assert!(set.contains(&backward));

        let different =
            Reaction::from_sides("rxn1", Direction::Forward, &[(a(), 1.0)], &[]).unwrap();
        assert!(!set.contains(&different));
    }

    #[test]
    fn reversal() {
        let original = a_to_b();
        let reversed = original.reverse_reaction().unwrap();
        assert_eq!(reversed.direction, Direction::Reverse);
        assert!(reversed.left_compounds().contains(&b()));
        assert!((reversed.get_right_compound_abundance(&a()).unwrap() - 2.0).abs() < 1e-25);
        assert!((reversed.delta_g - 3.5).abs() < 1e-25);
        assert!((reversed.p_lr - 0.1).abs() < 1e-25);
        assert!((reversed.p_rl - 0.9).abs() < 1e-25);
        // The original isn't changed
        assert_eq!(original.direction, Direction::Forward);

        let twice = reversed.reverse_reaction().unwrap();
        assert_eq!(twice, original);
        assert_eq!(twice.left_compounds(), original.left_compounds());
        assert_eq!(twice.direction, Direction::Forward);
        assert!((twice.delta_g + 3.5).abs() < 1e-25);
    }

    #[test]
    fn reversal_needs_direction() {
        let mut reaction = a_to_b();
        reaction.direction = Direction::Unknown;
        if let Err(ReactionError::IndeterminateDirection(name)) = reaction.reverse_reaction() {
            assert_eq!(name, "rxn1");
        } else {
            panic!("Reversal of unknown direction not caught")
        }
    }

    #[test]
    fn input_output() {
        let outside = Compound::external("A");
        let mut uptake = Reaction::from_sides(
            "transport",
            Direction::Forward,
            &[(outside.clone(), 1.0)],
            &[(a(), 1.0)],
        )
        .unwrap();
        assert!(uptake.is_input_reaction());
        assert!(!uptake.is_output_reaction());

        let reversed = uptake.reverse_reaction().unwrap();
        assert!(!reversed.is_input_reaction());
        assert!(reversed.is_output_reaction());

        uptake.toggle_input_reaction();
        assert!(!uptake.is_input_reaction());
        uptake.toggle_output_reaction();
        assert!(uptake.is_output_reaction());
    }

    #[test]
    fn split() {
        let mut reaction = a_to_b();
        reaction.direction = Direction::Bidirectional;
        reaction.lower_bound = Some(-500.);
        reaction.upper_bound = Some(800.);

        let (forward, reverse) = reaction.split_reaction().unwrap();
        assert_eq!(forward.name, "rxn1_f");
        assert_eq!(forward.direction, Direction::Forward);
        assert_eq!(forward.lower_bound, Some(0.0));
        assert_eq!(forward.upper_bound, Some(800.));
        assert_eq!(forward.left_compounds(), reaction.left_compounds());

        assert_eq!(reverse.name, "rxn1_r");
        assert_eq!(reverse.direction, Direction::Reverse);
        assert_eq!(reverse.lower_bound, Some(-1000.));
        assert_eq!(reverse.upper_bound, Some(0.0));
        assert_eq!(reverse.left_compounds(), reaction.right_compounds());
        assert!((reverse.delta_g - 3.5).abs() < 1e-25);

        // Forward covers the positive fluxes, reverse the negative ones
        let f_range = (forward.lower_bound.unwrap(), forward.upper_bound.unwrap());
        let r_range = (reverse.lower_bound.unwrap(), reverse.upper_bound.unwrap());
        assert!(f_range.0 >= 0.0 && r_range.1 <= 0.0);
    }

    #[test]
    fn split_unbounded() {
        let mut reaction = a_to_b();
        reaction.direction = Direction::Bidirectional;
        let (forward, reverse) = reaction.split_reaction().unwrap();
        assert_eq!(forward.lower_bound, None);
        assert_eq!(reverse.upper_bound, None);

        reaction.direction = Direction::Forward;
        if let Err(ReactionError::NotBidirectional(_)) = reaction.split_reaction() {
        } else {
            panic!("Split of forward reaction not caught")
        }
    }

    #[test]
    fn builder() {
        let reaction = ReactionBuilder::default()
            .name("rxn2")
            .direction(Direction::Bidirectional)
            .lower_bound(Some(-10.))
            .build()
            .unwrap();
        assert_eq!(reaction.name, "rxn2");
        assert_eq!(reaction.number_of_compounds(), 0);
        assert!(!reaction.is_gapfilled);
        assert!(!reaction.is_input_reaction());
    }
}
