//! This module provides the Compound struct representing a chemical compound in a location
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Location tag used for compounds outside the cell
pub const EXTERNAL_LOCATION: &str = "e";

/// Represents a compound
///
/// Identity is the pair of `name` and `location`, the other fields are metadata and do not
/// take part in equality, ordering or hashing.
#[derive(Builder, Debug, Clone, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Compound {
    /// Used to identify the compound
    pub name: String,
    /// Which compartment the compound is in, `e` for external
    #[builder(default = "None")]
    pub location: Option<String>,
    /// Chemical formula of the compound
    #[builder(default = "None")]
    #[serde(default)]
    pub formula: Option<String>,
    /// Electrical charge of the compound
    #[builder(default = "0")]
    #[serde(default)]
    pub charge: i32,
}

impl Compound {
    /// Create a new compound with a name and an optional location
    pub fn new(name: &str, location: Option<&str>) -> Compound {
        Compound {
            name: name.to_string(),
            location: location.map(|l| l.to_string()),
            formula: None,
            charge: 0,
        }
    }

    /// Create a new compound in the external location
    pub fn external(name: &str) -> Compound {
        Compound::new(name, Some(EXTERNAL_LOCATION))
    }

    /// Whether the compound is outside the cell
    pub fn is_external(&self) -> bool {
        self.location.as_deref() == Some(EXTERNAL_LOCATION)
    }

    /// The id of the compound, used as the row label of the stoichiometric matrix
    /// and the key of the compound registry
    ///
    /// # Note:
    /// The id is "{name} ({location})", or just the name for compounds without a location
    pub fn id(&self) -> String {
        match &self.location {
            Some(location) => format!("{} ({})", self.name, location),
            None => self.name.clone(),
        }
    }
}

impl Display for Compound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl PartialEq for Compound {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.location == other.location
    }
}

impl Eq for Compound {}

impl Hash for Compound {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        if let Some(ref location) = self.location {
            location.hash(state)
        };
    }
}

impl PartialOrd for Compound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Compound {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.location.cmp(&other.location))
    }
}
