//! Module for reading and writing gapfill problems
pub mod json;

use thiserror::Error;

use crate::metabolism::reaction::{ReactionBuilderError, ReactionError};

/// Errors associated with reading and writing gapfill problems
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    /// A reaction side or the medium refers to a compound that isn't listed
    #[error("{referrer} refers to unknown compound {compound}")]
    UnknownCompound { compound: String, referrer: String },
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
