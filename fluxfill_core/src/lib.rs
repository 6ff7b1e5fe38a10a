//! Core rust implementation of fluxfill, a crate for flux balance analysis and gapfilling
//! of metabolic networks.
//!
//! A network is a set of [`metabolism::reaction::Reaction`]s between
//! [`metabolism::compound::Compound`]s. [`fba::run_fba`] decides whether the network
//! grows in a medium, and [`gapfill::GapfillSession`] adds candidate reactions to a network
//! that doesn't until it does, then reduces them to the ones that are needed.

pub mod configuration;
pub mod fba;
pub mod gapfill;
pub mod io;
pub mod metabolism;
pub mod optimize;
pub mod probability;
