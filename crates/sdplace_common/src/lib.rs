//! Shared foundational types used across the sdplace workspace.
//!
//! This crate provides the physical [`Bel`] coordinate shared by the netlist,
//! configuration, and placement crates, and the [`ContentHash`] used to
//! fingerprint placement results.

#![warn(missing_docs)]

pub mod bel;
pub mod hash;

pub use bel::{Bel, ParseBelError};
pub use hash::ContentHash;
