//! Shared foundation types for the kairos hardware simulator.
//!
//! This crate holds the pieces every other kairos crate builds on: the
//! three-state [`Logic`] scalar, the fixed-width [`Value`] bit vector with
//! its width-checked operations, interned identifiers, and content digests
//! used to fingerprint simulation runs.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod logic;
pub mod value;

pub use hash::{Digest, DigestWriter};
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use value::{Value, WidthError};
