//! Domain layer types and invariants.

pub mod assets;
pub mod document;
pub mod error;
