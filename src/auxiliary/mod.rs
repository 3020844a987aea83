//! Helper items describing the molecular system attached to a driver result.

pub mod atom;
pub mod molecule;
