//! Small shared utilities for the `sg_*` crates: a fixed-seed hash map
//! and an inline-first vector.

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
pub mod vec;
