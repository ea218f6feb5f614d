//! Re-exports [`fastvec`]'s inline-first vector.
//!
//! Used where a handful of items is collected on a hot path,
//! such as the persisted parameters of one object.

pub use fastvec::FastVec;
