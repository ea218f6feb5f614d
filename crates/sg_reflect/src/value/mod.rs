//! Type-erased values and their visitors.
//!
//! Every field registered as a parameter implements [`Value`]. A value is
//! either a scalar leaf (see [`PrimitiveType`]), a nullable object reference,
//! or a container ([`Vec`], [`Matrix`], [`SparseVector`], [`SparseMatrix`])
//! of values. Visiting a value produces one leaf callback per scalar and a
//! matched `enter`/`exit` pair per container, so a visitor can stream any
//! shape without knowing the concrete Rust type.
//!
//! [`DynamicValue`] is the owned form of a visited value, used to move data
//! between fields of different objects.

// -----------------------------------------------------------------------------
// Modules

mod any_value;
mod containers;
mod dynamic;
mod leaf;
mod primitive;
mod tag;
mod traits;
mod visitor;

// -----------------------------------------------------------------------------
// Exports

pub use any_value::{AnyValue, AnyValueMut};
pub use containers::{Deferred, Matrix, SparseEntry, SparseMatrix, SparseVector};
pub use dynamic::DynamicValue;
pub use leaf::{LeafMut, LeafRef, Scalar};
pub use primitive::{Complex128, FloatMax, PrimitiveType};
pub use tag::TypeTag;
pub use traits::Value;
pub use visitor::{AnyVisitor, AnyVisitorMut};

pub(crate) use traits::MAX_PREALLOC;
