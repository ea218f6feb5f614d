//! Per-object parameter tables.
//!
//! An object registers each of its reflective fields once, in its
//! constructor, with a [`ParamsBuilder`]. The resulting
//! [`ParameterRegistry`] maps names to [`Parameter`]s, which hand out
//! type-erased references into the owner's fields on demand.

mod parameter;
mod properties;
mod registry;

pub use parameter::{Accessor, FieldAccessor, Parameter};
pub use properties::{Ownership, ParameterProperties};
pub use registry::{ParameterRegistry, ParamsBuilder};
