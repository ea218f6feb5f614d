//! Generic operations over object graphs: deep clone and structural equality.
//!
//! Both walk the [`ParameterRegistry`](crate::param::ParameterRegistry) of
//! each object and record parameter values as
//! [`DynamicValue`](crate::value::DynamicValue)s. Both keep the path of
//! objects being visited and fail with
//! [`Error::CyclicReference`](crate::Error::CyclicReference) when an object
//! is reached again from itself.

mod clone;
mod equals;
mod guard;

pub use clone::clone_object;
pub use equals::{EqualsConfig, equals, equals_with};

pub(crate) use guard::CycleGuard;
