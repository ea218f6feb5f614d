#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// Lets the exported macros refer to `sg_reflect` from inside this crate as well.
extern crate self as sg_reflect;

// -----------------------------------------------------------------------------
// Modules

mod error;

pub mod object;
pub mod ops;
pub mod param;
pub mod registry;
pub mod serde;
pub mod value;

#[cfg(test)]
pub(crate) mod mock;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::{Error, Result, SchemaError};
pub use object::{Object, ObjectRef};
