#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Modules

mod capability;
mod error;
mod factory;

pub mod features;
pub mod kernel;
pub mod labels;
pub mod machine;
pub mod transformer;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use error::{ModelError, Result};
pub use factory::{entries, features, kernel, labels, machine, register_all, transformer};
