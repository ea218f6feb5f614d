//! The [`Object`] trait, shared handles and capability casts.

mod base;
mod capability;
mod hooks;
mod reference;

pub use base::Object;
pub use capability::{Cast, TypedRef};
pub use hooks::{Hook, HookStage, run_hook};
pub use reference::{ObjectRef, get, put};

// -----------------------------------------------------------------------------
// Tests
