//! Items used by exported macros. Not public API.

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use crate::registry::ClassRegistration;
    pub use inventory;
}
