use core::fmt;

use crate::error::{Error, Result};
use crate::object::ObjectRef;

/// Customization points around (de)serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookStage {
    PreSerialize,
    PostSerialize,
    PreDeserialize,
    PostDeserialize,
}

impl HookStage {
    pub const fn name(self) -> &'static str {
        match self {
            Self::PreSerialize => "pre_serialize",
            Self::PostSerialize => "post_serialize",
            Self::PreDeserialize => "pre_deserialize",
            Self::PostDeserialize => "post_deserialize",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Token passed to every hook.
///
/// The default hook bodies call [`chain`](Self::chain). An override must do
/// the same, otherwise the surrounding operation fails with
/// [`Error::ImplementationError`].
#[derive(Debug)]
pub struct Hook {
    stage: HookStage,
    chained: bool,
}

impl Hook {
    #[inline]
    pub(crate) fn new(stage: HookStage) -> Self {
        Self { stage, chained: false }
    }

    #[inline]
    pub fn stage(&self) -> HookStage {
        self.stage
    }

    /// Marks the base behavior as run.
    #[inline]
    pub fn chain(&mut self) {
        self.chained = true;
    }

    #[inline]
    pub fn is_chained(&self) -> bool {
        self.chained
    }
}

/// Runs the `stage` hook of `object` under its write lock and checks that
/// the implementation chained.
pub fn run_hook(object: &ObjectRef, stage: HookStage) -> Result<()> {
    let mut guard = object.write();
    let mut hook = Hook::new(stage);
    match stage {
        HookStage::PreSerialize => guard.pre_serialize(&mut hook)?,
        HookStage::PostSerialize => guard.post_serialize(&mut hook)?,
        HookStage::PreDeserialize => guard.pre_deserialize(&mut hook)?,
        HookStage::PostDeserialize => guard.post_deserialize(&mut hook)?,
    }
    if hook.is_chained() {
        Ok(())
    } else {
        Err(Error::ImplementationError {
            type_name: guard.type_name(),
            hook: stage,
        })
    }
}
