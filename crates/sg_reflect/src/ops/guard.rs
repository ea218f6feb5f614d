use crate::error::{Error, Result};
use crate::object::ObjectRef;

/// Ancestor path of the object graph walk in progress.
///
/// [`enter`](Self::enter) must run before the object is locked, so that a
/// cycle is reported instead of deadlocking on the ancestor's lock.
#[derive(Debug, Default)]
pub(crate) struct CycleGuard {
    path: Vec<(usize, &'static str)>,
}

impl CycleGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fails with [`Error::CyclicReference`] if `object` is an ancestor.
    pub(crate) fn enter(&self, object: &ObjectRef) -> Result<()> {
        let id = object.id();
        match self.path.iter().find(|(ancestor, _)| *ancestor == id) {
            Some(&(_, type_name)) => Err(Error::CyclicReference { type_name }),
            None => Ok(()),
        }
    }

    /// Records `object` as the innermost ancestor, after it was locked.
    pub(crate) fn push(&mut self, object: &ObjectRef, type_name: &'static str) {
        self.path.push((object.id(), type_name));
    }

    pub(crate) fn pop(&mut self) {
        self.path.pop();
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.path.len()
    }
}
