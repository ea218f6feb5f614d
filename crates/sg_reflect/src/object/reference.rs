use core::any::{Any, type_name};
use core::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};
use crate::object::Object;
use crate::param::ParameterProperties;
use crate::value::Value;

/// Shared, reference-counted handle to an [`Object`].
///
/// Cloning the handle aliases the object; use
/// [`clone_object`](crate::ops::clone_object) for a deep copy. Access goes
/// through a read-write lock, so a handle can be sent across threads, but
/// callers must not hold a guard while visiting the same object again.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn Object>>);

impl ObjectRef {
    pub fn new<T: Object>(object: T) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    /// Shared access. A poisoned lock is recovered.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, dyn Object> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access. A poisoned lock is recovered.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Object> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity of the referenced object, stable for its lifetime.
    #[inline]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Whether both handles refer to the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.id() == other.id()
    }

    /// Number of live handles to the object.
    #[inline]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    pub fn type_name(&self) -> &'static str {
        self.read().type_name()
    }

    pub fn is<T: Object>(&self) -> bool {
        self.read().is::<T>()
    }

    /// Runs `f` on the concrete object.
    ///
    /// Fails with [`Error::TypeMismatch`] if the object is not a `T`.
    pub fn with<T: Object, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let guard = self.read();
        match guard.downcast_ref::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(mismatch::<T>(guard.type_name())),
        }
    }

    /// Runs `f` on the concrete object, mutably.
    pub fn with_mut<T: Object, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.write();
        let type_name = guard.type_name();
        match guard.downcast_mut::<T>() {
            Some(object) => Ok(f(object)),
            None => Err(mismatch::<T>(type_name)),
        }
    }

    /// Reads parameter `name` as a `T`.
    ///
    /// Fails with [`Error::ParameterNotFound`] or, if the field has another
    /// type, with [`Error::TypeMismatch`].
    pub fn get<T: Value + Clone>(&self, name: &str) -> Result<T> {
        let guard = self.read();
        let param = guard.parameters().get(name)?;
        let value = param.value(&*guard)?;
        match value.downcast_ref::<T>() {
            Some(v) => Ok(v.clone()),
            None => Err(Error::TypeMismatch {
                type_name: param.type_tag().to_string().into(),
                expected: type_name::<T>().into(),
            }),
        }
    }

    /// Assigns parameter `name`.
    ///
    /// Fails like [`get`](Self::get), and with
    /// [`Error::UnsupportedOperation`] on a [`READONLY`](ParameterProperties::READONLY)
    /// parameter.
    pub fn put<T: Value>(&self, name: &str, value: T) -> Result<()> {
        let mut guard = self.write();
        let param = guard.parameters().get(name)?.clone();
        if param.has_property(ParameterProperties::READONLY) {
            return Err(Error::UnsupportedOperation {
                type_name: guard.type_name().into(),
                operation: "put on a read-only parameter",
            });
        }
        let mut slot = param.value_mut(&mut *guard)?;
        match slot.downcast_mut::<T>() {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::TypeMismatch {
                type_name: param.type_tag().to_string().into(),
                expected: type_name::<T>().into(),
            }),
        }
    }
}

#[cold]
fn mismatch<T: Any>(type_name: &'static str) -> Error {
    Error::TypeMismatch {
        type_name: type_name.into(),
        expected: core::any::type_name::<T>().into(),
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `try_read` keeps `{:?}` usable while the object is locked.
        match self.0.try_read() {
            Ok(guard) => write!(f, "ObjectRef({}@{:#x})", guard.type_name(), self.id()),
            Err(_) => write!(f, "ObjectRef(<locked>@{:#x})", self.id()),
        }
    }
}

/// Reads parameter `name` of `object`, see [`ObjectRef::get`].
#[inline]
pub fn get<T: Value + Clone>(object: &ObjectRef, name: &str) -> Result<T> {
    object.get(name)
}

/// Assigns parameter `name` of `object`, see [`ObjectRef::put`].
#[inline]
pub fn put<T: Value>(object: &ObjectRef, name: &str, value: T) -> Result<()> {
    object.put(name, value)
}
