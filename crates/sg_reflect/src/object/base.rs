use core::any::Any;

use crate::error::Result;
use crate::object::{Hook, ObjectRef};
use crate::param::ParameterRegistry;
use crate::value::PrimitiveType;

/// A reflective entity with a named, typed parameter set.
///
/// Objects are shared through [`ObjectRef`]. Everything generic in this
/// crate (clone, equality, serialization, creation by name) works from the
/// four required methods alone.
///
/// # Hooks
///
/// The four hooks run around (de)serialization with exclusive access to the
/// object. Overrides must call [`Hook::chain`]; a hook that forgets to makes
/// the surrounding `write`/`read` fail with
/// [`Error::ImplementationError`](crate::Error::ImplementationError).
pub trait Object: Any + Send + Sync + 'static {
    /// Stable class name, the key of the [`ClassRegistry`](crate::registry::ClassRegistry).
    fn type_name(&self) -> &'static str;

    /// Scalar specialization of a generic class.
    fn primitive_type(&self) -> PrimitiveType {
        PrimitiveType::NotGeneric
    }

    fn parameters(&self) -> &ParameterRegistry;

    /// A new default-constructed instance of the same runtime type.
    ///
    /// Returning `None` makes [`clone_object`](crate::ops::clone_object) fail
    /// with [`Error::UnsupportedOperation`](crate::Error::UnsupportedOperation).
    fn create_empty(&self) -> Option<ObjectRef>;

    /// Learning task implemented by the object, if any.
    fn implements(&self) -> Option<&'static str> {
        None
    }

    fn pre_serialize(&mut self, hook: &mut Hook) -> Result<()> {
        hook.chain();
        Ok(())
    }

    fn post_serialize(&mut self, hook: &mut Hook) -> Result<()> {
        hook.chain();
        Ok(())
    }

    fn pre_deserialize(&mut self, hook: &mut Hook) -> Result<()> {
        hook.chain();
        Ok(())
    }

    fn post_deserialize(&mut self, hook: &mut Hook) -> Result<()> {
        hook.chain();
        Ok(())
    }
}

impl dyn Object {
    /// Whether the concrete type is `T`.
    #[inline]
    pub fn is<T: Object>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    #[inline]
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    #[inline]
    pub fn downcast_mut<T: Object>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut()
    }
}
