use core::any::type_name;
use core::fmt;

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef};

// -----------------------------------------------------------------------------
// Cast

/// Conversion from `dyn Object` to the capability trait object `C`.
///
/// Casts are registered per class in the
/// [`ClassRegistry`](crate::registry::ClassRegistry) and built with
/// [`cast!`](crate::cast).
pub struct Cast<C: ?Sized + 'static> {
    get: for<'a> fn(&'a (dyn Object + 'static)) -> Option<&'a C>,
    get_mut: for<'a> fn(&'a mut (dyn Object + 'static)) -> Option<&'a mut C>,
}

impl<C: ?Sized + 'static> Cast<C> {
    pub const fn new(
        get: for<'a> fn(&'a (dyn Object + 'static)) -> Option<&'a C>,
        get_mut: for<'a> fn(&'a mut (dyn Object + 'static)) -> Option<&'a mut C>,
    ) -> Self {
        Self { get, get_mut }
    }

    #[inline]
    pub fn get<'a>(&self, object: &'a (dyn Object + 'static)) -> Option<&'a C> {
        (self.get)(object)
    }

    #[inline]
    pub fn get_mut<'a>(&self, object: &'a mut (dyn Object + 'static)) -> Option<&'a mut C> {
        (self.get_mut)(object)
    }
}

impl<C: ?Sized + 'static> Clone for Cast<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized + 'static> Copy for Cast<C> {}

impl<C: ?Sized + 'static> fmt::Debug for Cast<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cast<{}>", type_name::<C>())
    }
}

/// Builds a [`Cast`] from a concrete object type to one of its traits.
///
/// ```
/// use sg_reflect::cast;
/// use sg_reflect::object::{Cast, Object, ObjectRef};
/// use sg_reflect::param::{ParameterRegistry, ParamsBuilder};
///
/// trait Named { fn label(&self) -> String; }
///
/// struct Unit(ParameterRegistry);
/// impl Named for Unit { fn label(&self) -> String { "unit".into() } }
/// impl Object for Unit {
///     fn type_name(&self) -> &'static str { "Unit" }
///     fn parameters(&self) -> &ParameterRegistry { &self.0 }
///     fn create_empty(&self) -> Option<ObjectRef> { None }
/// }
///
/// let to_named: Cast<dyn Named> = cast!(Unit => Named);
/// let unit = ObjectRef::new(Unit(ParamsBuilder::<Unit>::new("Unit").build()));
/// let guard = unit.read();
/// assert_eq!(to_named.get(&*guard).unwrap().label(), "unit");
/// ```
#[macro_export]
macro_rules! cast {
    ($ty:ty => $capability:path) => {{
        fn get<'a>(object: &'a (dyn $crate::object::Object + 'static)) -> Option<&'a (dyn $capability + 'static)> {
            object
                .downcast_ref::<$ty>()
                .map(|object| object as &(dyn $capability + 'static))
        }

        fn get_mut<'a>(
            object: &'a mut (dyn $crate::object::Object + 'static),
        ) -> Option<&'a mut (dyn $capability + 'static)> {
            object
                .downcast_mut::<$ty>()
                .map(|object| object as &mut (dyn $capability + 'static))
        }

        $crate::object::Cast::<dyn $capability>::new(get, get_mut)
    }};
}

// -----------------------------------------------------------------------------
// TypedRef

/// An [`ObjectRef`] known to implement the capability `C`.
///
/// Returned by [`ClassRegistry::create_typed`](crate::registry::ClassRegistry::create_typed).
pub struct TypedRef<C: ?Sized + 'static> {
    object: ObjectRef,
    cast: Cast<C>,
}

impl<C: ?Sized + 'static> TypedRef<C> {
    pub fn new(object: ObjectRef, cast: Cast<C>) -> Self {
        Self { object, cast }
    }

    #[inline]
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    #[inline]
    pub fn into_object(self) -> ObjectRef {
        self.object
    }

    /// Runs `f` on the capability view of the object.
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Result<R> {
        let guard = self.object.read();
        match self.cast.get(&*guard) {
            Some(view) => Ok(f(view)),
            None => Err(cast_failed::<C>(guard.type_name())),
        }
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> Result<R> {
        let mut guard = self.object.write();
        let type_name = guard.type_name();
        match self.cast.get_mut(&mut *guard) {
            Some(view) => Ok(f(view)),
            None => Err(cast_failed::<C>(type_name)),
        }
    }
}

impl<C: ?Sized + 'static> Clone for TypedRef<C> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            cast: self.cast,
        }
    }
}

impl<C: ?Sized + 'static> fmt::Debug for TypedRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedRef").field(&self.object).finish()
    }
}

#[cold]
fn cast_failed<C: ?Sized>(type_name: &'static str) -> Error {
    Error::TypeMismatch {
        type_name: type_name.into(),
        expected: core::any::type_name::<C>().into(),
    }
}
