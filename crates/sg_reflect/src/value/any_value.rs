use core::any::{Any, TypeId};
use core::fmt;

use crate::error::Result;
use crate::value::dynamic::Replayer;
use crate::value::{AnyVisitor, AnyVisitorMut, DynamicValue, TypeTag, Value};

// -----------------------------------------------------------------------------
// AnyValue

/// A borrowed, type-erased field, produced on demand by a
/// [`Parameter`](crate::param::Parameter).
///
/// It refers to the live storage of the owning object, it never copies.
#[derive(Clone, Copy)]
pub struct AnyValue<'a> {
    value: &'a dyn Value,
}

impl<'a> AnyValue<'a> {
    #[inline]
    pub fn new(value: &'a dyn Value) -> Self {
        Self { value }
    }

    #[inline]
    pub fn visitable(&self) -> bool {
        self.value.visitable()
    }

    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        self.value.type_tag()
    }

    /// [`TypeId`] of the concrete field type.
    #[inline]
    pub fn value_type_id(&self) -> TypeId {
        (self.value as &dyn Any).type_id()
    }

    #[inline]
    pub fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        self.value.visit(visitor)
    }

    pub fn downcast_ref<T: Value>(&self) -> Option<&'a T> {
        (self.value as &dyn Any).downcast_ref()
    }

    #[inline]
    pub fn as_value(&self) -> &'a dyn Value {
        self.value
    }
}

impl fmt::Debug for AnyValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("type_tag", &self.type_tag())
            .field("visitable", &self.visitable())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// AnyValueMut

/// Exclusive counterpart of [`AnyValue`], used to write into a field.
pub struct AnyValueMut<'a> {
    value: &'a mut dyn Value,
}

impl<'a> AnyValueMut<'a> {
    #[inline]
    pub fn new(value: &'a mut dyn Value) -> Self {
        Self { value }
    }

    #[inline]
    pub fn as_ref(&self) -> AnyValue<'_> {
        AnyValue::new(&*self.value)
    }

    #[inline]
    pub fn type_tag(&self) -> TypeTag {
        self.value.type_tag()
    }

    #[inline]
    pub fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        self.value.visit_mut(visitor)
    }

    pub fn downcast_mut<T: Value>(&mut self) -> Option<&mut T> {
        (&mut *self.value as &mut dyn Any).downcast_mut()
    }

    /// Writes a recorded value into the field.
    ///
    /// The shape of `value` must match the field's [`TypeTag`] exactly,
    /// otherwise a [`SchemaError::IncompatibleType`](crate::SchemaError) is
    /// returned and the field may be left partially written.
    pub fn apply(&mut self, value: DynamicValue) -> Result<()> {
        let mut replayer = Replayer::new(value);
        self.value.visit_mut(&mut replayer)?;
        replayer.finish()
    }
}

impl fmt::Debug for AnyValueMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}
