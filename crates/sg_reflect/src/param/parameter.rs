use core::any::Any;
use core::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::object::Object;
use crate::param::{Ownership, ParameterProperties};
use crate::value::{AnyValue, AnyValueMut, TypeTag, Value};

// -----------------------------------------------------------------------------
// Accessor

/// Projection from an owning object to one of its fields.
///
/// Both methods return `None` when `owner` is not of the type the accessor
/// was built for.
pub trait Accessor: Send + Sync + 'static {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Value>;

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Value>;
}

/// An [`Accessor`] made of two plain field projections.
pub struct FieldAccessor<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
}

impl<T, F> FieldAccessor<T, F> {
    pub const fn new(get: fn(&T) -> &F, get_mut: fn(&mut T) -> &mut F) -> Self {
        Self { get, get_mut }
    }
}

impl<T: Any, F: Value> Accessor for FieldAccessor<T, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Value> {
        let owner = owner.downcast_ref::<T>()?;
        Some((self.get)(owner))
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Any) -> Option<&'a mut dyn Value> {
        let owner = owner.downcast_mut::<T>()?;
        Some((self.get_mut)(owner))
    }
}

// -----------------------------------------------------------------------------
// Parameter

/// A named, typed slot of an [`Object`].
///
/// The parameter does not borrow its owner: it stores an accessor and
/// produces an [`AnyValue`] on demand from the owner passed in. Cloning a
/// parameter is cheap.
#[derive(Clone)]
pub struct Parameter {
    name: &'static str,
    description: &'static str,
    properties: ParameterProperties,
    ownership: Ownership,
    type_tag: TypeTag,
    accessor: Arc<dyn Accessor>,
}

impl Parameter {
    /// Creates a parameter for the field of `T` reached through `get` and `get_mut`.
    pub fn new<T: Any, F: Value>(
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
        properties: ParameterProperties,
    ) -> Self {
        Self {
            name,
            description: "",
            properties,
            ownership: Ownership::Owned,
            type_tag: F::static_tag(),
            accessor: Arc::new(FieldAccessor::new(get, get_mut)),
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    #[inline]
    pub fn properties(&self) -> ParameterProperties {
        self.properties
    }

    #[inline]
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Declared type of the field.
    #[inline]
    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    /// Whether every flag in `properties` is set.
    #[inline]
    pub fn has_property(&self, properties: ParameterProperties) -> bool {
        self.properties.contains(properties)
    }

    /// Borrows the field inside `owner`.
    pub fn value<'a>(&self, owner: &'a dyn Object) -> Result<AnyValue<'a>> {
        let type_name = owner.type_name();
        self.accessor
            .get(owner)
            .map(AnyValue::new)
            .ok_or_else(|| self.foreign_owner(type_name))
    }

    /// Mutably borrows the field inside `owner`.
    ///
    /// The registry holding this parameter usually lives in `owner` too;
    /// clone the parameter first to release that borrow.
    pub fn value_mut<'a>(&self, owner: &'a mut dyn Object) -> Result<AnyValueMut<'a>> {
        let type_name = owner.type_name();
        self.accessor
            .get_mut(owner)
            .map(AnyValueMut::new)
            .ok_or_else(|| self.foreign_owner(type_name))
    }

    #[cold]
    fn foreign_owner(&self, type_name: &'static str) -> Error {
        Error::TypeMismatch {
            type_name: type_name.into(),
            expected: format!("the owner of parameter `{}`", self.name).into(),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("type_tag", &self.type_tag)
            .field("properties", &self.properties)
            .field("ownership", &self.ownership)
            .finish_non_exhaustive()
    }
}
