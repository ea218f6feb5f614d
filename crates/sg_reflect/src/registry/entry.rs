use core::any::{Any, TypeId};
use core::fmt;

use sg_utils::hash::HashMap;

use crate::object::{Cast, ObjectRef};
use crate::value::PrimitiveType;

/// Creates a default-constructed instance of a class.
pub type Factory = fn() -> ObjectRef;

/// One `(name, primitive type)` slot of the
/// [`ClassRegistry`](crate::registry::ClassRegistry).
pub struct ClassEntry {
    name: &'static str,
    primitive_type: PrimitiveType,
    factory: Factory,
    casts: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ClassEntry {
    pub fn new(name: &'static str, primitive_type: PrimitiveType, factory: Factory) -> Self {
        Self {
            name,
            primitive_type,
            factory,
            casts: HashMap::default(),
        }
    }

    /// Declares that instances implement the capability `C`.
    ///
    /// ```
    /// # use sg_reflect::{cast, object::{Object, ObjectRef}, param::ParameterRegistry};
    /// # use sg_reflect::registry::ClassEntry;
    /// # use sg_reflect::value::PrimitiveType;
    /// trait Scorer { fn score(&self) -> f64; }
    /// # struct Constant(ParameterRegistry);
    /// # impl Scorer for Constant { fn score(&self) -> f64 { 1.0 } }
    /// # impl Object for Constant {
    /// #     fn type_name(&self) -> &'static str { "Constant" }
    /// #     fn parameters(&self) -> &ParameterRegistry { &self.0 }
    /// #     fn create_empty(&self) -> Option<ObjectRef> { Some(new()) }
    /// # }
    /// # fn new() -> ObjectRef { ObjectRef::new(Constant(ParameterRegistry::new("Constant"))) }
    ///
    /// let entry = ClassEntry::new("Constant", PrimitiveType::NotGeneric, new)
    ///     .with_cast(cast!(Constant => Scorer));
    /// assert!(entry.cast::<dyn Scorer>().is_some());
    /// ```
    pub fn with_cast<C: ?Sized + 'static>(mut self, cast: Cast<C>) -> Self {
        self.casts.insert(TypeId::of::<C>(), Box::new(cast));
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    #[inline]
    pub fn factory(&self) -> Factory {
        self.factory
    }

    #[inline]
    pub fn create(&self) -> ObjectRef {
        (self.factory)()
    }

    /// The registered cast to `C`, if the class declared it.
    pub fn cast<C: ?Sized + 'static>(&self) -> Option<Cast<C>> {
        self.casts
            .get(&TypeId::of::<C>())
            .and_then(|cast| cast.downcast_ref::<Cast<C>>())
            .copied()
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("name", &self.name)
            .field("primitive_type", &self.primitive_type)
            .field("casts", &self.casts.len())
            .finish_non_exhaustive()
    }
}
