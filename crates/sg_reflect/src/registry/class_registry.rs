use core::any::type_name;
use std::collections::BTreeSet;

use sg_utils::hash::HashMap;

use crate::error::{Error, Result};
use crate::object::{Object, ObjectRef, TypedRef};
use crate::registry::{ClassEntry, Factory};
use crate::value::PrimitiveType;

/// Process-wide table from `(class name, primitive type)` to factories.
///
/// Usually populated once by [`bootstrap`](crate::registry::bootstrap) and
/// only read afterwards, so a shared reference can be queried from any
/// thread.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<&'static str, HashMap<PrimitiveType, ClassEntry>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry`, failing with [`Error::DuplicateClass`] if its key is taken.
    pub fn register(&mut self, entry: ClassEntry) -> Result<()> {
        let slots = self.classes.entry(entry.name()).or_default();
        if slots.contains_key(&entry.primitive_type()) {
            return Err(Error::DuplicateClass {
                name: entry.name(),
                primitive_type: entry.primitive_type(),
            });
        }
        log::debug!("registered class `{}` ({})", entry.name(), entry.primitive_type());
        slots.insert(entry.primitive_type(), entry);
        Ok(())
    }

    /// Adds a class without capability casts.
    pub fn register_factory(
        &mut self,
        name: &'static str,
        primitive_type: PrimitiveType,
        factory: Factory,
    ) -> Result<()> {
        self.register(ClassEntry::new(name, primitive_type, factory))
    }

    pub fn entry(&self, name: &str, primitive_type: PrimitiveType) -> Option<&ClassEntry> {
        self.classes.get(name)?.get(&primitive_type)
    }

    #[inline]
    pub fn contains(&self, name: &str, primitive_type: PrimitiveType) -> bool {
        self.entry(name, primitive_type).is_some()
    }

    /// A new default-constructed instance of the class.
    ///
    /// Fails with [`Error::ClassNotFound`] for an unknown key.
    pub fn create(&self, name: &str, primitive_type: PrimitiveType) -> Result<ObjectRef> {
        let entry = self.entry(name, primitive_type).ok_or_else(|| Error::ClassNotFound {
            name: name.to_owned(),
            primitive_type,
        })?;
        log::debug!("creating `{name}` ({primitive_type})");
        Ok(entry.create())
    }

    /// Like [`create`](Self::create), and additionally requires the class to
    /// implement the capability `C`.
    ///
    /// A known class without that capability fails with
    /// [`Error::TypeMismatch`], never with [`Error::ClassNotFound`].
    pub fn create_typed<C: ?Sized + 'static>(
        &self,
        name: &str,
        primitive_type: PrimitiveType,
    ) -> Result<TypedRef<C>> {
        let object = self.create(name, primitive_type)?;
        let cast = self
            .entry(name, primitive_type)
            .and_then(ClassEntry::cast::<C>)
            .ok_or_else(|| Error::TypeMismatch {
                type_name: name.to_owned().into(),
                expected: type_name::<C>().into(),
            })?;
        Ok(TypedRef::new(object, cast))
    }

    /// Views an existing object through the capability `C`, if its class
    /// registered one.
    pub fn typed<C: ?Sized + 'static>(&self, object: &ObjectRef) -> Result<TypedRef<C>> {
        let (name, primitive_type) = {
            let guard = object.read();
            (guard.type_name(), guard.primitive_type())
        };
        self.entry(name, primitive_type)
            .and_then(ClassEntry::cast::<C>)
            .map(|cast| TypedRef::new(object.clone(), cast))
            .ok_or_else(|| Error::TypeMismatch {
                type_name: name.into(),
                expected: type_name::<C>().into(),
            })
    }

    /// Borrows `object` through the capability `C`.
    pub fn cast<'a, C: ?Sized + 'static>(&self, object: &'a (dyn Object + 'static)) -> Option<&'a C> {
        self.entry(object.type_name(), object.primitive_type())?
            .cast::<C>()?
            .get(object)
    }

    /// Names of all registered classes, sorted.
    ///
    /// Intended for introspection and documentation tooling.
    pub fn available_objects(&self) -> BTreeSet<&'static str> {
        self.classes.keys().copied().collect()
    }

    /// All entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = &ClassEntry> + '_ {
        self.classes.values().flat_map(|slots| slots.values())
    }

    /// Number of `(name, primitive type)` slots.
    pub fn len(&self) -> usize {
        self.classes.values().map(|slots| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
