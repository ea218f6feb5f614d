//! Creation of objects by class name.
//!
//! ## Menu
//!
//! - [`ClassEntry`]: factory and capability casts of one `(name, primitive type)` key.
//! - [`ClassRegistry`]: table of entries, queried by deserializers and by
//!   typed factories.
//! - [`bootstrap`]: the process-wide registry, built once from
//!   [`register_class!`](crate::register_class) submissions.
//!
//! ## auto_register
//!
//! Static submission uses the [`inventory`](https://docs.rs/inventory) crate
//! behind the `auto_register` feature. Without it, [`bootstrap`] returns an
//! empty registry and programs build their own with
//! [`ClassRegistry::register`].

// -----------------------------------------------------------------------------
// Modules

mod auto;
mod class_registry;
mod entry;

// -----------------------------------------------------------------------------
// Exports

pub use auto::{ClassRegistration, bootstrap};
pub use class_registry::ClassRegistry;
pub use entry::{ClassEntry, Factory};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ClassEntry, ClassRegistry};
    use crate::cast;
    use crate::error::Error;
    use crate::mock::{MockObject, MockPart, Weighted};
    use crate::value::PrimitiveType;

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry.register(MockObject::class_entry()).unwrap();
        registry.register(MockPart::class_entry()).unwrap();
        registry
    }

    #[test]
    fn create_by_name() {
        let registry = registry();
        let object = registry.create("MockPart", PrimitiveType::NotGeneric).unwrap();
        assert!(object.is::<MockPart>());
        assert_eq!(
            registry.available_objects().into_iter().collect::<Vec<_>>(),
            ["MockObject", "MockPart"]
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unknown_class() {
        let registry = registry();
        match registry.create("NoSuchClass", PrimitiveType::Float64) {
            Err(err @ Error::ClassNotFound { .. }) => assert!(err.is_programmer_error()),
            other => panic!("unexpected {other:?}"),
        }
        // Known name, unknown specialization.
        assert!(matches!(
            registry.create("MockPart", PrimitiveType::Float32),
            Err(Error::ClassNotFound { .. })
        ));
    }

    #[test]
    fn capability_mismatch_is_not_class_not_found() {
        let registry = registry();
        let typed = registry
            .create_typed::<dyn Weighted>("MockPart", PrimitiveType::NotGeneric)
            .unwrap();
        assert_eq!(typed.with(|w| w.weight()).unwrap(), 0.0);
        typed.with_mut(|w| w.set_weight(3.0)).unwrap();
        assert_eq!(typed.object().get::<f64>("weight").unwrap(), 3.0);

        assert!(matches!(
            registry.create_typed::<dyn Weighted>("MockObject", PrimitiveType::NotGeneric),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            registry.create_typed::<dyn Weighted>("NoSuchClass", PrimitiveType::NotGeneric),
            Err(Error::ClassNotFound { .. })
        ));
    }

    #[test]
    fn cast_existing_objects() {
        let registry = registry();
        let part = crate::ObjectRef::new(MockPart::new(1.5));
        let guard = part.read();
        let weighted = registry.cast::<dyn Weighted>(&*guard).unwrap();
        assert_eq!(weighted.weight(), 1.5);
        drop(guard);
        assert!(registry.typed::<dyn Weighted>(&part).is_ok());
    }

    #[test]
    fn duplicate_registration() {
        let mut registry = registry();
        let err = registry
            .register(ClassEntry::new("MockPart", PrimitiveType::NotGeneric, MockPart::factory))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateClass {
                name: "MockPart",
                primitive_type: PrimitiveType::NotGeneric
            }
        ));

        // Another specialization of the same name is a different key.
        registry
            .register(
                ClassEntry::new("MockPart", PrimitiveType::Float32, MockPart::factory)
                    .with_cast(cast!(MockPart => Weighted)),
            )
            .unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.available_objects().len(), 2);
    }

    #[test]
    fn bootstrap_is_consistent() {
        let first = super::bootstrap().unwrap();
        let second = super::bootstrap().unwrap();
        assert!(core::ptr::eq(first, second));
    }
}
