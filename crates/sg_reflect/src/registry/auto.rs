use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::registry::{ClassEntry, ClassRegistry};
use crate::value::PrimitiveType;

/// A statically submitted class, collected by [`bootstrap`].
///
/// Submitted with [`register_class!`](crate::register_class).
pub struct ClassRegistration(pub fn() -> ClassEntry);

#[cfg(feature = "auto_register")]
inventory::collect!(ClassRegistration);

/// Submits a class for [`bootstrap`].
///
/// Takes the path of a `fn() -> ClassEntry`. Expands to nothing without the
/// `auto_register` feature; such builds register classes by hand with
/// [`ClassRegistry::register`].
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_class {
    ($entry:path) => {
        $crate::__macro_exports::auto_register::inventory::submit! {
            $crate::__macro_exports::auto_register::ClassRegistration($entry)
        }
    };
}

/// Submits a class for [`bootstrap`].
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_class {
    ($entry:path) => {};
}

type Bootstrapped = core::result::Result<ClassRegistry, (&'static str, PrimitiveType)>;

static REGISTRY: OnceLock<Bootstrapped> = OnceLock::new();

/// The process-wide class registry, built from every
/// [`register_class!`](crate::register_class) submission on first call.
///
/// Fails with [`Error::DuplicateClass`] if two submissions share a
/// `(name, primitive type)` key; the failure is remembered and returned by
/// every later call.
pub fn bootstrap() -> Result<&'static ClassRegistry> {
    let bootstrapped = REGISTRY.get_or_init(|| {
        let mut registry = ClassRegistry::new();
        for registration in submissions() {
            let entry = (registration.0)();
            let key = (entry.name(), entry.primitive_type());
            if registry.register(entry).is_err() {
                log::error!("class `{}` ({}) is registered twice", key.0, key.1);
                return Err(key);
            }
        }
        log::debug!("class registry bootstrapped with {} classes", registry.len());
        Ok(registry)
    });

    match bootstrapped {
        Ok(registry) => Ok(registry),
        Err((name, primitive_type)) => Err(Error::DuplicateClass {
            name: *name,
            primitive_type: *primitive_type,
        }),
    }
}

#[cfg(feature = "auto_register")]
fn submissions() -> impl Iterator<Item = &'static ClassRegistration> {
    inventory::iter::<ClassRegistration>.into_iter()
}

#[cfg(not(feature = "auto_register"))]
fn submissions() -> impl Iterator<Item = &'static ClassRegistration> {
    core::iter::empty()
}
