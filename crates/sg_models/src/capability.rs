use core::any::type_name;

use sg_reflect::object::{Cast, ObjectRef, TypedRef};

/// Views `object` through the first of `casts` that accepts its concrete type.
///
/// Nested components (the kernel of a machine, the stages of a pipeline) are
/// reached this way, independent of any class registry.
pub(crate) fn view<C: ?Sized + 'static>(object: &ObjectRef, casts: &[Cast<C>]) -> sg_reflect::Result<TypedRef<C>> {
    let guard = object.read();
    match casts.iter().find(|cast| cast.get(&*guard).is_some()) {
        Some(cast) => Ok(TypedRef::new(object.clone(), *cast)),
        None => Err(sg_reflect::Error::TypeMismatch {
            type_name: guard.type_name().into(),
            expected: type_name::<C>().into(),
        }),
    }
}
