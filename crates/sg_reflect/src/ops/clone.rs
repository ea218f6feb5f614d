use crate::error::{Error, Result};
use crate::object::ObjectRef;
use crate::ops::CycleGuard;
use crate::param::Ownership;
use crate::value::DynamicValue;

/// Deep copy of `object`.
///
/// Creates a fresh instance with [`Object::create_empty`](crate::Object::create_empty)
/// and copies every visitable parameter into it. Scalars and containers get
/// new storage. Nested objects are cloned recursively, except in
/// [`Ownership::Shared`] parameters, where the clone refers to the very same
/// objects as the original.
///
/// # Errors
///
/// - [`Error::UnsupportedOperation`] if some object in the graph cannot
///   create an empty instance.
/// - [`Error::CyclicReference`] if an object is reachable from itself
///   through owned parameters.
///
/// # Examples
///
/// See the [crate documentation](crate).
pub fn clone_object(object: &ObjectRef) -> Result<ObjectRef> {
    clone_inner(object, &mut CycleGuard::new())
}

fn clone_inner(source: &ObjectRef, guard: &mut CycleGuard) -> Result<ObjectRef> {
    guard.enter(source)?;
    let src = source.read();
    let type_name = src.type_name();

    let target = src.create_empty().ok_or_else(|| Error::UnsupportedOperation {
        type_name: type_name.into(),
        operation: "clone",
    })?;
    log::debug!("cloning `{type_name}` (depth {})", guard.depth());

    guard.push(source, type_name);
    for param in src.parameters() {
        let value = param.value(&*src)?;
        if !value.visitable() {
            continue;
        }

        let recorded = match param.ownership() {
            Ownership::Shared => DynamicValue::record(&value)?,
            Ownership::Owned => DynamicValue::record_with(&value, &mut |child| clone_inner(child, guard))?,
        };

        let mut dst = target.write();
        let slot = dst.parameters().get(param.name())?.clone();
        slot.value_mut(&mut *dst)?
            .apply(recorded)
            .map_err(|err| err.in_field(param.name()))?;
    }
    guard.pop();

    Ok(target)
}

// -----------------------------------------------------------------------------
// Tests
