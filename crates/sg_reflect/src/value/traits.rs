use core::any::Any;

use crate::error::Result;
use crate::object::ObjectRef;
use crate::value::{AnyVisitor, AnyVisitorMut, TypeTag};

// -----------------------------------------------------------------------------
// Value

/// A field type that can be visited without knowing its static type.
///
/// Implemented for every scalar leaf, for nullable object references
/// (`Option<ObjectRef>`), and for the containers of this module nested to any
/// depth. Parameters store type-erased references to `dyn Value`.
pub trait Value: Any + Send + Sync + 'static {
    /// Tag of the type, without an instance.
    fn static_tag() -> TypeTag
    where
        Self: Sized;

    fn type_tag(&self) -> TypeTag;

    /// Some states, such as an unset [`Deferred`](crate::value::Deferred),
    /// have nothing to visit. Callers must check this before visiting.
    #[inline]
    fn visitable(&self) -> bool {
        true
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()>;

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()>;
}

// -----------------------------------------------------------------------------
// Object references

impl Value for Option<ObjectRef> {
    fn static_tag() -> TypeTag {
        TypeTag::Object
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::Object
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        match self {
            Some(object) => visitor.on_object(object),
            None => visitor.on_null(),
        }
    }

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        visitor.on_object(self)
    }
}

// -----------------------------------------------------------------------------
// Vectors

/// Upper bound on speculative reservations driven by a length read from a
/// stream; longer containers grow as elements actually arrive.
pub(crate) const MAX_PREALLOC: usize = 4096;

impl<T: Value + Default> Value for Vec<T> {
    fn static_tag() -> TypeTag {
        TypeTag::Vector(Box::new(T::static_tag()))
    }

    fn type_tag(&self) -> TypeTag {
        Self::static_tag()
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        visitor.enter_vector(self.len())?;
        for item in self {
            item.visit(visitor)?;
        }
        visitor.exit_vector(self.len())
    }

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        let mut len = self.len();
        visitor.enter_vector(&mut len)?;
        self.clear();
        self.reserve(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let mut item = T::default();
            item.visit_mut(visitor)?;
            self.push(item);
        }
        visitor.exit_vector()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::object::ObjectRef;
    use crate::value::{PrimitiveType, TypeTag, Value};

    #[test]
    fn static_tags() {
        assert_eq!(
            <Vec<Vec<u8>>>::static_tag(),
            TypeTag::Vector(Box::new(TypeTag::Vector(Box::new(TypeTag::Scalar(PrimitiveType::UInt8)))))
        );
        assert_eq!(<Option<ObjectRef>>::static_tag(), TypeTag::Object);
        assert_eq!(vec![String::new()].type_tag().to_string(), "vector<string>");
    }
}
