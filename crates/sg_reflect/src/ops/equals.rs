use crate::error::Result;
use crate::object::ObjectRef;
use crate::ops::CycleGuard;
use crate::value::DynamicValue;

/// Options of [`equals_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualsConfig {
    /// Largest absolute difference at which two floating-point leaves still
    /// compare equal. NaN always equals NaN.
    pub float_tolerance: f64,
}

impl Default for EqualsConfig {
    fn default() -> Self {
        Self { float_tolerance: 0.0 }
    }
}

/// Structural equality with [`EqualsConfig::default`].
#[inline]
pub fn equals(a: &ObjectRef, b: &ObjectRef) -> Result<bool> {
    equals_with(a, b, &EqualsConfig::default())
}

/// Structural equality of two object graphs.
///
/// Objects are equal when they have the same type name, primitive type and
/// parameter names, and every parameter holds an equal value: scalars by
/// value, containers element-wise with equal shape, nested objects
/// recursively. Identity is not required, but a handle always equals itself.
///
/// Objects of different types compare unequal; that is never an error. The
/// only error is [`Error::CyclicReference`](crate::Error::CyclicReference).
pub fn equals_with(a: &ObjectRef, b: &ObjectRef, config: &EqualsConfig) -> Result<bool> {
    Comparison {
        config,
        guard: CycleGuard::new(),
    }
    .objects(a, b)
}

struct Comparison<'c> {
    config: &'c EqualsConfig,
    guard: CycleGuard,
}

impl Comparison<'_> {
    fn objects(&mut self, a: &ObjectRef, b: &ObjectRef) -> Result<bool> {
        if a.ptr_eq(b) {
            return Ok(true);
        }
        self.guard.enter(a)?;

        let (lhs, rhs) = (a.read(), b.read());
        if lhs.type_name() != rhs.type_name()
            || lhs.primitive_type() != rhs.primitive_type()
            || lhs.parameters().len() != rhs.parameters().len()
        {
            return Ok(false);
        }

        self.guard.push(a, lhs.type_name());
        for pa in lhs.parameters() {
            let Some(pb) = rhs.parameters().find(pa.name()) else {
                self.guard.pop();
                return Ok(false);
            };
            let (va, vb) = (pa.value(&*lhs)?, pb.value(&*rhs)?);

            let same = match (va.visitable(), vb.visitable()) {
                (false, false) => true,
                (true, true) if va.type_tag() == vb.type_tag() => {
                    let (da, db) = (DynamicValue::record(&va)?, DynamicValue::record(&vb)?);
                    self.values(&da, &db)?
                }
                _ => false,
            };
            if !same {
                log::trace!("`{}` differs in `{}`", lhs.type_name(), pa.name());
                self.guard.pop();
                return Ok(false);
            }
        }
        self.guard.pop();

        Ok(true)
    }

    fn values(&mut self, a: &DynamicValue, b: &DynamicValue) -> Result<bool> {
        use DynamicValue as V;

        Ok(match (a, b) {
            (V::Scalar(x), V::Scalar(y)) => x.approx_eq(y, self.config.float_tolerance),
            (V::Null, V::Null) => true,
            (V::Object(x), V::Object(y)) => self.objects(x, y)?,
            (V::Vector(x), V::Vector(y)) => self.all(x, y)?,
            (
                V::Matrix { rows, cols, data },
                V::Matrix {
                    rows: rows_b,
                    cols: cols_b,
                    data: data_b,
                },
            ) => rows == rows_b && cols == cols_b && self.all(data, data_b)?,
            (
                V::SparseVector { dimension, entries },
                V::SparseVector {
                    dimension: dimension_b,
                    entries: entries_b,
                },
            ) => {
                if dimension != dimension_b || entries.len() != entries_b.len() {
                    return Ok(false);
                }
                for ((ia, va), (ib, vb)) in entries.iter().zip(entries_b) {
                    if ia != ib || !self.values(va, vb)? {
                        return Ok(false);
                    }
                }
                true
            }
            (
                V::SparseMatrix { num_features, vectors },
                V::SparseMatrix {
                    num_features: num_features_b,
                    vectors: vectors_b,
                },
            ) => num_features == num_features_b && self.all(vectors, vectors_b)?,
            _ => false,
        })
    }

    fn all(&mut self, a: &[DynamicValue], b: &[DynamicValue]) -> Result<bool> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for (x, y) in a.iter().zip(b) {
            if !self.values(x, y)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{EqualsConfig, equals, equals_with};
    use crate::error::Error;
    use crate::mock::{MockContainer, MockObject, MockPart};
    use crate::object::ObjectRef;
    use crate::value::{Complex128, FloatMax, SparseVector};

    #[test]
    fn identity_and_structure() {
        let a = ObjectRef::new(MockObject::filled());
        let b = ObjectRef::new(MockObject::filled());
        assert!(equals(&a, &a).unwrap());
        assert!(equals(&a, &b).unwrap());
        assert!(equals(&b, &a).unwrap());
    }

    #[test]
    fn different_types_are_unequal() {
        let a = ObjectRef::new(MockObject::filled());
        let b = ObjectRef::new(MockPart::new(1.0));
        assert!(!equals(&a, &b).unwrap());
    }

    #[test]
    fn every_shape_is_compared() {
        let a = ObjectRef::new(MockObject::filled());

        let cases: Vec<Box<dyn Fn(&ObjectRef)>> = vec![
            Box::new(|o: &ObjectRef| o.put("some_bool", false).unwrap()),
            Box::new(|o: &ObjectRef| o.put("some_floatmax", FloatMax(0.0)).unwrap()),
            Box::new(|o: &ObjectRef| o.put("some_complex", Complex128::new(0.0, 0.0)).unwrap()),
            Box::new(|o: &ObjectRef| o.put("some_string", String::from("other")).unwrap()),
            Box::new(|o: &ObjectRef| o.put("vector", vec![1.0_f64]).unwrap()),
            Box::new(|o: &ObjectRef| o.put("sparse", SparseVector::from_pairs(8, [(7, 1.0_f64)])).unwrap()),
            Box::new(|o: &ObjectRef| o.put("owned_part", Some(ObjectRef::new(MockPart::new(-5.0)))).unwrap()),
            Box::new(|o: &ObjectRef| o.put("owned_part", None::<ObjectRef>).unwrap()),
        ];
        for (index, mutate) in cases.iter().enumerate() {
            let b = ObjectRef::new(MockObject::filled());
            mutate(&b);
            assert!(!equals(&a, &b).unwrap(), "case {index} compared equal");
        }
    }

    #[test]
    fn float_tolerance_and_nan() {
        let a = ObjectRef::new(MockPart::new(f64::NAN));
        let b = ObjectRef::new(MockPart::new(f64::NAN));
        assert!(equals(&a, &b).unwrap());

        let a = ObjectRef::new(MockPart::new(1.0));
        let b = ObjectRef::new(MockPart::new(1.0 + 1e-9));
        assert!(!equals(&a, &b).unwrap());
        assert!(equals_with(&a, &b, &EqualsConfig { float_tolerance: 1e-6 }).unwrap());
    }

    #[test]
    fn cycles_are_reported() {
        let a = ObjectRef::new(MockContainer::new(Vec::new()));
        let b = ObjectRef::new(MockContainer::new(Vec::new()));
        a.put("children", vec![Some(a.clone())]).unwrap();
        b.put("children", vec![Some(b.clone())]).unwrap();

        assert!(matches!(equals(&a, &b), Err(Error::CyclicReference { .. })));

        a.put("children", Vec::<Option<ObjectRef>>::new()).unwrap();
        b.put("children", Vec::<Option<ObjectRef>>::new()).unwrap();
        assert!(equals(&a, &b).unwrap());
    }
}
