use std::vec::IntoIter;

use crate::error::{Error, Result, SchemaError};
use crate::object::ObjectRef;
use crate::value::{AnyValue, AnyVisitor, AnyVisitorMut, LeafMut, LeafRef, Scalar};

// -----------------------------------------------------------------------------
// DynamicValue

/// An owned snapshot of a visited value.
///
/// Produced by recording the visitor calls of a field ([`DynamicValue::record`])
/// and written back into a field of the same shape with
/// [`AnyValueMut::apply`](crate::value::AnyValueMut::apply). Clone, equality
/// and the JSON reader all go through this representation.
#[derive(Debug, Clone)]
pub enum DynamicValue {
    Scalar(Scalar),
    Null,
    Object(ObjectRef),
    Vector(Vec<DynamicValue>),
    /// Elements are column-major.
    Matrix {
        rows: usize,
        cols: usize,
        data: Vec<DynamicValue>,
    },
    SparseVector {
        dimension: usize,
        entries: Vec<(usize, DynamicValue)>,
    },
    /// Each vector is a [`DynamicValue::SparseVector`].
    SparseMatrix {
        num_features: usize,
        vectors: Vec<DynamicValue>,
    },
}

impl DynamicValue {
    /// Records `value`, keeping nested objects by reference.
    pub fn record(value: &AnyValue<'_>) -> Result<Self> {
        Self::record_with(value, &mut |object| Ok(object.clone()))
    }

    /// Records `value`, passing every nested object through `map_object`.
    ///
    /// Deep clone uses this to substitute each child by its clone.
    pub fn record_with(
        value: &AnyValue<'_>,
        map_object: &mut dyn FnMut(&ObjectRef) -> Result<ObjectRef>,
    ) -> Result<Self> {
        let mut recorder = Recorder {
            stack: Vec::new(),
            root: None,
            map_object,
        };
        value.visit(&mut recorder)?;
        match (recorder.root, recorder.stack.is_empty()) {
            (Some(root), true) => Ok(root),
            _ => Err(unbalanced()),
        }
    }

    /// Short shape name used in diagnostics.
    pub fn kind(&self) -> String {
        match self {
            Self::Scalar(scalar) => scalar.primitive_type().to_string(),
            Self::Null | Self::Object(_) => "object".to_owned(),
            Self::Vector(_) => "vector".to_owned(),
            Self::Matrix { .. } => "matrix".to_owned(),
            Self::SparseVector { .. } => "sparse_vector".to_owned(),
            Self::SparseMatrix { .. } => "sparse_matrix".to_owned(),
        }
    }
}

impl From<Scalar> for DynamicValue {
    #[inline]
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Option<ObjectRef>> for DynamicValue {
    fn from(value: Option<ObjectRef>) -> Self {
        value.map_or(Self::Null, Self::Object)
    }
}

// -----------------------------------------------------------------------------
// Recorder

enum Frame {
    Vector(Vec<DynamicValue>),
    Matrix {
        rows: usize,
        cols: usize,
        data: Vec<DynamicValue>,
    },
    SparseVector {
        dimension: usize,
        entries: Vec<(usize, DynamicValue)>,
        pending: Option<usize>,
    },
    SparseMatrix {
        num_features: usize,
        vectors: Vec<DynamicValue>,
    },
}

struct Recorder<'m> {
    stack: Vec<Frame>,
    root: Option<DynamicValue>,
    map_object: &'m mut dyn FnMut(&ObjectRef) -> Result<ObjectRef>,
}

fn unbalanced() -> Error {
    SchemaError::malformed("unbalanced visitor calls").into()
}

impl Recorder<'_> {
    fn push(&mut self, value: DynamicValue) -> Result<()> {
        match self.stack.last_mut() {
            None if self.root.is_none() => self.root = Some(value),
            None => return Err(unbalanced()),
            Some(Frame::Vector(items))
            | Some(Frame::Matrix { data: items, .. })
            | Some(Frame::SparseMatrix { vectors: items, .. }) => items.push(value),
            Some(Frame::SparseVector { entries, pending, .. }) => {
                let index = pending
                    .take()
                    .ok_or_else(|| SchemaError::malformed("sparse value without index"))?;
                entries.push((index, value));
            }
        }
        Ok(())
    }
}

impl AnyVisitor for Recorder<'_> {
    fn on(&mut self, leaf: LeafRef<'_>) -> Result<()> {
        self.push(DynamicValue::Scalar(leaf.to_scalar()))
    }

    fn on_object(&mut self, object: &ObjectRef) -> Result<()> {
        let mapped = (self.map_object)(object)?;
        self.push(DynamicValue::Object(mapped))
    }

    fn on_null(&mut self) -> Result<()> {
        self.push(DynamicValue::Null)
    }

    fn enter_vector(&mut self, len: usize) -> Result<()> {
        self.stack.push(Frame::Vector(Vec::with_capacity(len)));
        Ok(())
    }

    fn exit_vector(&mut self, _len: usize) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Vector(items)) => self.push(DynamicValue::Vector(items)),
            _ => Err(unbalanced()),
        }
    }

    fn enter_matrix(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.stack.push(Frame::Matrix {
            rows,
            cols,
            data: Vec::with_capacity(rows.saturating_mul(cols)),
        });
        Ok(())
    }

    fn exit_matrix(&mut self, _rows: usize, _cols: usize) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::Matrix { rows, cols, data }) => self.push(DynamicValue::Matrix { rows, cols, data }),
            _ => Err(unbalanced()),
        }
    }

    fn enter_sparse_vector(&mut self, dimension: usize, nnz: usize) -> Result<()> {
        self.stack.push(Frame::SparseVector {
            dimension,
            entries: Vec::with_capacity(nnz),
            pending: None,
        });
        Ok(())
    }

    fn sparse_index(&mut self, index: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(Frame::SparseVector { pending, .. }) if pending.is_none() => {
                *pending = Some(index);
                Ok(())
            }
            _ => Err(unbalanced()),
        }
    }

    fn exit_sparse_vector(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::SparseVector {
                dimension,
                entries,
                pending: None,
            }) => self.push(DynamicValue::SparseVector { dimension, entries }),
            _ => Err(unbalanced()),
        }
    }

    fn enter_sparse_matrix(&mut self, num_vectors: usize, num_features: usize) -> Result<()> {
        self.stack.push(Frame::SparseMatrix {
            num_features,
            vectors: Vec::with_capacity(num_vectors),
        });
        Ok(())
    }

    fn exit_sparse_matrix(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(Frame::SparseMatrix { num_features, vectors }) => {
                self.push(DynamicValue::SparseMatrix { num_features, vectors })
            }
            _ => Err(unbalanced()),
        }
    }
}

// -----------------------------------------------------------------------------
// Replayer

enum Cursor {
    Items(IntoIter<DynamicValue>),
    Entries {
        entries: IntoIter<(usize, DynamicValue)>,
        pending: Option<DynamicValue>,
    },
}

/// Mutating visitor that feeds a [`DynamicValue`] into a live field.
pub(crate) struct Replayer {
    root: Option<DynamicValue>,
    stack: Vec<Cursor>,
}

impl Replayer {
    pub(crate) fn new(value: DynamicValue) -> Self {
        Self {
            root: Some(value),
            stack: Vec::new(),
        }
    }

    /// Checks that the field consumed the whole value.
    pub(crate) fn finish(self) -> Result<()> {
        if self.root.is_none() && self.stack.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::malformed("value only partially consumed").into())
        }
    }

    fn take(&mut self) -> Result<DynamicValue> {
        let next = match self.stack.last_mut() {
            None => self.root.take(),
            Some(Cursor::Items(items)) => items.next(),
            Some(Cursor::Entries { pending, .. }) => pending.take(),
        };
        next.ok_or_else(|| SchemaError::malformed("container holds fewer elements than announced").into())
    }

    fn pop(&mut self) -> Result<()> {
        let exhausted = match self.stack.pop() {
            Some(Cursor::Items(mut items)) => items.next().is_none(),
            Some(Cursor::Entries { mut entries, pending }) => entries.next().is_none() && pending.is_none(),
            None => false,
        };
        if exhausted {
            Ok(())
        } else {
            Err(SchemaError::malformed("container holds more elements than announced").into())
        }
    }
}

fn mismatch(expected: impl ToString, found: &DynamicValue) -> Error {
    SchemaError::incompatible(expected, found.kind()).into()
}

impl AnyVisitorMut for Replayer {
    fn on(&mut self, leaf: LeafMut<'_>) -> Result<()> {
        match self.take()? {
            DynamicValue::Scalar(scalar) => Ok(leaf.set(scalar)?),
            other => Err(mismatch(leaf.primitive_type(), &other)),
        }
    }

    fn on_object(&mut self, slot: &mut Option<ObjectRef>) -> Result<()> {
        match self.take()? {
            DynamicValue::Null => *slot = None,
            DynamicValue::Object(object) => *slot = Some(object),
            other => return Err(mismatch("object", &other)),
        }
        Ok(())
    }

    fn enter_vector(&mut self, len: &mut usize) -> Result<()> {
        match self.take()? {
            DynamicValue::Vector(items) => {
                *len = items.len();
                self.stack.push(Cursor::Items(items.into_iter()));
                Ok(())
            }
            other => Err(mismatch("vector", &other)),
        }
    }

    fn exit_vector(&mut self) -> Result<()> {
        self.pop()
    }

    fn enter_matrix(&mut self, rows: &mut usize, cols: &mut usize) -> Result<()> {
        match self.take()? {
            DynamicValue::Matrix {
                rows: r,
                cols: c,
                data,
            } => {
                if r.checked_mul(c) != Some(data.len()) {
                    return Err(SchemaError::malformed(format!(
                        "matrix of {r}x{c} holds {} elements",
                        data.len()
                    ))
                    .into());
                }
                *rows = r;
                *cols = c;
                self.stack.push(Cursor::Items(data.into_iter()));
                Ok(())
            }
            other => Err(mismatch("matrix", &other)),
        }
    }

    fn exit_matrix(&mut self) -> Result<()> {
        self.pop()
    }

    fn enter_sparse_vector(&mut self, dimension: &mut usize, nnz: &mut usize) -> Result<()> {
        match self.take()? {
            DynamicValue::SparseVector {
                dimension: d,
                entries,
            } => {
                *dimension = d;
                *nnz = entries.len();
                self.stack.push(Cursor::Entries {
                    entries: entries.into_iter(),
                    pending: None,
                });
                Ok(())
            }
            other => Err(mismatch("sparse_vector", &other)),
        }
    }

    fn sparse_index(&mut self, index: &mut usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(Cursor::Entries { entries, pending }) if pending.is_none() => {
                let (i, value) = entries
                    .next()
                    .ok_or_else(|| SchemaError::malformed("sparse vector holds fewer entries than announced"))?;
                *index = i;
                *pending = Some(value);
                Ok(())
            }
            _ => Err(SchemaError::malformed("sparse index outside a sparse vector").into()),
        }
    }

    fn exit_sparse_vector(&mut self) -> Result<()> {
        self.pop()
    }

    fn enter_sparse_matrix(&mut self, num_vectors: &mut usize, num_features: &mut usize) -> Result<()> {
        match self.take()? {
            DynamicValue::SparseMatrix {
                num_features: f,
                vectors,
            } => {
                *num_vectors = vectors.len();
                *num_features = f;
                self.stack.push(Cursor::Items(vectors.into_iter()));
                Ok(())
            }
            other => Err(mismatch("sparse_matrix", &other)),
        }
    }

    fn exit_sparse_matrix(&mut self) -> Result<()> {
        self.pop()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::DynamicValue;
    use crate::error::{Error, SchemaError};
    use crate::value::{AnyValue, AnyValueMut, Deferred, Matrix, Scalar, SparseMatrix, SparseVector};

    fn record<T: crate::value::Value>(value: &T) -> DynamicValue {
        DynamicValue::record(&AnyValue::new(value)).unwrap()
    }

    #[test]
    fn records_nested_shapes() {
        let value = vec![vec![1_u16, 2], vec![]];
        match record(&value) {
            DynamicValue::Vector(outer) => {
                assert_eq!(outer.len(), 2);
                assert!(matches!(&outer[1], DynamicValue::Vector(inner) if inner.is_empty()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn replays_into_empty_fields() {
        let mut sparse = SparseMatrix::new(4);
        sparse.vectors.push(SparseVector::from_pairs(4, [(1, 0.5_f32), (3, -1.0)]));
        sparse.vectors.push(SparseVector::new(4));

        let mut target = SparseMatrix::<f32>::default();
        AnyValueMut::new(&mut target).apply(record(&sparse)).unwrap();
        assert_eq!(target, sparse);

        let matrix = Matrix::from_column_major(2, 2, vec!["a".to_owned(), "b".into(), "c".into(), "d".into()]).unwrap();
        let mut target = Matrix::<String>::default();
        AnyValueMut::new(&mut target).apply(record(&matrix)).unwrap();
        assert_eq!(target, matrix);

        let mut deferred = Deferred::<Vec<i64>>::empty();
        AnyValueMut::new(&mut deferred).apply(record(&vec![7_i64])).unwrap();
        assert_eq!(deferred.get(), Some(&vec![7]));
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut target = vec![0.0_f64];
        let err = AnyValueMut::new(&mut target)
            .apply(DynamicValue::Scalar(Scalar::Float64(1.0)))
            .unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::IncompatibleType { .. })));

        let err = AnyValueMut::new(&mut target)
            .apply(DynamicValue::Vector(vec![DynamicValue::Scalar(Scalar::Float32(1.0))]))
            .unwrap_err();
        match err {
            Error::Schema(SchemaError::IncompatibleType { expected, found, .. }) => {
                assert_eq!(expected, "float64");
                assert_eq!(found, "float32");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn out_of_range_sparse_index_is_malformed() {
        let mut target = SparseVector::<u8>::default();
        let value = DynamicValue::SparseVector {
            dimension: 2,
            entries: vec![(5, DynamicValue::Scalar(Scalar::UInt8(1)))],
        };
        let err = AnyValueMut::new(&mut target).apply(value).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Malformed(_))));
    }
}
