use core::ops::{Index, IndexMut};

use crate::error::{Error, Result, SchemaError};
use crate::value::traits::MAX_PREALLOC;
use crate::value::{AnyVisitor, AnyVisitorMut, TypeTag, Value};

// -----------------------------------------------------------------------------
// Matrix

/// Dense matrix stored in column-major order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Matrix<T> {
    /// A `rows x cols` matrix filled with `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn new(rows: usize, cols: usize) -> Self {
        match Self::try_new(rows, cols) {
            Some(matrix) => matrix,
            None => panic!("matrix of {rows}x{cols} elements overflows"),
        }
    }

    /// Like [`new`](Self::new), `None` if `rows * cols` overflows.
    pub fn try_new(rows: usize, cols: usize) -> Option<Self> {
        let len = rows.checked_mul(cols)?;
        Some(Self {
            rows,
            cols,
            data: vec![T::default(); len],
        })
    }
}

impl<T> Matrix<T> {
    /// Wraps column-major `data`, returning `None` if its length is not
    /// `rows * cols`.
    pub fn from_column_major(rows: usize, cols: usize, data: Vec<T>) -> Option<Self> {
        (rows.checked_mul(cols) == Some(data.len())).then_some(Self { rows, cols, data })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn column(&self, col: usize) -> &[T] {
        &self.data[col * self.rows..(col + 1) * self.rows]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        (row < self.rows && col < self.cols).then(|| &self.data[col * self.rows + row])
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &self.data[col * self.rows + row]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        &mut self.data[col * self.rows + row]
    }
}

impl<T: Value + Default> Value for Matrix<T> {
    fn static_tag() -> TypeTag {
        TypeTag::Matrix(Box::new(T::static_tag()))
    }

    fn type_tag(&self) -> TypeTag {
        Self::static_tag()
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        visitor.enter_matrix(self.rows, self.cols)?;
        for item in &self.data {
            item.visit(visitor)?;
        }
        visitor.exit_matrix(self.rows, self.cols)
    }

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        let (mut rows, mut cols) = (self.rows, self.cols);
        visitor.enter_matrix(&mut rows, &mut cols)?;
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| SchemaError::malformed(format!("matrix of {rows}x{cols} elements")))?;

        self.rows = rows;
        self.cols = cols;
        self.data.clear();
        self.data.reserve(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let mut item = T::default();
            item.visit_mut(visitor)?;
            self.data.push(item);
        }
        visitor.exit_matrix()
    }
}

// -----------------------------------------------------------------------------
// Sparse vector

/// One stored element of a [`SparseVector`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseEntry<T> {
    pub index: usize,
    pub value: T,
}

/// Sparse vector of a fixed dimension, storing only its non-zero entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseVector<T> {
    pub dimension: usize,
    pub entries: Vec<SparseEntry<T>>,
}

impl<T> SparseVector<T> {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Builds a sparse vector from `(index, value)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if an index is not below `dimension`.
    pub fn from_pairs(dimension: usize, pairs: impl IntoIterator<Item = (usize, T)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(index, value)| {
                assert!(index < dimension, "sparse index {index} out of dimension {dimension}");
                SparseEntry { index, value }
            })
            .collect();
        Self { dimension, entries }
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

impl<T: Value + Default> Value for SparseVector<T> {
    fn static_tag() -> TypeTag {
        TypeTag::SparseVector(Box::new(T::static_tag()))
    }

    fn type_tag(&self) -> TypeTag {
        Self::static_tag()
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        visitor.enter_sparse_vector(self.dimension, self.entries.len())?;
        for entry in &self.entries {
            visitor.sparse_index(entry.index)?;
            entry.value.visit(visitor)?;
        }
        visitor.exit_sparse_vector()
    }

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        let (mut dimension, mut nnz) = (self.dimension, self.entries.len());
        visitor.enter_sparse_vector(&mut dimension, &mut nnz)?;

        self.dimension = dimension;
        self.entries.clear();
        self.entries.reserve(nnz.min(MAX_PREALLOC));
        for _ in 0..nnz {
            let mut index = 0;
            visitor.sparse_index(&mut index)?;
            if index >= dimension {
                return Err(Error::from(SchemaError::malformed(format!(
                    "sparse index {index} out of dimension {dimension}"
                ))));
            }
            let mut value = T::default();
            value.visit_mut(visitor)?;
            self.entries.push(SparseEntry { index, value });
        }
        visitor.exit_sparse_vector()
    }
}

// -----------------------------------------------------------------------------
// Sparse matrix

/// A list of sparse vectors sharing one feature dimension.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseMatrix<T> {
    pub num_features: usize,
    pub vectors: Vec<SparseVector<T>>,
}

impl<T> SparseMatrix<T> {
    pub fn new(num_features: usize) -> Self {
        Self {
            num_features,
            vectors: Vec::new(),
        }
    }

    #[inline]
    pub fn num_vectors(&self) -> usize {
        self.vectors.len()
    }
}

impl<T: Value + Default> Value for SparseMatrix<T> {
    fn static_tag() -> TypeTag {
        TypeTag::SparseMatrix(Box::new(T::static_tag()))
    }

    fn type_tag(&self) -> TypeTag {
        Self::static_tag()
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        visitor.enter_sparse_matrix(self.vectors.len(), self.num_features)?;
        for vector in &self.vectors {
            vector.visit(visitor)?;
        }
        visitor.exit_sparse_matrix()
    }

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        let (mut num_vectors, mut num_features) = (self.vectors.len(), self.num_features);
        visitor.enter_sparse_matrix(&mut num_vectors, &mut num_features)?;

        self.num_features = num_features;
        self.vectors.clear();
        self.vectors.reserve(num_vectors.min(MAX_PREALLOC));
        for _ in 0..num_vectors {
            let mut vector = SparseVector::new(num_features);
            vector.visit_mut(visitor)?;
            if vector.dimension > num_features {
                return Err(Error::from(SchemaError::malformed(format!(
                    "sparse vector of dimension {} in a matrix of {num_features} features",
                    vector.dimension
                ))));
            }
            self.vectors.push(vector);
        }
        visitor.exit_sparse_matrix()
    }
}

// -----------------------------------------------------------------------------
// Deferred

/// A slot that may not hold a value yet.
///
/// An empty slot is not [`visitable`](Value::visitable): serializers and
/// clone skip it and the receiving side keeps its own state. Writing into an
/// empty slot through [`Value::visit_mut`] first fills it with
/// `T::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred<T>(Option<T>);

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Deferred<T> {
    pub const fn empty() -> Self {
        Self(None)
    }

    pub const fn new(value: T) -> Self {
        Self(Some(value))
    }

    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.0.as_mut()
    }

    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    pub fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl<T: Value + Default> Value for Deferred<T> {
    fn static_tag() -> TypeTag {
        T::static_tag()
    }

    fn type_tag(&self) -> TypeTag {
        T::static_tag()
    }

    fn visitable(&self) -> bool {
        self.0.as_ref().is_some_and(Value::visitable)
    }

    fn visit(&self, visitor: &mut dyn AnyVisitor) -> Result<()> {
        match &self.0 {
            Some(value) => value.visit(visitor),
            None => Err(Error::UnsupportedOperation {
                type_name: core::any::type_name::<Self>().into(),
                operation: "visit of an unset value",
            }),
        }
    }

    fn visit_mut(&mut self, visitor: &mut dyn AnyVisitorMut) -> Result<()> {
        self.0.get_or_insert_with(T::default).visit_mut(visitor)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Deferred, Matrix, SparseMatrix, SparseVector};
    use crate::value::{PrimitiveType, TypeTag, Value};

    #[test]
    fn matrix_is_column_major() {
        let m = Matrix::from_column_major(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(m[(1, 0)], 2);
        assert_eq!(m[(0, 2)], 5);
        assert_eq!(m.column(1), &[3, 4]);
        assert_eq!(m.get(2, 0), None);
        assert!(Matrix::from_column_major(2, 2, vec![1, 2, 3]).is_none());
    }

    #[test]
    fn matrix_size_overflow() {
        assert!(Matrix::<f64>::try_new(usize::MAX, 2).is_none());
        assert_eq!(Matrix::<u8>::try_new(3, 0).unwrap().as_slice().len(), 0);
        assert_eq!(Matrix::<u8>::new(2, 3).as_slice(), [0; 6]);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn matrix_new_panics_on_overflow() {
        let _ = Matrix::<f64>::new(usize::MAX, usize::MAX);
    }

    #[test]
    #[should_panic(expected = "out of dimension")]
    fn sparse_index_is_bounded() {
        let _ = SparseVector::from_pairs(3, [(0, 1.0_f64), (3, 2.0)]);
    }

    #[test]
    fn deferred_visitability() {
        let mut slot = Deferred::<f64>::empty();
        assert!(!slot.visitable());
        assert_eq!(slot.type_tag(), TypeTag::Scalar(PrimitiveType::Float64));
        slot.set(1.5);
        assert!(slot.visitable());
        assert_eq!(slot.take(), Some(1.5));
        assert!(!slot.is_set());
    }

    #[test]
    fn tags() {
        assert_eq!(SparseMatrix::<f32>::static_tag().to_string(), "sparse_matrix<float32>");
        assert_eq!(Matrix::<Option<crate::ObjectRef>>::static_tag().to_string(), "matrix<object>");
    }
}
