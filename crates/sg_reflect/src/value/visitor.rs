use crate::error::Result;
use crate::object::ObjectRef;
use crate::value::{LeafMut, LeafRef};

/// Read-only visitor over a [`Value`](crate::value::Value).
///
/// A scalar leaf produces exactly one [`on`](Self::on) call and an object
/// reference exactly one [`on_object`](Self::on_object) or
/// [`on_null`](Self::on_null) call. Containers produce a matched
/// `enter_*`/`exit_*` pair around their elements, even when empty. Inside a
/// sparse vector every element is preceded by [`sparse_index`](Self::sparse_index).
///
/// Visitors do not recurse into objects on their own; `on_object` decides
/// whether to descend.
pub trait AnyVisitor {
    fn on(&mut self, leaf: LeafRef<'_>) -> Result<()>;

    fn on_object(&mut self, object: &ObjectRef) -> Result<()>;

    fn on_null(&mut self) -> Result<()>;

    fn enter_vector(&mut self, len: usize) -> Result<()>;

    fn exit_vector(&mut self, len: usize) -> Result<()>;

    /// Elements follow in column-major order.
    fn enter_matrix(&mut self, rows: usize, cols: usize) -> Result<()>;

    fn exit_matrix(&mut self, rows: usize, cols: usize) -> Result<()>;

    fn enter_sparse_vector(&mut self, dimension: usize, nnz: usize) -> Result<()>;

    fn sparse_index(&mut self, index: usize) -> Result<()>;

    fn exit_sparse_vector(&mut self) -> Result<()>;

    /// Each of the `num_vectors` sparse vectors follows as a nested
    /// `enter_sparse_vector`/`exit_sparse_vector` pair.
    fn enter_sparse_matrix(&mut self, num_vectors: usize, num_features: usize) -> Result<()>;

    fn exit_sparse_matrix(&mut self) -> Result<()>;
}

/// Mutating visitor, used by readers to write into live fields.
///
/// Sizes are passed by reference: the value announces its current size, the
/// visitor overwrites it with the size it is about to provide, and the value
/// resizes itself before visiting its elements. Object slots are handed over
/// whole so that readers can fill, replace or clear them.
pub trait AnyVisitorMut {
    fn on(&mut self, leaf: LeafMut<'_>) -> Result<()>;

    fn on_object(&mut self, slot: &mut Option<ObjectRef>) -> Result<()>;

    fn enter_vector(&mut self, len: &mut usize) -> Result<()>;

    fn exit_vector(&mut self) -> Result<()>;

    fn enter_matrix(&mut self, rows: &mut usize, cols: &mut usize) -> Result<()>;

    fn exit_matrix(&mut self) -> Result<()>;

    fn enter_sparse_vector(&mut self, dimension: &mut usize, nnz: &mut usize) -> Result<()>;

    fn sparse_index(&mut self, index: &mut usize) -> Result<()>;

    fn exit_sparse_vector(&mut self) -> Result<()>;

    fn enter_sparse_matrix(&mut self, num_vectors: &mut usize, num_features: &mut usize) -> Result<()>;

    fn exit_sparse_matrix(&mut self) -> Result<()>;
}
