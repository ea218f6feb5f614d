use sg_reflect::object::{Cast, Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::register_class;
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{Matrix, PrimitiveType, SparseMatrix, SparseVector};

use super::{FeatureScalar, Features};

/// Feature vectors with only their non-zero entries stored.
pub struct SparseFeatures<T: FeatureScalar> {
    pub matrix: SparseMatrix<T>,
    params: ParameterRegistry,
}

impl<T: FeatureScalar> Default for SparseFeatures<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: FeatureScalar> SparseFeatures<T> {
    /// An empty set of vectors of dimension `num_features`.
    pub fn new(num_features: usize) -> Self {
        Self {
            matrix: SparseMatrix::new(num_features),
            params: ParamsBuilder::<Self>::new("SparseFeatures")
                .add("sparse_feature_matrix", |f| &f.matrix, |f| &mut f.matrix, P::MODEL_STATE)
                .build(),
        }
    }

    /// Appends a vector, widening the set to its dimension.
    pub fn push(&mut self, vector: SparseVector<T>) {
        self.matrix.num_features = self.matrix.num_features.max(vector.dimension);
        self.matrix.vectors.push(vector);
    }

    pub(crate) const CAST: Cast<dyn Features> = Cast::new(
        |object| object.downcast_ref::<Self>().map(|f| f as &(dyn Features + 'static)),
        |object| object.downcast_mut::<Self>().map(|f| f as &mut (dyn Features + 'static)),
    );

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("SparseFeatures", T::PRIMITIVE_TYPE, || ObjectRef::new(Self::default())).with_cast(Self::CAST)
    }
}

impl<T: FeatureScalar> Features for SparseFeatures<T> {
    fn num_vectors(&self) -> usize {
        self.matrix.num_vectors()
    }

    fn num_features(&self) -> usize {
        self.matrix.num_features
    }

    fn to_dense(&self) -> Matrix<f64> {
        let mut dense = Matrix::new(self.matrix.num_features, self.matrix.num_vectors());
        for (col, vector) in self.matrix.vectors.iter().enumerate() {
            for entry in vector.entries.iter().filter(|e| e.index < self.matrix.num_features) {
                dense[(entry.index, col)] = entry.value.to_f64();
            }
        }
        dense
    }
}

impl<T: FeatureScalar> Object for SparseFeatures<T> {
    fn type_name(&self) -> &'static str {
        "SparseFeatures"
    }

    fn primitive_type(&self) -> PrimitiveType {
        T::PRIMITIVE_TYPE
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::default()))
    }
}

register_class!(SparseFeatures::<f32>::class_entry);
register_class!(SparseFeatures::<f64>::class_entry);
