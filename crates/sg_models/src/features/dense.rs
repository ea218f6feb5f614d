use sg_reflect::object::{Cast, Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::register_class;
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{FloatMax, Matrix, PrimitiveType};

use super::{FeatureScalar, Features};

/// Feature vectors stored as the columns of a dense matrix.
pub struct DenseFeatures<T: FeatureScalar> {
    pub matrix: Matrix<T>,
    params: ParameterRegistry,
}

impl<T: FeatureScalar> Default for DenseFeatures<T> {
    fn default() -> Self {
        Self::from_matrix(Matrix::default())
    }
}

impl<T: FeatureScalar> DenseFeatures<T> {
    /// One feature vector per column of `matrix`.
    pub fn from_matrix(matrix: Matrix<T>) -> Self {
        Self {
            matrix,
            params: ParamsBuilder::<Self>::new("DenseFeatures")
                .add("feature_matrix", |f| &f.matrix, |f| &mut f.matrix, P::MODEL_STATE)
                .build(),
        }
    }

    pub(crate) const CAST: Cast<dyn Features> = Cast::new(
        |object| object.downcast_ref::<Self>().map(|f| f as &(dyn Features + 'static)),
        |object| object.downcast_mut::<Self>().map(|f| f as &mut (dyn Features + 'static)),
    );

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("DenseFeatures", T::PRIMITIVE_TYPE, || ObjectRef::new(Self::default())).with_cast(Self::CAST)
    }
}

impl<T: FeatureScalar> Features for DenseFeatures<T> {
    fn num_vectors(&self) -> usize {
        self.matrix.cols()
    }

    fn num_features(&self) -> usize {
        self.matrix.rows()
    }

    fn to_dense(&self) -> Matrix<f64> {
        let mut dense = Matrix::new(self.matrix.rows(), self.matrix.cols());
        for col in 0..self.matrix.cols() {
            for row in 0..self.matrix.rows() {
                dense[(row, col)] = self.matrix[(row, col)].to_f64();
            }
        }
        dense
    }
}

impl<T: FeatureScalar> Object for DenseFeatures<T> {
    fn type_name(&self) -> &'static str {
        "DenseFeatures"
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

register_class!(DenseFeatures::<u8>::class_entry);
register_class!(DenseFeatures::<u16>::class_entry);
register_class!(DenseFeatures::<f32>::class_entry);
register_class!(DenseFeatures::<f64>::class_entry);
register_class!(DenseFeatures::<FloatMax>::class_entry);
