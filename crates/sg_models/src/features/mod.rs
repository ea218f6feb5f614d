//! Feature containers.
//!
//! [`DenseFeatures`] and [`SparseFeatures`] are generic over their scalar
//! type and registered once per specialization, keyed by
//! [`PrimitiveType`]:
//!
//! | Class            | Specializations                                   |
//! |------------------|---------------------------------------------------|
//! | `DenseFeatures`  | `uint8`, `uint16`, `float32`, `float64`, `floatmax` |
//! | `SparseFeatures` | `float32`, `float64`                              |

// -----------------------------------------------------------------------------
// Modules

mod dense;
mod sparse;

// -----------------------------------------------------------------------------
// Exports

pub use dense::DenseFeatures;
pub use sparse::SparseFeatures;

// -----------------------------------------------------------------------------
// Features

use sg_reflect::object::Cast;
use sg_reflect::value::{FloatMax, Matrix, PrimitiveType, Value};

/// A set of feature vectors of equal length.
pub trait Features: Send + Sync {
    fn num_vectors(&self) -> usize;

    fn num_features(&self) -> usize;

    /// The feature vectors as the columns of a dense `f64` matrix.
    fn to_dense(&self) -> Matrix<f64>;
}

/// A scalar a feature container can be specialized for.
pub trait FeatureScalar: Value + Default + Copy {
    const PRIMITIVE_TYPE: PrimitiveType;

    fn to_f64(self) -> f64;
}

macro_rules! feature_scalars {
    ($($ty:ty => $pt:ident, |$v:ident| $to_f64:expr;)*) => {$(
        impl FeatureScalar for $ty {
            const PRIMITIVE_TYPE: PrimitiveType = PrimitiveType::$pt;

            #[inline]
            fn to_f64(self) -> f64 {
                let $v = self;
                $to_f64
            }
        }
    )*};
}

feature_scalars! {
    u8 => UInt8, |v| f64::from(v);
    u16 => UInt16, |v| f64::from(v);
    f32 => Float32, |v| f64::from(v);
    f64 => Float64, |v| v;
    FloatMax => FloatMax, |v| v.0;
}

pub(crate) const FEATURES: &[Cast<dyn Features>] = &[
    DenseFeatures::<u8>::CAST,
    DenseFeatures::<u16>::CAST,
    DenseFeatures::<f32>::CAST,
    DenseFeatures::<f64>::CAST,
    DenseFeatures::<FloatMax>::CAST,
    SparseFeatures::<f32>::CAST,
    SparseFeatures::<f64>::CAST,
];

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use sg_reflect::ObjectRef;
    use sg_reflect::ops::equals;
    use sg_reflect::serde::binary::{BinaryDeserializer, BinarySerializer};
    use sg_reflect::serde::json::{JsonDeserializer, JsonSerializer};
    use sg_reflect::value::{FloatMax, Matrix, PrimitiveType, SparseVector};

    use super::{DenseFeatures, FEATURES, Features, SparseFeatures};
    use crate::capability::view;
    use crate::machine::tests::registry;

    #[test]
    fn dense_specializations_convert_to_f64() {
        let bytes = DenseFeatures::<u8>::from_matrix(Matrix::from_column_major(2, 1, vec![3, 250]).unwrap());
        assert_eq!(bytes.to_dense().as_slice(), [3.0, 250.0]);

        let wide = DenseFeatures::from_matrix(Matrix::from_column_major(1, 2, vec![FloatMax(0.5), FloatMax(-1.0)]).unwrap());
        assert_eq!((wide.num_features(), wide.num_vectors()), (1, 2));
        assert_eq!(wide.to_dense().as_slice(), [0.5, -1.0]);
    }

    #[test]
    fn sparse_to_dense() {
        let mut features = SparseFeatures::<f32>::new(4);
        features.push(SparseVector::from_pairs(4, [(1, 2.0)]));
        features.push(SparseVector::from_pairs(4, [(0, -1.0), (3, 0.5)]));

        let dense = features.to_dense();
        assert_eq!((dense.rows(), dense.cols()), (4, 2));
        assert_eq!(dense.column(0), [0.0, 2.0, 0.0, 0.0]);
        assert_eq!(dense.column(1), [-1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn pushing_a_wider_vector_widens_the_set() {
        let mut features = SparseFeatures::<f64>::new(2);
        features.push(SparseVector::from_pairs(6, [(5, 1.0)]));
        assert_eq!(features.num_features(), 6);
        assert_eq!(features.to_dense().column(0), [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn specializations_are_recreated_by_primitive_type() {
        let registry = registry();
        let bytes = DenseFeatures::<u8>::from_matrix(Matrix::from_column_major(2, 2, vec![0, 7, 200, 255]).unwrap());
        let original = ObjectRef::new(bytes);

        let record = JsonSerializer::new().to_json(&original).unwrap();
        assert_eq!(record["executes"]["name"], "DenseFeatures");
        assert_eq!(record["executes"]["primitive_type"], "uint8");
        let restored = JsonDeserializer::new(&registry).from_json(record).unwrap();
        assert!(restored.is::<DenseFeatures<u8>>());
        assert_eq!(restored.read().primitive_type(), PrimitiveType::UInt8);
        assert!(equals(&original, &restored).unwrap());

        let encoded = BinarySerializer::new().to_bytes(&original).unwrap();
        let restored = BinaryDeserializer::new(&registry).from_bytes(&encoded).unwrap();
        assert!(restored.is::<DenseFeatures<u8>>());
        assert_eq!(
            restored.with(|f: &DenseFeatures<u8>| f.matrix.as_slice().to_vec()).unwrap(),
            [0, 7, 200, 255]
        );

        // Another specialization of the same class is a different type.
        let wide = ObjectRef::new(DenseFeatures::<u16>::default());
        let encoded = BinarySerializer::new().to_bytes(&wide).unwrap();
        let restored = BinaryDeserializer::new(&registry).from_bytes(&encoded).unwrap();
        assert!(restored.is::<DenseFeatures<u16>>());
        assert!(!restored.is::<DenseFeatures<u8>>());
    }

    #[test]
    fn every_specialization_is_a_feature_set() {
        let objects = [
            ObjectRef::new(DenseFeatures::<u16>::default()),
            ObjectRef::new(DenseFeatures::<f64>::default()),
            ObjectRef::new(SparseFeatures::<f64>::default()),
        ];
        for object in &objects {
            assert_eq!(view(object, FEATURES).unwrap().with(|f| f.num_vectors()).unwrap(), 0);
        }
    }
}
