//! Feature transformations fitted on training data.

use sg_reflect::object::{Cast, Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{Matrix, PrimitiveType};
use sg_reflect::{cast, register_class};

use crate::error::{ModelError, Result};

/// A stage of a [`Pipeline`](crate::machine::Pipeline) placed before its machine.
pub trait Transformer: Send + Sync {
    /// Learns the transformation from the columns of `data`.
    fn fit(&mut self, data: &Matrix<f64>) -> Result<()>;

    fn transform(&self, data: &Matrix<f64>) -> Result<Matrix<f64>>;
}

pub(crate) const TRANSFORMERS: &[Cast<dyn Transformer>] = &[cast!(MeanCentering => Transformer)];

// -----------------------------------------------------------------------------
// MeanCentering

/// Subtracts the per-feature mean of the training data.
pub struct MeanCentering {
    pub mean: Vec<f64>,
    params: ParameterRegistry,
}

impl Default for MeanCentering {
    fn default() -> Self {
        Self::new()
    }
}

impl MeanCentering {
    pub fn new() -> Self {
        Self {
            mean: Vec::new(),
            params: ParamsBuilder::<Self>::new("MeanCentering")
                .add("mean", |t| &t.mean, |t| &mut t.mean, P::MODEL_STATE)
                .describe("Mean of every feature")
                .build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("MeanCentering", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
            .with_cast(cast!(MeanCentering => Transformer))
    }
}

impl Transformer for MeanCentering {
    fn fit(&mut self, data: &Matrix<f64>) -> Result<()> {
        let mut mean = vec![0.0; data.rows()];
        for col in 0..data.cols() {
            for (sum, value) in mean.iter_mut().zip(data.column(col)) {
                *sum += value;
            }
        }
        if data.cols() > 0 {
            let n = data.cols() as f64;
            mean.iter_mut().for_each(|sum| *sum /= n);
        }
        self.mean = mean;
        Ok(())
    }

    fn transform(&self, data: &Matrix<f64>) -> Result<Matrix<f64>> {
        if data.rows() != self.mean.len() {
            return Err(ModelError::DimensionMismatch {
                what: "features",
                expected: self.mean.len(),
                found: data.rows(),
            });
        }
        let mut centered = data.clone();
        for col in 0..data.cols() {
            for (row, mean) in self.mean.iter().enumerate() {
                centered[(row, col)] -= mean;
            }
        }
        Ok(centered)
    }
}

impl Object for MeanCentering {
    fn type_name(&self) -> &'static str {
        "MeanCentering"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }
}

register_class!(MeanCentering::class_entry);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use sg_reflect::value::Matrix;

    use super::{MeanCentering, Transformer};
    use crate::error::ModelError;

    #[test]
    fn centers_columns() {
        let data = Matrix::from_column_major(2, 2, vec![1.0, 10.0, 3.0, 20.0]).unwrap();
        let mut centering = MeanCentering::new();
        centering.fit(&data).unwrap();
        assert_eq!(centering.mean, [2.0, 15.0]);
        assert_eq!(centering.transform(&data).unwrap().as_slice(), [-1.0, -5.0, 1.0, 5.0]);

        let narrow = Matrix::new(1, 1);
        assert!(matches!(
            centering.transform(&narrow),
            Err(ModelError::DimensionMismatch { expected: 2, found: 1, .. })
        ));
    }
}
