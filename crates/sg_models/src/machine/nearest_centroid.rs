use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{Matrix, PrimitiveType};
use sg_reflect::{cast, register_class};

use super::{Machine, ProblemType, check_features, check_labels};
use crate::error::{ModelError, Result};
use crate::labels::class_index;

/// Predicts the class whose training mean is closest in euclidean distance.
///
/// Classes without training vectors keep a `NaN` centroid and are never
/// predicted.
pub struct NearestCentroid {
    /// One column per class.
    pub centroids: Matrix<f64>,
    params: ParameterRegistry,
}

impl Default for NearestCentroid {
    fn default() -> Self {
        Self::new()
    }
}

impl NearestCentroid {
    pub fn new() -> Self {
        Self {
            centroids: Matrix::default(),
            params: ParamsBuilder::<Self>::new("NearestCentroid")
                .add("centroids", |m| &m.centroids, |m| &mut m.centroids, P::MODEL_STATE)
                .build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("NearestCentroid", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
            .with_cast(cast!(NearestCentroid => Machine))
    }
}

impl Machine for NearestCentroid {
    fn problem_type(&self) -> ProblemType {
        ProblemType::MulticlassClassifier
    }

    fn train(&mut self, data: &Matrix<f64>, labels: &[f64]) -> Result<()> {
        check_labels(data, labels)?;
        let problem = self.problem_type();
        let classes = labels
            .iter()
            .map(|&value| class_index(value).ok_or(ModelError::InvalidLabel { problem, value }))
            .collect::<Result<Vec<_>>>()?;

        // Every class is below `MAX_CLASSES`, so the increment cannot overflow.
        let num_classes = classes.iter().max().map_or(0, |&class| class + 1);
        let mut centroids = Matrix::try_new(data.rows(), num_classes).ok_or(ModelError::Oversized {
            rows: data.rows(),
            cols: num_classes,
        })?;
        let mut counts = vec![0_usize; num_classes];
        for (col, &class) in classes.iter().enumerate() {
            counts[class] += 1;
            for (row, value) in data.column(col).iter().enumerate() {
                centroids[(row, class)] += value;
            }
        }
        for (class, &count) in counts.iter().enumerate() {
            for row in 0..data.rows() {
                centroids[(row, class)] /= count as f64;
            }
        }
        self.centroids = centroids;
        Ok(())
    }

    fn apply(&self, data: &Matrix<f64>) -> Result<Vec<f64>> {
        if self.centroids.cols() == 0 {
            return Err(ModelError::NotTrained {
                type_name: "NearestCentroid",
            });
        }
        check_features(self.centroids.rows(), data)?;

        let outputs = (0..data.cols()).map(|col| {
            let x = data.column(col);
            let distance = |class: usize| -> f64 {
                self.centroids
                    .column(class)
                    .iter()
                    .zip(x)
                    .map(|(c, v)| (c - v) * (c - v))
                    .sum()
            };
            (0..self.centroids.cols())
                .map(|class| (class, distance(class)))
                .filter(|(_, d)| !d.is_nan())
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(0.0, |(class, _)| class as f64)
        });
        Ok(outputs.collect())
    }
}

impl Object for NearestCentroid {
    fn type_name(&self) -> &'static str {
        "NearestCentroid"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }

    fn implements(&self) -> Option<&'static str> {
        Some(self.problem_type().as_str())
    }
}

register_class!(NearestCentroid::class_entry);

#[cfg(test)]
mod tests {
    use sg_reflect::ObjectRef;
    use sg_reflect::value::Matrix;

    use super::NearestCentroid;
    use crate::error::ModelError;
    use crate::labels::MulticlassLabels;
    use crate::machine::tests::points;
    use crate::machine::{MAX_CLASSES, Machine, apply, train};

    #[test]
    fn three_classes() {
        let machine = ObjectRef::new(NearestCentroid::new());
        let labels = ObjectRef::new(MulticlassLabels::new(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]));
        train(&machine, &points(&[-5.0, -4.0, 0.0, 1.0, 9.0, 10.0]), &labels).unwrap();

        assert_eq!(apply(&machine, &points(&[-6.0, 0.4, 7.0])).unwrap(), [0.0, 1.0, 2.0]);
        assert_eq!(
            machine.with(|m: &NearestCentroid| m.centroids.as_slice().to_vec()).unwrap(),
            [-4.5, 0.5, 9.5]
        );
    }

    #[test]
    fn missing_classes_are_never_predicted() {
        let mut machine = NearestCentroid::new();
        let data = Matrix::from_column_major(1, 2, vec![0.0, 10.0]).unwrap();
        machine.train(&data, &[0.0, 2.0]).unwrap();
        assert!(machine.centroids[(0, 1)].is_nan());
        assert_eq!(machine.apply(&Matrix::from_column_major(1, 1, vec![5.5]).unwrap()).unwrap(), [2.0]);
    }

    #[test]
    fn huge_labels_are_rejected() {
        let mut machine = NearestCentroid::new();
        let data = Matrix::from_column_major(1, 2, vec![0.0, 1.0]).unwrap();
        for value in [1.9e19, 1e12, f64::INFINITY] {
            match machine.train(&data, &[0.0, value]) {
                Err(ModelError::InvalidLabel { value: found, .. }) => assert_eq!(found, value),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(machine.centroids.cols(), 0);

        let high = (MAX_CLASSES - 1) as f64;
        machine.train(&data, &[0.0, high]).unwrap();
        assert_eq!(machine.centroids.cols(), MAX_CLASSES);
    }
}
