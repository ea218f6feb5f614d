//! Label containers, one per learning task.

use sg_reflect::object::{Cast, Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::PrimitiveType;
use sg_reflect::{cast, register_class};

use crate::error::{ModelError, Result};
use crate::machine::ProblemType;

// -----------------------------------------------------------------------------
// Labels

/// Target values of a training set, one per feature vector.
pub trait Labels: Send + Sync {
    fn problem_type(&self) -> ProblemType;

    fn values(&self) -> &[f64];

    /// Fails with [`ModelError::InvalidLabel`] on the first value the task
    /// does not accept.
    fn validate(&self) -> Result<()> {
        let problem = self.problem_type();
        match self.values().iter().find(|value| !problem.accepts(**value)) {
            Some(value) => Err(ModelError::InvalidLabel { problem, value: *value }),
            None => Ok(()),
        }
    }
}

pub(crate) const LABELS: &[Cast<dyn Labels>] = &[
    cast!(BinaryLabels => Labels),
    cast!(MulticlassLabels => Labels),
    cast!(RegressionLabels => Labels),
];

macro_rules! labels_object {
    ($(#[$meta:meta])* $name:ident => $problem:expr) => {
        $(#[$meta])*
        pub struct $name {
            pub labels: Vec<f64>,
            params: ParameterRegistry,
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(Vec::new())
            }
        }

        impl $name {
            pub fn new(labels: Vec<f64>) -> Self {
                Self {
                    labels,
                    params: ParamsBuilder::<Self>::new(stringify!($name))
                        .add("labels", |l| &l.labels, |l| &mut l.labels, P::MODEL_STATE)
                        .build(),
                }
            }

            pub fn class_entry() -> ClassEntry {
                ClassEntry::new(stringify!($name), PrimitiveType::NotGeneric, || ObjectRef::new(Self::default()))
                    .with_cast(cast!($name => Labels))
            }
        }

        impl Labels for $name {
            fn problem_type(&self) -> ProblemType {
                $problem
            }

            fn values(&self) -> &[f64] {
                &self.labels
            }
        }

        impl Object for $name {
            fn type_name(&self) -> &'static str {
                stringify!($name)
            }

            fn parameters(&self) -> &ParameterRegistry {
                &self.params
            }

            fn create_empty(&self) -> Option<ObjectRef> {
                Some(ObjectRef::new(Self::default()))
            }
        }

        register_class!($name::class_entry);
    };
}

labels_object! {
    /// Labels of a two-class problem, each `-1` or `+1`.
    BinaryLabels => ProblemType::BinaryClassifier
}

labels_object! {
    /// Class indices `0..num_classes`, stored as `f64`.
    MulticlassLabels => ProblemType::MulticlassClassifier
}

labels_object! {
    /// Real-valued targets.
    RegressionLabels => ProblemType::Regressor
}

impl MulticlassLabels {
    /// One more than the largest valid class index.
    pub fn num_classes(&self) -> usize {
        self.labels.iter().filter_map(|&label| class_index(label)).max().map_or(0, |class| class + 1)
    }
}

/// The class of a multiclass label, `None` for a label the task rejects.
pub(crate) fn class_index(label: f64) -> Option<usize> {
    ProblemType::MulticlassClassifier.accepts(label).then(|| label as usize)
}

// -----------------------------------------------------------------------------
// Tests
