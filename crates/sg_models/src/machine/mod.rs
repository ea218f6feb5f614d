//! Trainable machines.
//!
//! ## Menu
//!
//! - [`KernelMachine`]: kernel ridge regression, or a binary classifier on
//!   the sign of the regression.
//! - [`NearestCentroid`]: multiclass classification by the closest class mean.
//! - [`BaggingMachine`]: an ensemble of clones of a shared prototype machine,
//!   each trained on a bootstrap sample.
//! - [`Pipeline`]: [`Transformer`](crate::transformer::Transformer) stages
//!   followed by one machine.
//!
//! Machines nest: the kernel of a [`KernelMachine`], the prototype and bags
//! of a [`BaggingMachine`] and the stages of a [`Pipeline`] are object
//! parameters, so a trained ensemble clones, compares and serializes as a
//! whole.

// -----------------------------------------------------------------------------
// Modules

mod bagging;
mod kernel_machine;
mod nearest_centroid;
mod pipeline;

// -----------------------------------------------------------------------------
// Exports

pub use bagging::BaggingMachine;
pub use kernel_machine::KernelMachine;
pub use nearest_centroid::NearestCentroid;
pub use pipeline::Pipeline;

// -----------------------------------------------------------------------------
// ProblemType

use core::fmt;

use sg_reflect::ObjectRef;
use sg_reflect::cast;
use sg_reflect::object::Cast;
use sg_reflect::value::Matrix;

use crate::capability::view;
use crate::error::{ModelError, Result};
use crate::features::FEATURES;
use crate::labels::LABELS;

/// Exclusive upper bound of multiclass labels.
pub const MAX_CLASSES: usize = 1 << 16;

/// The learning task of a machine, written to JSON as `executes.implements`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemType {
    BinaryClassifier,
    MulticlassClassifier,
    Regressor,
}

impl ProblemType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BinaryClassifier => "binaryClassifier",
            Self::MulticlassClassifier => "multiclassClassifier",
            Self::Regressor => "regressor",
        }
    }

    /// Whether `label` is a valid target for the task.
    pub fn accepts(self, label: f64) -> bool {
        match self {
            Self::BinaryClassifier => label == 1.0 || label == -1.0,
            Self::MulticlassClassifier => (0.0..MAX_CLASSES as f64).contains(&label) && label.fract() == 0.0,
            Self::Regressor => label.is_finite(),
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Machine

/// Learns a mapping from feature vectors to labels.
///
/// Data is passed as a dense matrix with one feature vector per column.
pub trait Machine: Send + Sync {
    fn problem_type(&self) -> ProblemType;

    /// `labels` holds one value per column of `data`.
    fn train(&mut self, data: &Matrix<f64>, labels: &[f64]) -> Result<()>;

    /// One output per column of `data`.
    fn apply(&self, data: &Matrix<f64>) -> Result<Vec<f64>>;
}

pub(crate) const MACHINES: &[Cast<dyn Machine>] = &[
    cast!(KernelMachine => Machine),
    cast!(NearestCentroid => Machine),
    cast!(BaggingMachine => Machine),
    cast!(Pipeline => Machine),
];

/// Trains `machine` on a features object and a labels object.
///
/// # Errors
///
/// - [`ModelError::Reflect`] with a type mismatch if an argument lacks the
///   expected capability.
/// - [`ModelError::InvalidLabel`] or [`ModelError::LabelMismatch`] if the
///   labels do not fit the task of the machine.
/// - any error of the machine itself.
pub fn train(machine: &ObjectRef, features: &ObjectRef, labels: &ObjectRef) -> Result<()> {
    let data = view(features, FEATURES)?.with(|f| f.to_dense())?;
    let (problem, values) = view(labels, LABELS)?.with(|l| {
        l.validate()?;
        Ok::<_, ModelError>((l.problem_type(), l.values().to_vec()))
    })??;

    let machine = view(machine, MACHINES)?;
    let expected = machine.with(|m| m.problem_type())?;
    if problem != expected {
        return Err(ModelError::LabelMismatch {
            machine: expected,
            labels: problem,
        });
    }
    log::debug!(
        "training `{}` on {} vectors",
        machine.object().type_name(),
        data.cols()
    );
    machine.with_mut(|m| m.train(&data, &values))?
}

/// Applies a trained `machine` to a features object.
pub fn apply(machine: &ObjectRef, features: &ObjectRef) -> Result<Vec<f64>> {
    let data = view(features, FEATURES)?.with(|f| f.to_dense())?;
    view(machine, MACHINES)?.with(|m| m.apply(&data))?
}

// -----------------------------------------------------------------------------
// Helpers

/// The object in `slot`, or [`ModelError::MissingComponent`].
pub(crate) fn component<'a>(
    slot: &'a Option<ObjectRef>,
    type_name: &'static str,
    component: &'static str,
) -> Result<&'a ObjectRef> {
    slot.as_ref()
        .ok_or(ModelError::MissingComponent { type_name, component })
}

pub(crate) fn check_labels(data: &Matrix<f64>, labels: &[f64]) -> Result<()> {
    if data.cols() == 0 {
        return Err(ModelError::DimensionMismatch {
            what: "training vectors",
            expected: 1,
            found: 0,
        });
    }
    if labels.len() != data.cols() {
        return Err(ModelError::DimensionMismatch {
            what: "labels",
            expected: data.cols(),
            found: labels.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_features(expected: usize, data: &Matrix<f64>) -> Result<()> {
    if data.rows() == expected {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            what: "features",
            expected,
            found: data.rows(),
        })
    }
}

// -----------------------------------------------------------------------------
// Tests
