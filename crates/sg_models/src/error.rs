use thiserror::Error;

use crate::machine::ProblemType;

/// A specialized [`Result`](core::result::Result) whose error defaults to [`ModelError`].
pub type Result<T, E = ModelError> = core::result::Result<T, E>;

/// Failures of training and prediction.
///
/// Errors of the object model itself (missing capability, cycles, ...) are
/// wrapped unchanged in [`ModelError::Reflect`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error(transparent)]
    Reflect(#[from] sg_reflect::Error),

    #[error("`{type_name}` has no `{component}` set")]
    MissingComponent {
        type_name: &'static str,
        component: &'static str,
    },

    #[error("`{type_name}` must be trained first")]
    NotTrained { type_name: &'static str },

    #[error("expected {expected} {what}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("a {machine} cannot be trained on {labels} labels")]
    LabelMismatch { machine: ProblemType, labels: ProblemType },

    #[error("label {value} is not valid for a {problem}")]
    InvalidLabel { problem: ProblemType, value: f64 },

    #[error("a {rows}x{cols} matrix is too large")]
    Oversized { rows: usize, cols: usize },

    #[error("kernel matrix is singular, increase `alpha`")]
    Singular,
}
