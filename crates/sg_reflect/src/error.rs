use std::borrow::Cow;
use std::io;

use thiserror::Error;

use crate::object::HookStage;
use crate::value::PrimitiveType;

// -----------------------------------------------------------------------------
// Result

/// A specialized [`Result`](core::result::Result) whose error defaults to [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

// -----------------------------------------------------------------------------
// SchemaError

/// Disagreement between a serialized stream and the live object model.
///
/// Only [`SchemaError::UnknownField`] is recoverable: deserializers log it and
/// skip the field. Every other variant aborts the read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("stream references unknown class `{name}` with primitive type `{primitive_type}`")]
    UnknownClass { name: String, primitive_type: String },

    #[error("field `{field}` expects `{expected}` but the stream holds `{found}`")]
    IncompatibleType {
        field: String,
        expected: String,
        found: String,
    },

    #[error("stream holds field `{field}` unknown to `{type_name}`")]
    UnknownField { type_name: String, field: String },

    #[error("malformed stream: {0}")]
    Malformed(String),
}

impl SchemaError {
    #[inline]
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    #[inline]
    pub(crate) fn incompatible(expected: impl ToString, found: impl ToString) -> Self {
        Self::IncompatibleType {
            field: String::new(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

// -----------------------------------------------------------------------------
// Error

/// Every failure the object model can report.
///
/// The variants split in three groups:
///
/// - programmer errors ([`is_programmer_error`](Self::is_programmer_error)):
///   a class or parameter table is inconsistent, a hook forgot to chain,
///   a requested capability does not exist. These abort the current operation.
/// - schema errors ([`Error::Schema`]): the stream disagrees with the live
///   registry ("version skew").
/// - I/O errors ([`Error::Io`]): the stream itself failed ("corrupt file").
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("class `{name}` with primitive type `{primitive_type}` does not exist")]
    ClassNotFound {
        name: String,
        primitive_type: PrimitiveType,
    },

    #[error("`{type_name}` is not convertible to `{expected}`")]
    TypeMismatch {
        type_name: Cow<'static, str>,
        expected: Cow<'static, str>,
    },

    #[error("parameter `{name}` is registered twice on `{type_name}`")]
    DuplicateParameter {
        type_name: &'static str,
        name: Cow<'static, str>,
    },

    #[error("`{type_name}` has no parameter `{name}`")]
    ParameterNotFound { type_name: &'static str, name: String },

    #[error("class `{name}` with primitive type `{primitive_type}` is registered twice")]
    DuplicateClass {
        name: &'static str,
        primitive_type: PrimitiveType,
    },

    #[error("{type_name}::{hook}(): implementation error, the base hook was not chained")]
    ImplementationError {
        type_name: &'static str,
        hook: HookStage,
    },

    #[error("`{operation}` is not supported by `{type_name}`")]
    UnsupportedOperation {
        type_name: Cow<'static, str>,
        operation: &'static str,
    },

    #[error("object graph contains a cycle through `{type_name}`")]
    CyclicReference { type_name: &'static str },

    #[error("no stream attached, call `attach` first")]
    NoStream,

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("stream failure: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Errors caused by an inconsistent program rather than by its input.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::ClassNotFound { .. }
                | Self::TypeMismatch { .. }
                | Self::DuplicateParameter { .. }
                | Self::ParameterNotFound { .. }
                | Self::DuplicateClass { .. }
                | Self::ImplementationError { .. }
                | Self::UnsupportedOperation { .. }
                | Self::CyclicReference { .. }
        )
    }

    /// Errors a reader may log and continue past.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Schema(SchemaError::UnknownField { .. }))
    }

    /// Fills in the field name of an [`SchemaError::IncompatibleType`]
    /// raised below the parameter level.
    pub(crate) fn in_field(self, name: &str) -> Self {
        match self {
            Self::Schema(SchemaError::IncompatibleType {
                field,
                expected,
                found,
            }) if field.is_empty() => Self::Schema(SchemaError::IncompatibleType {
                field: name.to_owned(),
                expected,
                found,
            }),
            other => other,
        }
    }

    #[cold]
    #[inline(never)]
    pub fn handle_error(&self) -> ! {
        panic!("{self}");
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        if value.is_io() {
            Self::Io(value.into())
        } else if value.is_eof() {
            Self::Io(io::Error::new(io::ErrorKind::UnexpectedEof, value))
        } else {
            Self::Schema(SchemaError::Malformed(value.to_string()))
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Error, SchemaError};
    use crate::value::PrimitiveType;

    #[test]
    fn classification() {
        let missing = Error::ClassNotFound {
            name: "NoSuchClass".into(),
            primitive_type: PrimitiveType::Float64,
        };
        assert!(missing.is_programmer_error());
        assert!(!missing.is_recoverable());

        let unknown = Error::from(SchemaError::UnknownField {
            type_name: "GaussianKernel".into(),
            field: "cache".into(),
        });
        assert!(unknown.is_recoverable());
        assert!(!unknown.is_programmer_error());

        let io = Error::from(std::io::Error::from(std::io::ErrorKind::UnexpectedEof));
        assert!(!io.is_programmer_error());
        assert!(!io.is_recoverable());
    }

    #[test]
    fn field_is_filled_once() {
        let err = Error::from(SchemaError::incompatible("float64", "string")).in_field("width");
        let err = err.in_field("other");
        match err {
            Error::Schema(SchemaError::IncompatibleType { field, .. }) => assert_eq!(field, "width"),
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn display() {
        let err = Error::ClassNotFound {
            name: "NoSuchClass".into(),
            primitive_type: PrimitiveType::Float64,
        };
        assert_eq!(
            err.to_string(),
            "class `NoSuchClass` with primitive type `float64` does not exist"
        );
    }
}
