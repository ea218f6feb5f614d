//! Pluggable serializers for object graphs.
//!
//! # Overview
//!
//! - [`Serializer`]: attached to a byte sink, writes one root object per
//!   [`write`](Serializer::write) call, recursing into nested objects.
//! - [`Deserializer`]: attached to a byte source, recreates an object by
//!   class name ([`read_object`](Deserializer::read_object)) or fills an
//!   existing one ([`read`](Deserializer::read)).
//! - [`PersistFilter`]: which parameters are written. Both backends use it.
//!
//! Two backends are provided:
//!
//! - [`json`]: a JSON-LD record (`executes` / `input_values`) with every
//!   scalar encoded as a typed literal `{"@type": "xsd:double", "@value": "2.5"}`.
//! - [`binary`]: a compact little-endian encoding with explicit type tags.
//!
//! ## Write protocol
//!
//! For every object, root or nested:
//!
//! 1. the `pre_serialize` hook runs and must chain,
//! 2. the type header (class name and primitive type) is written,
//! 3. every visitable parameter accepted by the [`PersistFilter`] is written,
//!    nested objects recursing from step 1,
//! 4. the `post_serialize` hook runs and must chain.
//!
//! Reading mirrors it with the `pre_deserialize`/`post_deserialize` hooks.
//! Unknown parameters in the stream are logged with `warn!` and skipped;
//! parameters missing from the stream keep their default value. An
//! incompatible parameter type or an unknown class aborts the read with a
//! [`SchemaError`](crate::SchemaError); a failing stream aborts it with
//! [`Error::Io`](crate::Error::Io).
//!
//! Objects reachable through several references are written once per
//! reference; reading such a stream yields independent copies.

// -----------------------------------------------------------------------------
// Modules

pub mod binary;
pub mod json;

// -----------------------------------------------------------------------------
// Serializer / Deserializer

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result, SchemaError};
use crate::object::ObjectRef;
use crate::param::{Parameter, ParameterProperties};
use crate::registry::ClassRegistry;
use crate::value::PrimitiveType;

/// Writes object graphs to an attached byte stream.
pub trait Serializer {
    /// Replaces the output stream.
    fn attach(&mut self, stream: Box<dyn Write + Send>);

    /// Writes `object` and everything reachable from it, then flushes.
    ///
    /// Fails with [`Error::NoStream`] when nothing is attached.
    fn write(&mut self, object: &ObjectRef) -> Result<()>;
}

/// Reads object graphs from an attached byte stream.
pub trait Deserializer {
    /// Replaces the input stream.
    fn attach(&mut self, stream: Box<dyn Read + Send>);

    /// Reads the next root object, creating it by name.
    fn read_object(&mut self) -> Result<ObjectRef>;

    /// Reads the next root object into `into`, whose class must match the
    /// stream header.
    fn read(&mut self, into: &ObjectRef) -> Result<()>;
}

// -----------------------------------------------------------------------------
// PersistFilter

/// Selects the parameters written by a serializer.
///
/// A parameter is written unless it carries one of the excluded flags. The
/// default excludes [`ParameterProperties::TRANSIENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistFilter {
    excluded: ParameterProperties,
}

impl Default for PersistFilter {
    fn default() -> Self {
        Self::excluding(ParameterProperties::TRANSIENT)
    }
}

impl PersistFilter {
    pub const fn excluding(excluded: ParameterProperties) -> Self {
        Self { excluded }
    }

    /// Writes every parameter.
    pub const fn all() -> Self {
        Self::excluding(ParameterProperties::empty())
    }

    #[inline]
    pub fn accepts(&self, param: &Parameter) -> bool {
        !param.properties().intersects(self.excluded)
    }
}

// -----------------------------------------------------------------------------
// File helpers

/// Creates (or truncates) `path` and writes `object` into it.
pub fn serialize_to_path(
    path: impl AsRef<Path>,
    object: &ObjectRef,
    serializer: &mut dyn Serializer,
) -> Result<()> {
    let file = File::create(path)?;
    serializer.attach(Box::new(BufWriter::new(file)));
    serializer.write(object)
}

/// Reads one object from the file at `path`.
pub fn deserialize_from_path(path: impl AsRef<Path>, deserializer: &mut dyn Deserializer) -> Result<ObjectRef> {
    let file = File::open(path)?;
    deserializer.attach(Box::new(BufReader::new(file)));
    deserializer.read_object()
}

// -----------------------------------------------------------------------------
// Shared reader helpers

/// Creates an object named by a stream header.
///
/// A class missing from the registry is version skew, not a programmer
/// error, so it is reported as [`SchemaError::UnknownClass`].
pub(crate) fn create_from_header(
    registry: &ClassRegistry,
    name: &str,
    primitive_type: PrimitiveType,
) -> Result<ObjectRef> {
    registry.create(name, primitive_type).map_err(|err| match err {
        Error::ClassNotFound { name, primitive_type } => SchemaError::UnknownClass {
            name,
            primitive_type: primitive_type.to_string(),
        }
        .into(),
        other => other,
    })
}

/// Checks that a stream header names the class of `into`.
pub(crate) fn check_header(into: &ObjectRef, name: &str, primitive_type: PrimitiveType) -> Result<()> {
    let guard = into.read();
    if guard.type_name() == name && guard.primitive_type() == primitive_type {
        Ok(())
    } else {
        Err(SchemaError::IncompatibleType {
            field: String::new(),
            expected: format!("{} ({})", guard.type_name(), guard.primitive_type()),
            found: format!("{name} ({primitive_type})"),
        }
        .into())
    }
}

/// Logs and drops a stream field the live object does not know.
pub(crate) fn skip_unknown_field(type_name: &'static str, field: &str) {
    let err = SchemaError::UnknownField {
        type_name: type_name.to_owned(),
        field: field.to_owned(),
    };
    log::warn!("{err}, skipping it");
}

// -----------------------------------------------------------------------------
// Tests
