use std::io::Read;

use super::format::{self, MAGIC, MAX_OBJECT_DEPTH, VERSION};
use crate::error::{Error, Result, SchemaError};
use crate::object::{HookStage, ObjectRef, run_hook};
use crate::registry::ClassRegistry;
use crate::serde::{self as sg_serde, Deserializer};
use crate::value::{AnyVisitorMut, Complex128, FloatMax, LeafMut, TypeTag};

// -----------------------------------------------------------------------------
// BinaryDeserializer

/// Reads objects written by [`BinarySerializer`](super::BinarySerializer).
pub struct BinaryDeserializer<'r> {
    registry: &'r ClassRegistry,
    stream: Option<Box<dyn Read + Send>>,
}

impl<'r> BinaryDeserializer<'r> {
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self { registry, stream: None }
    }

    /// Decodes one object, header included, from `bytes`.
    pub fn from_bytes(&self, mut bytes: &[u8]) -> Result<ObjectRef> {
        read_root(self.registry, &mut bytes, None)
    }
}

impl Deserializer for BinaryDeserializer<'_> {
    fn attach(&mut self, stream: Box<dyn Read + Send>) {
        self.stream = Some(stream);
    }

    fn read_object(&mut self) -> Result<ObjectRef> {
        let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
        let object = read_root(self.registry, stream, None)?;
        log::debug!("read `{}` from binary", object.type_name());
        Ok(object)
    }

    fn read(&mut self, into: &ObjectRef) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
        read_root(self.registry, stream, Some(into))?;
        Ok(())
    }
}

fn read_root(registry: &ClassRegistry, input: &mut dyn Read, into: Option<&ObjectRef>) -> Result<ObjectRef> {
    let magic: [u8; 4] = format::get_array(input)?;
    if magic != MAGIC {
        return Err(SchemaError::malformed("not a binary object stream").into());
    }
    let version = format::get_u8(input)?;
    if version != VERSION {
        return Err(SchemaError::malformed(format!("unsupported format version {version}")).into());
    }
    Decoder {
        registry,
        input,
        depth: 0,
    }
    .record(into)
}

// -----------------------------------------------------------------------------
// Decoder

struct Decoder<'a> {
    registry: &'a ClassRegistry,
    input: &'a mut dyn Read,
    depth: usize,
}

impl Decoder<'_> {
    fn record(&mut self, into: Option<&ObjectRef>) -> Result<ObjectRef> {
        if self.depth >= MAX_OBJECT_DEPTH {
            return Err(SchemaError::malformed("objects nested too deeply").into());
        }
        let name = format::get_str(self.input)?;
        let primitive_type = format::get_primitive_type(self.input)?;
        let object = match into {
            Some(into) => {
                sg_serde::check_header(into, &name, primitive_type)?;
                into.clone()
            }
            None => sg_serde::create_from_header(self.registry, &name, primitive_type)?,
        };

        run_hook(&object, HookStage::PreDeserialize)?;
        let type_name = object.type_name();
        let count = format::get_u32(self.input)?;
        self.depth += 1;
        for _ in 0..count {
            let field = format::get_str(self.input)?;
            let tag = format::get_tag(self.input)?;
            let param = object.read().parameters().find(&field).cloned();
            let Some(param) = param else {
                sg_serde::skip_unknown_field(type_name, &field);
                self.skip(&tag)?;
                continue;
            };
            if param.type_tag() != &tag {
                return Err(SchemaError::IncompatibleType {
                    field,
                    expected: param.type_tag().to_string(),
                    found: tag.to_string(),
                }
                .into());
            }
            #[cfg(feature = "debug")]
            log::trace!("reading `{type_name}::{field}` as `{tag}`");

            // Nested records create fresh objects, never `object` itself.
            let mut obj = object.write();
            param
                .value_mut(&mut *obj)?
                .visit_mut(self)
                .map_err(|err| err.in_field(&field))?;
        }
        self.depth -= 1;
        run_hook(&object, HookStage::PostDeserialize)?;

        Ok(object)
    }

    /// Consumes the payload of a field nobody asked for.
    fn skip(&mut self, tag: &TypeTag) -> Result<()> {
        match tag {
            TypeTag::Scalar(pt) => match format::scalar_width(*pt)? {
                Some(width) => format::skip_bytes(self.input, width),
                None => {
                    let len = format::get_u32(self.input)?;
                    format::skip_bytes(self.input, u64::from(len))
                }
            },
            TypeTag::Object => {
                if format::get_marker(self.input)? {
                    self.skip_record()?;
                }
                Ok(())
            }
            TypeTag::Vector(inner) => {
                let len = format::get_len(self.input)?;
                self.skip_n(inner, len)
            }
            TypeTag::Matrix(inner) => {
                let (rows, cols) = (format::get_len(self.input)?, format::get_len(self.input)?);
                let len = rows
                    .checked_mul(cols)
                    .ok_or_else(|| SchemaError::malformed(format!("matrix of {rows}x{cols} elements")))?;
                self.skip_n(inner, len)
            }
            TypeTag::SparseVector(inner) => {
                let _dimension = format::get_len(self.input)?;
                let nnz = format::get_len(self.input)?;
                for _ in 0..nnz {
                    format::get_len(self.input)?;
                    self.skip(inner)?;
                }
                Ok(())
            }
            TypeTag::SparseMatrix(inner) => {
                let num_vectors = format::get_len(self.input)?;
                let _num_features = format::get_len(self.input)?;
                self.skip_n(&TypeTag::SparseVector(inner.clone()), num_vectors)
            }
        }
    }

    fn skip_n(&mut self, tag: &TypeTag, count: usize) -> Result<()> {
        for _ in 0..count {
            self.skip(tag)?;
        }
        Ok(())
    }

    fn skip_record(&mut self) -> Result<()> {
        if self.depth >= MAX_OBJECT_DEPTH {
            return Err(SchemaError::malformed("objects nested too deeply").into());
        }
        self.depth += 1;
        format::get_str(self.input)?;
        format::get_primitive_type(self.input)?;
        for _ in 0..format::get_u32(self.input)? {
            format::get_str(self.input)?;
            let tag = format::get_tag(self.input)?;
            self.skip(&tag)?;
        }
        self.depth -= 1;
        Ok(())
    }
}

impl AnyVisitorMut for Decoder<'_> {
    fn on(&mut self, leaf: LeafMut<'_>) -> Result<()> {
        let input = &mut *self.input;
        match leaf {
            LeafMut::Bool(v) => *v = format::get_bool(input)?,
            LeafMut::Int8(v) => *v = i8::from_le_bytes(format::get_array(input)?),
            LeafMut::UInt8(v) => *v = format::get_u8(input)?,
            LeafMut::Int16(v) => *v = i16::from_le_bytes(format::get_array(input)?),
            LeafMut::UInt16(v) => *v = u16::from_le_bytes(format::get_array(input)?),
            LeafMut::Int32(v) => *v = i32::from_le_bytes(format::get_array(input)?),
            LeafMut::UInt32(v) => *v = format::get_u32(input)?,
            LeafMut::Int64(v) => *v = i64::from_le_bytes(format::get_array(input)?),
            LeafMut::UInt64(v) => *v = format::get_u64(input)?,
            LeafMut::Float32(v) => *v = f32::from_le_bytes(format::get_array(input)?),
            LeafMut::Float64(v) => *v = f64::from_le_bytes(format::get_array(input)?),
            LeafMut::FloatMax(v) => *v = FloatMax(f64::from_le_bytes(format::get_array(input)?)),
            LeafMut::Complex128(v) => {
                let re = f64::from_le_bytes(format::get_array(input)?);
                let im = f64::from_le_bytes(format::get_array(input)?);
                *v = Complex128::new(re, im);
            }
            LeafMut::String(v) => *v = format::get_str(input)?,
        }
        Ok(())
    }

    fn on_object(&mut self, slot: &mut Option<ObjectRef>) -> Result<()> {
        *slot = if format::get_marker(self.input)? {
            Some(self.record(None)?)
        } else {
            None
        };
        Ok(())
    }

    fn enter_vector(&mut self, len: &mut usize) -> Result<()> {
        *len = format::get_len(self.input)?;
        Ok(())
    }

    fn exit_vector(&mut self) -> Result<()> {
        Ok(())
    }

    fn enter_matrix(&mut self, rows: &mut usize, cols: &mut usize) -> Result<()> {
        *rows = format::get_len(self.input)?;
        *cols = format::get_len(self.input)?;
        Ok(())
    }

    fn exit_matrix(&mut self) -> Result<()> {
        Ok(())
    }

    fn enter_sparse_vector(&mut self, dimension: &mut usize, nnz: &mut usize) -> Result<()> {
        *dimension = format::get_len(self.input)?;
        *nnz = format::get_len(self.input)?;
        Ok(())
    }

    fn sparse_index(&mut self, index: &mut usize) -> Result<()> {
        *index = format::get_len(self.input)?;
        Ok(())
    }

    fn exit_sparse_vector(&mut self) -> Result<()> {
        Ok(())
    }

    fn enter_sparse_matrix(&mut self, num_vectors: &mut usize, num_features: &mut usize) -> Result<()> {
        *num_vectors = format::get_len(self.input)?;
        *num_features = format::get_len(self.input)?;
        Ok(())
    }

    fn exit_sparse_matrix(&mut self) -> Result<()> {
        Ok(())
    }
}
