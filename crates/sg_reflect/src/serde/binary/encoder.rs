use std::io::Write;

use sg_utils::vec::FastVec;

use super::format::{self, MAGIC, VERSION};
use crate::error::{Error, Result};
use crate::object::{HookStage, ObjectRef, run_hook};
use crate::ops::CycleGuard;
use crate::param::Parameter;
use crate::serde::{PersistFilter, Serializer};
use crate::value::{AnyVisitor, LeafRef};

// -----------------------------------------------------------------------------
// BinarySerializer

/// Writes objects in the compact binary format.
///
/// Every root is encoded into memory first and written with a single
/// `write_all`, so a failing hook leaves the stream untouched.
pub struct BinarySerializer {
    stream: Option<Box<dyn Write + Send>>,
    filter: PersistFilter,
}

impl Default for BinarySerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl BinarySerializer {
    pub fn new() -> Self {
        Self {
            stream: None,
            filter: PersistFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: PersistFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Encodes `object`, header included, into a byte vector.
    pub fn to_bytes(&self, object: &ObjectRef) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.push(VERSION);
        Encoder {
            out: &mut bytes,
            filter: &self.filter,
            guard: CycleGuard::new(),
        }
        .record(object)?;
        Ok(bytes)
    }
}

impl Serializer for BinarySerializer {
    fn attach(&mut self, stream: Box<dyn Write + Send>) {
        self.stream = Some(stream);
    }

    fn write(&mut self, object: &ObjectRef) -> Result<()> {
        if self.stream.is_none() {
            return Err(Error::NoStream);
        }
        log::debug!("writing `{}` as binary", object.type_name());
        let bytes = self.to_bytes(object)?;

        let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
        stream.write_all(&bytes)?;
        stream.flush()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Encoder

struct Encoder<'a> {
    out: &'a mut Vec<u8>,
    filter: &'a PersistFilter,
    guard: CycleGuard,
}

impl Encoder<'_> {
    /// `name, primitive type, count, (name, tag, payload)*`
    fn record(&mut self, object: &ObjectRef) -> Result<()> {
        self.guard.enter(object)?;
        run_hook(object, HookStage::PreSerialize)?;
        {
            let obj = object.read();
            let type_name = obj.type_name();
            format::put_str(self.out, type_name)?;
            format::put_u8(self.out, obj.primitive_type().code())?;

            let mut written: FastVec<&Parameter, 8> = FastVec::new();
            let data = written.data();
            for param in obj.parameters() {
                if self.filter.accepts(param) && param.value(&*obj)?.visitable() {
                    data.push(param);
                }
            }
            let written = written.as_slice();
            format::put_count(self.out, written.len())?;

            self.guard.push(object, type_name);
            for &param in written {
                #[cfg(feature = "debug")]
                log::trace!("writing `{type_name}::{}` as `{}`", param.name(), param.type_tag());

                format::put_str(self.out, param.name())?;
                format::put_tag(self.out, param.type_tag())?;
                param
                    .value(&*obj)?
                    .visit(self)
                    .map_err(|err| err.in_field(param.name()))?;
            }
            self.guard.pop();
        }
        run_hook(object, HookStage::PostSerialize)
    }
}

impl AnyVisitor for Encoder<'_> {
    fn on(&mut self, leaf: LeafRef<'_>) -> Result<()> {
        let out = &mut *self.out;
        match leaf {
            LeafRef::Bool(v) => out.push(u8::from(*v)),
            LeafRef::Int8(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::UInt8(v) => out.push(*v),
            LeafRef::Int16(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::UInt16(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::UInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::UInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::Float32(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::Float64(v) => out.extend_from_slice(&v.to_le_bytes()),
            LeafRef::FloatMax(v) => out.extend_from_slice(&v.0.to_le_bytes()),
            LeafRef::Complex128(v) => {
                out.extend_from_slice(&v.re.to_le_bytes());
                out.extend_from_slice(&v.im.to_le_bytes());
            }
            LeafRef::String(v) => format::put_str(out, v)?,
        }
        Ok(())
    }

    fn on_object(&mut self, object: &ObjectRef) -> Result<()> {
        format::put_marker(self.out, true)?;
        self.record(object)
    }

    fn on_null(&mut self) -> Result<()> {
        Ok(format::put_marker(self.out, false)?)
    }

    fn enter_vector(&mut self, len: usize) -> Result<()> {
        Ok(format::put_len(self.out, len)?)
    }

    fn exit_vector(&mut self, _len: usize) -> Result<()> {
        Ok(())
    }

    fn enter_matrix(&mut self, rows: usize, cols: usize) -> Result<()> {
        format::put_len(self.out, rows)?;
        Ok(format::put_len(self.out, cols)?)
    }

    fn exit_matrix(&mut self, _rows: usize, _cols: usize) -> Result<()> {
        Ok(())
    }

    fn enter_sparse_vector(&mut self, dimension: usize, nnz: usize) -> Result<()> {
        format::put_len(self.out, dimension)?;
        Ok(format::put_len(self.out, nnz)?)
    }

    fn sparse_index(&mut self, index: usize) -> Result<()> {
        Ok(format::put_len(self.out, index)?)
    }

    fn exit_sparse_vector(&mut self) -> Result<()> {
        Ok(())
    }

    fn enter_sparse_matrix(&mut self, num_vectors: usize, num_features: usize) -> Result<()> {
        format::put_len(self.out, num_vectors)?;
        Ok(format::put_len(self.out, num_features)?)
    }

    fn exit_sparse_matrix(&mut self) -> Result<()> {
        Ok(())
    }
}
