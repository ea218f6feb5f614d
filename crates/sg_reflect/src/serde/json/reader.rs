use std::io::{self, Read};

use serde_json::Value as Json;
use serde_json::de::IoRead;

use super::record::{self, ListNode, MatrixNode, Record, Shape, SparseMatrixNode, SparseVectorNode, TypedLiteral};
use crate::error::{Error, Result, SchemaError};
use crate::object::{HookStage, ObjectRef, run_hook};
use crate::registry::ClassRegistry;
use crate::serde::{self as sg_serde, Deserializer};
use crate::value::{DynamicValue, PrimitiveType, Scalar, TypeTag};

type RecordStream = serde_json::StreamDeserializer<'static, IoRead<Box<dyn Read + Send>>, Json>;

// -----------------------------------------------------------------------------
// JsonDeserializer

/// Reads JSON-LD records written by [`JsonSerializer`](super::JsonSerializer).
///
/// Classes are created through `registry`. Values are decoded guided by the
/// type of the parameter they land in, so a literal typed `xsd:int` never
/// ends up in a `float64` field.
pub struct JsonDeserializer<'r> {
    registry: &'r ClassRegistry,
    stream: Option<RecordStream>,
}

impl<'r> JsonDeserializer<'r> {
    pub fn new(registry: &'r ClassRegistry) -> Self {
        Self { registry, stream: None }
    }

    /// Recreates the object described by an already parsed record.
    pub fn from_json(&self, json: Json) -> Result<ObjectRef> {
        RecordReader { registry: self.registry }.object(json, None)
    }

    fn next_record(&mut self) -> Result<Json> {
        let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
        match stream.next() {
            Some(json) => Ok(json?),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no record left in the stream").into()),
        }
    }
}

impl Deserializer for JsonDeserializer<'_> {
    fn attach(&mut self, stream: Box<dyn Read + Send>) {
        self.stream = Some(serde_json::Deserializer::from_reader(stream).into_iter());
    }

    fn read_object(&mut self) -> Result<ObjectRef> {
        let json = self.next_record()?;
        let object = self.from_json(json)?;
        log::debug!("read `{}` from JSON", object.type_name());
        Ok(object)
    }

    fn read(&mut self, into: &ObjectRef) -> Result<()> {
        let json = self.next_record()?;
        RecordReader { registry: self.registry }.object(json, Some(into))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RecordReader

struct RecordReader<'r> {
    registry: &'r ClassRegistry,
}

impl RecordReader<'_> {
    fn object(&self, json: Json, into: Option<&ObjectRef>) -> Result<ObjectRef> {
        let record: Record = serde_json::from_value(json)?;
        let name = record.executes.name.as_str();
        let primitive_type = PrimitiveType::from_name(&record.executes.primitive_type).ok_or_else(|| {
            SchemaError::malformed(format!("unknown primitive type `{}`", record.executes.primitive_type))
        })?;

        let object = match into {
            Some(into) => {
                sg_serde::check_header(into, name, primitive_type)?;
                into.clone()
            }
            None => sg_serde::create_from_header(self.registry, name, primitive_type)?,
        };

        run_hook(&object, HookStage::PreDeserialize)?;
        let type_name = object.type_name();
        for setting in record.input_values {
            let field = record::strip_blank(&setting.specified_by.id);
            let param = object.read().parameters().find(field).cloned();
            let Some(param) = param else {
                sg_serde::skip_unknown_field(type_name, field);
                continue;
            };
            #[cfg(feature = "debug")]
            log::trace!("reading `{type_name}::{field}` as `{}`", param.type_tag());

            // Nested objects are built before the parent is locked.
            let value = self.decode(param.type_tag(), setting.value);
            value
                .and_then(|value| {
                    let mut obj = object.write();
                    param.value_mut(&mut *obj)?.apply(value)
                })
                .map_err(|err| err.in_field(field))?;
        }
        run_hook(&object, HookStage::PostDeserialize)?;

        Ok(object)
    }

    fn decode(&self, tag: &TypeTag, json: Json) -> Result<DynamicValue> {
        let shape = Shape::of(&json);
        let value = match (tag, shape) {
            (TypeTag::Scalar(pt), Shape::Literal(Some(found))) if found == *pt => {
                let literal: TypedLiteral = serde_json::from_value(json)?;
                DynamicValue::Scalar(Scalar::parse(*pt, &literal.value)?)
            }
            (TypeTag::Object, Shape::Null) => DynamicValue::Null,
            (TypeTag::Object, Shape::Record) => DynamicValue::Object(self.object(json, None)?),
            (TypeTag::Vector(inner), Shape::Vector) => {
                let node: ListNode = serde_json::from_value(json)?;
                DynamicValue::Vector(self.decode_all(inner, node.list)?)
            }
            (TypeTag::Matrix(inner), Shape::Matrix) => {
                let node: MatrixNode = serde_json::from_value(json)?;
                DynamicValue::Matrix {
                    rows: node.rows,
                    cols: node.cols,
                    data: self.decode_all(inner, node.list)?,
                }
            }
            (TypeTag::SparseVector(inner), Shape::SparseVector) => {
                let node: SparseVectorNode = serde_json::from_value(json)?;
                let mut entries = Vec::with_capacity(node.list.len());
                for entry in node.list {
                    entries.push((entry.index, self.decode(inner, entry.value)?));
                }
                DynamicValue::SparseVector {
                    dimension: node.dimension,
                    entries,
                }
            }
            (TypeTag::SparseMatrix(inner), Shape::SparseMatrix) => {
                let node: SparseMatrixNode = serde_json::from_value(json)?;
                let vector_tag = TypeTag::SparseVector(inner.clone());
                DynamicValue::SparseMatrix {
                    num_features: node.features,
                    vectors: self.decode_all(&vector_tag, node.list)?,
                }
            }
            (_, Shape::Unknown) => {
                return Err(SchemaError::malformed(format!("`{json}` is not a value record")).into());
            }
            (expected, found) => return Err(SchemaError::incompatible(expected, found.describe()).into()),
        };
        Ok(value)
    }

    fn decode_all(&self, tag: &TypeTag, items: Vec<Json>) -> Result<Vec<DynamicValue>> {
        items.into_iter().map(|item| self.decode(tag, item)).collect()
    }
}
