use std::io::Write;

use serde_json::Value as Json;

use super::JsonOptions;
use super::record::{self, Executes, Link, ListNode, MatrixNode, Node, Record, Setting, Slot};
use super::record::{SparseEntryNode, SparseMatrixNode, SparseVectorNode, TypedLiteral};
use crate::error::{Error, Result};
use crate::object::{HookStage, ObjectRef, run_hook};
use crate::ops::CycleGuard;
use crate::param::ParameterProperties;
use crate::serde::{PersistFilter, Serializer};
use crate::value::DynamicValue;

// -----------------------------------------------------------------------------
// JsonSerializer

/// Writes objects as JSON-LD records.
///
/// Each [`write`](Serializer::write) emits one record followed by a newline,
/// so several roots can share one stream.
pub struct JsonSerializer {
    stream: Option<Box<dyn Write + Send>>,
    options: JsonOptions,
    filter: PersistFilter,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self::with_options(JsonOptions::default())
    }

    pub fn with_options(options: JsonOptions) -> Self {
        Self {
            stream: None,
            options,
            filter: PersistFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: PersistFilter) -> Self {
        self.filter = filter;
        self
    }

    #[inline]
    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    /// Builds the record of `object` without writing it.
    pub fn to_json(&self, object: &ObjectRef) -> Result<Json> {
        let mut record = RecordWriter {
            filter: &self.filter,
            guard: CycleGuard::new(),
        }
        .record(object)?;
        if self.options.context {
            record.context = Some(record::context());
        }
        Ok(serde_json::to_value(record)?)
    }
}

impl Serializer for JsonSerializer {
    fn attach(&mut self, stream: Box<dyn Write + Send>) {
        self.stream = Some(stream);
    }

    fn write(&mut self, object: &ObjectRef) -> Result<()> {
        if self.stream.is_none() {
            return Err(Error::NoStream);
        }
        log::debug!("writing `{}` as JSON", object.type_name());
        let json = self.to_json(object)?;

        let stream = self.stream.as_mut().ok_or(Error::NoStream)?;
        if self.options.pretty {
            serde_json::to_writer_pretty(&mut *stream, &json)?;
        } else {
            serde_json::to_writer(&mut *stream, &json)?;
        }
        stream.write_all(b"\n")?;
        stream.flush()?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// RecordWriter

struct RecordWriter<'f> {
    filter: &'f PersistFilter,
    guard: CycleGuard,
}

impl RecordWriter<'_> {
    fn record(&mut self, object: &ObjectRef) -> Result<Record> {
        self.guard.enter(object)?;
        run_hook(object, HookStage::PreSerialize)?;

        // Values are recorded under the read lock, nested objects by
        // reference, and encoded after the lock is released.
        let (executes, values) = {
            let obj = object.read();
            let type_name = obj.type_name();

            let mut slots = Vec::new();
            let mut values = Vec::new();
            for param in obj.parameters() {
                if !self.filter.accepts(param) {
                    continue;
                }
                let value = param.value(&*obj)?;
                if !value.visitable() {
                    continue;
                }
                #[cfg(feature = "debug")]
                log::trace!("writing `{type_name}::{}` as `{}`", param.name(), param.type_tag());

                let kind = if param.has_property(ParameterProperties::HYPERPARAMETER) {
                    record::HYPER_PARAMETER
                } else {
                    record::PARAMETER
                };
                slots.push(Slot {
                    id: record::blank(param.name()),
                    types: record::types(kind),
                    value_type: param.type_tag().to_string(),
                });
                values.push((param.name(), DynamicValue::record(&value)?));
            }

            let executes = Executes {
                id: record::blank(type_name),
                types: record::types(record::IMPLEMENTATION),
                name: type_name.to_owned(),
                primitive_type: obj.primitive_type().name().to_owned(),
                parameters: slots,
                implements: obj.implements().map(|kind| Node {
                    id: record::blank(kind),
                    types: record::types(record::ALGORITHM),
                }),
            };
            (executes, values)
        };

        self.guard.push(object, object.type_name());
        let mut input_values = Vec::with_capacity(values.len());
        for (name, value) in values {
            let value = self.encode(value).map_err(|err| err.in_field(name))?;
            input_values.push(Setting {
                id: record::blank(&format!("{name}Setting")),
                types: record::types(record::SETTING),
                value,
                specified_by: Link { id: record::blank(name) },
            });
        }
        self.guard.pop();

        run_hook(object, HookStage::PostSerialize)?;
        Ok(Record {
            context: None,
            executes,
            input_values,
        })
    }

    fn encode(&mut self, value: DynamicValue) -> Result<Json> {
        let json = match value {
            DynamicValue::Scalar(scalar) => serde_json::to_value(TypedLiteral {
                datatype: scalar.primitive_type().xsd_type().to_owned(),
                value: scalar.as_leaf().lexical(),
            })?,
            DynamicValue::Null => Json::Null,
            DynamicValue::Object(object) => serde_json::to_value(self.record(&object)?)?,
            DynamicValue::Vector(items) => serde_json::to_value(ListNode {
                list: self.encode_all(items)?,
            })?,
            DynamicValue::Matrix { rows, cols, data } => serde_json::to_value(MatrixNode {
                datatype: record::MATRIX.to_owned(),
                rows,
                cols,
                list: self.encode_all(data)?,
            })?,
            DynamicValue::SparseVector { dimension, entries } => {
                let mut list = Vec::with_capacity(entries.len());
                for (index, value) in entries {
                    list.push(SparseEntryNode {
                        index,
                        value: self.encode(value)?,
                    });
                }
                serde_json::to_value(SparseVectorNode {
                    datatype: record::SPARSE_VECTOR.to_owned(),
                    dimension,
                    list,
                })?
            }
            DynamicValue::SparseMatrix { num_features, vectors } => serde_json::to_value(SparseMatrixNode {
                datatype: record::SPARSE_MATRIX.to_owned(),
                features: num_features,
                list: self.encode_all(vectors)?,
            })?,
        };
        Ok(json)
    }

    fn encode_all(&mut self, values: Vec<DynamicValue>) -> Result<Vec<Json>> {
        values.into_iter().map(|value| self.encode(value)).collect()
    }
}
