//! JSON-LD backend.
//!
//! Every object becomes a record with two sections:
//!
//! ```text
//! {
//!   "@context": { "mls": "http://www.w3.org/ns/mls#", ... },
//!   "executes": {
//!     "_id": "_:GaussianKernel",
//!     "@type": ["mls:Implementation", "owl:NamedIndividual"],
//!     "name": "GaussianKernel",
//!     "primitive_type": "notgeneric",
//!     "parameters": [
//!       { "_id": "_:width", "@type": ["owl:NamedIndividual", "mls:HyperParameter"],
//!         "sg:valueType": "float64" }
//!     ]
//!   },
//!   "input_values": [
//!     { "_id": "_:widthSetting",
//!       "@type": ["owl:NamedIndividual", "mls:HyperParameterSetting"],
//!       "mls:hasValue": { "@type": "xsd:double", "@value": "1.0" },
//!       "mls:specifiedBy": { "_id": "_:width" } }
//!   ]
//! }
//! ```
//!
//! Only the root record carries `@context`. Values are encoded as:
//!
//! - scalars: typed literals, the value always a string (`"1.0"`, `"true"`,
//!   `"1.0,-2.0"` for complex numbers),
//! - object references: a nested record, or `null`,
//! - vectors: `{"@list": [...]}`,
//! - matrices: `{"@type": "sg:matrix", "rows", "cols", "@list"}` in
//!   column-major order,
//! - sparse vectors: `{"@type": "sg:sparseVector", "dimension", "@list": [{"index", "value"}]}`,
//! - sparse matrices: `{"@type": "sg:sparseMatrix", "features", "@list": [<sparse vectors>]}`.
//!
//! Machines also emit `executes.implements`, naming their learning task.

// -----------------------------------------------------------------------------
// Modules

mod reader;
mod record;
mod writer;

// -----------------------------------------------------------------------------
// Exports

pub use reader::JsonDeserializer;
pub use writer::JsonSerializer;

// -----------------------------------------------------------------------------
// JsonOptions

/// Output options of [`JsonSerializer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Indent the output.
    pub pretty: bool,
    /// Write the `@context` prefix table on root records.
    pub context: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            context: true,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::{Value as Json, json};

    use super::{JsonDeserializer, JsonOptions, JsonSerializer};
    use crate::error::{Error, SchemaError};
    use crate::mock::{ForgetfulHook, MockContainer, MockNumbers, MockObject, MockPart, SharedBuffer, mock_registry};
    use crate::object::{HookStage, ObjectRef};
    use crate::ops::equals;
    use crate::serde::{Deserializer, PersistFilter, Serializer};

    fn setting<'a>(record: &'a mut Json, name: &str) -> &'a mut Json {
        let id = format!("_:{name}");
        record["input_values"]
            .as_array_mut()
            .unwrap()
            .iter_mut()
            .find(|s| s["mls:specifiedBy"]["_id"] == id.as_str())
            .unwrap()
    }

    #[test]
    fn record_layout() {
        let object = ObjectRef::new(MockObject::filled());
        let mut record = JsonSerializer::new().to_json(&object).unwrap();

        assert_eq!(record["executes"]["name"], "MockObject");
        assert_eq!(record["executes"]["primitive_type"], "notgeneric");
        assert_eq!(record["@context"]["xsd"], "http://www.w3.org/2001/XMLSchema#");
        assert!(record["executes"].get("implements").is_none());

        let slot = &record["executes"]["parameters"][1];
        assert_eq!(slot["_id"], "_:some_float64");
        assert_eq!(slot["@type"][1], "mls:HyperParameter");
        assert_eq!(slot["sg:valueType"], "float64");

        assert_eq!(
            setting(&mut record, "some_float64")["mls:hasValue"],
            json!({"@type": "xsd:double", "@value": "0.75"})
        );
        assert_eq!(
            setting(&mut record, "some_complex")["mls:hasValue"]["@value"],
            "1.0,-2.0"
        );
        assert_eq!(
            setting(&mut record, "vector")["mls:hasValue"]["@list"][1]["@value"],
            "2.5"
        );
        let matrix = setting(&mut record, "matrix")["mls:hasValue"].clone();
        assert_eq!(matrix["@type"], "sg:matrix");
        assert_eq!((matrix["rows"].as_u64(), matrix["cols"].as_u64()), (Some(2), Some(3)));
        let sparse = setting(&mut record, "sparse")["mls:hasValue"].clone();
        assert_eq!(sparse["dimension"], 8);
        assert_eq!(sparse["@list"][1]["index"], 6);

        // Nested records carry no context.
        let part = setting(&mut record, "owned_part")["mls:hasValue"].clone();
        assert_eq!(part["executes"]["name"], "MockPart");
        assert!(part.get("@context").is_none());
        assert_eq!(part["input_values"][0]["mls:hasValue"]["@value"], "2.0");

        let parts = setting(&mut record, "parts")["mls:hasValue"]["@list"].clone();
        assert!(parts[1].is_null());
    }

    #[test]
    fn skipped_parameters() {
        let object = ObjectRef::new(MockObject::filled());
        object.put("scratch", 9.0_f64).unwrap();
        object.with_mut(|m: &mut MockObject| m.deferred.take()).unwrap();

        let record = JsonSerializer::new().to_json(&object).unwrap();
        let names: Vec<&str> = record["input_values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["mls:specifiedBy"]["_id"].as_str().unwrap())
            .collect();
        assert!(!names.contains(&"_:scratch"));
        assert!(!names.contains(&"_:deferred"));
        assert!(names.contains(&"_:version"));

        let all = JsonSerializer::new().with_filter(PersistFilter::all()).to_json(&object).unwrap();
        assert_eq!(all["input_values"].as_array().unwrap().len(), names.len() + 1);
    }

    #[test]
    fn stream_round_trip() {
        let registry = mock_registry();
        let buffer = SharedBuffer::default();
        let first = ObjectRef::new(MockObject::filled());
        let second = ObjectRef::new(MockPart::new(-1.5));

        let mut serializer = JsonSerializer::with_options(JsonOptions {
            pretty: true,
            context: true,
        });
        serializer.attach(Box::new(buffer.clone()));
        serializer.write(&first).unwrap();
        serializer.write(&second).unwrap();
        assert_eq!(first.with(|m: &MockObject| m.pre_serialize_calls).unwrap(), 1);

        let mut deserializer = JsonDeserializer::new(&registry);
        deserializer.attach(buffer.reader());
        let a = deserializer.read_object().unwrap();
        let b = deserializer.read_object().unwrap();
        assert!(equals(&first, &a).unwrap());
        assert!(equals(&second, &b).unwrap());

        // Shared objects are written per reference and come back as copies.
        let shared_a = first.get::<Option<ObjectRef>>("shared_part").unwrap().unwrap();
        let shared_b = a.get::<Option<ObjectRef>>("shared_part").unwrap().unwrap();
        assert!(!shared_a.ptr_eq(&shared_b));

        assert!(matches!(deserializer.read_object(), Err(Error::Io(_))));
    }

    #[test]
    fn every_integer_width_and_nested_vectors() {
        let registry = mock_registry();
        let original = ObjectRef::new(MockNumbers::filled());
        let mut record = JsonSerializer::new().to_json(&original).unwrap();

        assert_eq!(
            setting(&mut record, "some_u64")["mls:hasValue"],
            json!({"@type": "xsd:unsignedLong", "@value": "18446744073709551615"})
        );
        assert_eq!(
            setting(&mut record, "some_i8")["mls:hasValue"]["@value"],
            "-128"
        );
        let rows = setting(&mut record, "rows")["mls:hasValue"]["@list"].clone();
        assert_eq!(rows.as_array().unwrap().len(), 3);
        assert_eq!(rows[0]["@list"][1]["@value"], "-2");
        assert!(rows[1]["@list"].as_array().unwrap().is_empty());

        let restored = JsonDeserializer::new(&registry).from_json(record).unwrap();
        assert!(equals(&original, &restored).unwrap());
        assert_eq!(restored.get::<u64>("some_u64").unwrap(), u64::MAX);
        assert_eq!(restored.get::<i16>("some_i16").unwrap(), i16::MIN);
        assert_eq!(
            restored.get::<Vec<Vec<String>>>("words").unwrap(),
            [vec!["a b".to_owned(), String::new()], vec!["\"\\".to_owned()]]
        );
    }

    #[test]
    fn read_into_existing() {
        let registry = mock_registry();
        let source = ObjectRef::new(MockPart::new(6.0));
        let buffer = SharedBuffer::default();
        let mut serializer = JsonSerializer::new();
        serializer.attach(Box::new(buffer.clone()));
        serializer.write(&source).unwrap();
        serializer.write(&source).unwrap();

        let mut deserializer = JsonDeserializer::new(&registry);
        deserializer.attach(buffer.reader());
        let target = ObjectRef::new(MockPart::new(0.0));
        deserializer.read(&target).unwrap();
        assert_eq!(target.get::<f64>("weight").unwrap(), 6.0);

        let wrong = ObjectRef::new(MockContainer::new(Vec::new()));
        assert!(matches!(
            deserializer.read(&wrong),
            Err(Error::Schema(SchemaError::IncompatibleType { .. }))
        ));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let registry = mock_registry();
        let source = ObjectRef::new(MockPart::new(6.0));
        let mut record = JsonSerializer::new().to_json(&source).unwrap();
        record["input_values"].as_array_mut().unwrap().push(json!({
            "_id": "_:biasSetting",
            "mls:hasValue": {"@type": "xsd:double", "@value": "1.0"},
            "mls:specifiedBy": {"_id": "_:bias"}
        }));

        let restored = JsonDeserializer::new(&registry).from_json(record).unwrap();
        assert!(equals(&source, &restored).unwrap());
    }

    #[test]
    fn incompatible_value_type() {
        let registry = mock_registry();
        let mut record = JsonSerializer::new()
            .to_json(&ObjectRef::new(MockObject::filled()))
            .unwrap();
        setting(&mut record, "some_float64")["mls:hasValue"] = json!({"@type": "xsd:int", "@value": "1"});

        match JsonDeserializer::new(&registry).from_json(record) {
            Err(Error::Schema(SchemaError::IncompatibleType { field, expected, found })) => {
                assert_eq!(field, "some_float64");
                assert_eq!(expected, "float64");
                assert_eq!(found, "int32");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_in_container() {
        let registry = mock_registry();
        let mut record = JsonSerializer::new()
            .to_json(&ObjectRef::new(MockObject::filled()))
            .unwrap();
        setting(&mut record, "vector")["mls:hasValue"] = json!({"@type": "xsd:double", "@value": "1.0"});

        match JsonDeserializer::new(&registry).from_json(record) {
            Err(Error::Schema(SchemaError::IncompatibleType { field, expected, .. })) => {
                assert_eq!(field, "vector");
                assert_eq!(expected, "vector<float64>");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_class_is_a_schema_error() {
        let registry = mock_registry();
        let mut record = JsonSerializer::new()
            .to_json(&ObjectRef::new(MockObject::filled()))
            .unwrap();
        setting(&mut record, "owned_part")["mls:hasValue"]["executes"]["name"] = json!("RetiredPart");

        match JsonDeserializer::new(&registry).from_json(record) {
            Err(Error::Schema(SchemaError::UnknownClass { name, .. })) => assert_eq!(name, "RetiredPart"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn forgotten_hook_aborts_the_write() {
        let buffer = SharedBuffer::default();
        let mut serializer = JsonSerializer::new();
        serializer.attach(Box::new(buffer.clone()));

        let object = ObjectRef::new(ForgetfulHook::new());
        match serializer.write(&object) {
            Err(Error::ImplementationError { type_name, hook }) => {
                assert_eq!(type_name, "ForgetfulHook");
                assert_eq!(hook, HookStage::PreSerialize);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(buffer.bytes().is_empty());

        // Also when nested.
        let parent = ObjectRef::new(MockContainer::new(vec![Some(object)]));
        assert!(matches!(
            serializer.write(&parent),
            Err(Error::ImplementationError { .. })
        ));
    }

    #[test]
    fn stream_errors() {
        let registry = mock_registry();
        let object = ObjectRef::new(MockPart::new(1.0));
        assert!(matches!(JsonSerializer::new().write(&object), Err(Error::NoStream)));
        assert!(matches!(
            JsonDeserializer::new(&registry).read_object(),
            Err(Error::NoStream)
        ));

        let mut deserializer = JsonDeserializer::new(&registry);
        deserializer.attach(Box::new(std::io::Cursor::new(br#"{"executes": {"name": "Mock"#.to_vec())));
        assert!(matches!(deserializer.read_object(), Err(Error::Io(_))));

        let mut deserializer = JsonDeserializer::new(&registry);
        deserializer.attach(Box::new(std::io::Cursor::new(br#"{"executes": 3}"#.to_vec())));
        assert!(matches!(
            deserializer.read_object(),
            Err(Error::Schema(SchemaError::Malformed(_)))
        ));
    }

    #[test]
    fn cycles_are_reported() {
        let a = ObjectRef::new(MockContainer::new(Vec::new()));
        a.put("children", vec![Some(a.clone())]).unwrap();
        assert!(matches!(
            JsonSerializer::new().to_json(&a),
            Err(Error::CyclicReference { type_name: "MockContainer" })
        ));
        a.put("children", Vec::<Option<ObjectRef>>::new()).unwrap();
    }
}
