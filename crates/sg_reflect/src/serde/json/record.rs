use std::collections::BTreeMap;

use ::serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::value::PrimitiveType;

// -----------------------------------------------------------------------------
// Vocabulary

pub(super) const IMPLEMENTATION: [&str; 2] = ["mls:Implementation", "owl:NamedIndividual"];
pub(super) const ALGORITHM: [&str; 2] = ["mls:Algorithm", "owl:NamedIndividual"];
pub(super) const HYPER_PARAMETER: [&str; 2] = ["owl:NamedIndividual", "mls:HyperParameter"];
pub(super) const PARAMETER: [&str; 2] = ["owl:NamedIndividual", "sg:Parameter"];
pub(super) const SETTING: [&str; 2] = ["owl:NamedIndividual", "mls:HyperParameterSetting"];

pub(super) const MATRIX: &str = "sg:matrix";
pub(super) const SPARSE_VECTOR: &str = "sg:sparseVector";
pub(super) const SPARSE_MATRIX: &str = "sg:sparseMatrix";

/// Prefix table written under `@context` by the root record.
pub(super) fn context() -> BTreeMap<String, String> {
    [
        ("mls", "http://www.w3.org/ns/mls#"),
        ("owl", "http://www.w3.org/2002/07/owl#"),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
        ("sg", "http://shogun-toolbox.org/ns#"),
        ("_id", "@id"),
        ("executes", "mls:executes"),
        ("input_values", "mls:hasInput"),
        ("name", "dcterms:title"),
        ("implements", "mls:implements"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}

/// Blank node identifier, `_:name`.
pub(super) fn blank(name: &str) -> String {
    format!("_:{name}")
}

pub(super) fn strip_blank(id: &str) -> &str {
    id.strip_prefix("_:").unwrap_or(id)
}

pub(super) fn types(names: [&str; 2]) -> Vec<String> {
    names.iter().map(|s| (*s).to_owned()).collect()
}

// -----------------------------------------------------------------------------
// Object record

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Record {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
    pub executes: Executes,
    #[serde(default)]
    pub input_values: Vec<Setting>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Executes {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    pub name: String,
    pub primitive_type: String,
    #[serde(default)]
    pub parameters: Vec<Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implements: Option<Node>,
}

/// Declaration of one written parameter.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Slot {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
    #[serde(rename = "sg:valueType")]
    pub value_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Node {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub types: Vec<String>,
}

/// Value of one parameter, linked to its [`Slot`] by blank node id.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Setting {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    #[serde(rename = "mls:hasValue")]
    pub value: Json,
    #[serde(rename = "mls:specifiedBy")]
    pub specified_by: Link,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct Link {
    #[serde(rename = "_id")]
    pub id: String,
}

// -----------------------------------------------------------------------------
// Values

/// `{"@type": "xsd:double", "@value": "2.5"}`
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct TypedLiteral {
    #[serde(rename = "@type")]
    pub datatype: String,
    #[serde(rename = "@value")]
    pub value: String,
}

/// `{"@list": [...]}`
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ListNode {
    #[serde(rename = "@list")]
    pub list: Vec<Json>,
}

/// Column-major dense matrix.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct MatrixNode {
    #[serde(rename = "@type")]
    pub datatype: String,
    pub rows: usize,
    pub cols: usize,
    #[serde(rename = "@list")]
    pub list: Vec<Json>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SparseVectorNode {
    #[serde(rename = "@type")]
    pub datatype: String,
    pub dimension: usize,
    #[serde(rename = "@list")]
    pub list: Vec<SparseEntryNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SparseEntryNode {
    pub index: usize,
    pub value: Json,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SparseMatrixNode {
    #[serde(rename = "@type")]
    pub datatype: String,
    pub features: usize,
    #[serde(rename = "@list")]
    pub list: Vec<Json>,
}

// -----------------------------------------------------------------------------
// Shape detection

/// Outline of a JSON value, checked against the expected
/// [`TypeTag`](crate::value::TypeTag) before decoding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Shape {
    Null,
    Record,
    /// A typed literal, `None` when its datatype is not a known primitive.
    Literal(Option<PrimitiveType>),
    Vector,
    Matrix,
    SparseVector,
    SparseMatrix,
    Unknown,
}

impl Shape {
    pub fn of(json: &Json) -> Self {
        let Json::Object(map) = json else {
            return if json.is_null() { Self::Null } else { Self::Unknown };
        };
        if map.contains_key("executes") {
            return Self::Record;
        }
        let datatype = map.get("@type").and_then(Json::as_str);
        match (datatype, map.contains_key("@list"), map.contains_key("@value")) {
            (Some(MATRIX), true, _) => Self::Matrix,
            (Some(SPARSE_VECTOR), true, _) => Self::SparseVector,
            (Some(SPARSE_MATRIX), true, _) => Self::SparseMatrix,
            (None, true, _) => Self::Vector,
            (Some(datatype), false, true) => Self::Literal(PrimitiveType::from_xsd_type(datatype)),
            _ => Self::Unknown,
        }
    }

    /// Name reported as the `found` side of an incompatible type.
    pub fn describe(self) -> String {
        match self {
            Self::Null | Self::Record => "object".to_owned(),
            Self::Literal(Some(pt)) => pt.name().to_owned(),
            Self::Literal(None) => "literal".to_owned(),
            Self::Vector => "vector".to_owned(),
            Self::Matrix => "matrix".to_owned(),
            Self::SparseVector => "sparse_vector".to_owned(),
            Self::SparseMatrix => "sparse_matrix".to_owned(),
            Self::Unknown => "unknown".to_owned(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Shape, strip_blank};
    use crate::value::PrimitiveType;

    #[test]
    fn shapes() {
        assert_eq!(Shape::of(&json!(null)), Shape::Null);
        assert_eq!(Shape::of(&json!({"executes": {}})), Shape::Record);
        assert_eq!(
            Shape::of(&json!({"@type": "xsd:double", "@value": "1.0"})),
            Shape::Literal(Some(PrimitiveType::Float64))
        );
        assert_eq!(Shape::of(&json!({"@list": []})), Shape::Vector);
        assert_eq!(Shape::of(&json!({"@type": "sg:matrix", "@list": []})), Shape::Matrix);
        assert_eq!(Shape::of(&json!(3)), Shape::Unknown);

        assert_eq!(Shape::of(&json!({"@type": "xsd:int", "@value": "1"})).describe(), "int32");
        assert_eq!(Shape::of(&json!({"@type": "ex:odd", "@value": "1"})).describe(), "literal");
    }

    #[test]
    fn blank_nodes() {
        assert_eq!(strip_blank("_:width"), "width");
        assert_eq!(strip_blank("width"), "width");
    }
}
