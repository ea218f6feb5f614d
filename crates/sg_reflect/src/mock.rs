//! Test objects covering every value shape and hook behavior.

use crate::cast;
use crate::error::Result;
use crate::object::{Hook, Object, ObjectRef};
use crate::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use crate::registry::{ClassEntry, ClassRegistry};
use crate::value::{Complex128, Deferred, FloatMax, Matrix, PrimitiveType, SparseMatrix, SparseVector};

// -----------------------------------------------------------------------------
// MockObject

pub(crate) struct MockObject {
    pub some_bool: bool,
    pub some_float64: f64,
    pub some_floatmax: FloatMax,
    pub some_complex: Complex128,
    pub some_string: String,
    pub vector: Vec<f64>,
    pub matrix: Matrix<f64>,
    pub sparse: SparseVector<f64>,
    pub sparse_matrix: SparseMatrix<f32>,
    pub deferred: Deferred<i32>,
    pub version: u32,
    pub owned_part: Option<ObjectRef>,
    pub shared_part: Option<ObjectRef>,
    pub parts: Vec<Option<ObjectRef>>,
    pub scratch: f64,
    pub pre_serialize_calls: u32,
    params: ParameterRegistry,
}

impl MockObject {
    pub fn new() -> Self {
        Self {
            some_bool: false,
            some_float64: 0.0,
            some_floatmax: FloatMax(0.0),
            some_complex: Complex128::new(0.0, 0.0),
            some_string: String::new(),
            vector: Vec::new(),
            matrix: Matrix::default(),
            sparse: SparseVector::new(8),
            sparse_matrix: SparseMatrix::new(5),
            deferred: Deferred::empty(),
            version: 1,
            owned_part: None,
            shared_part: None,
            parts: Vec::new(),
            scratch: 0.0,
            pre_serialize_calls: 0,
            params: ParamsBuilder::<Self>::new("MockObject")
                .add("some_bool", |m| &m.some_bool, |m| &mut m.some_bool, P::SETTING)
                .add("some_float64", |m| &m.some_float64, |m| &mut m.some_float64, P::HYPERPARAMETER)
                .add("some_floatmax", |m| &m.some_floatmax, |m| &mut m.some_floatmax, P::HYPERPARAMETER)
                .add("some_complex", |m| &m.some_complex, |m| &mut m.some_complex, P::empty())
                .add("some_string", |m| &m.some_string, |m| &mut m.some_string, P::SETTING)
                .add("vector", |m| &m.vector, |m| &mut m.vector, P::MODEL_STATE)
                .add("matrix", |m| &m.matrix, |m| &mut m.matrix, P::MODEL_STATE)
                .add("sparse", |m| &m.sparse, |m| &mut m.sparse, P::MODEL_STATE)
                .add("sparse_matrix", |m| &m.sparse_matrix, |m| &mut m.sparse_matrix, P::MODEL_STATE)
                .add("deferred", |m| &m.deferred, |m| &mut m.deferred, P::empty())
                .add("version", |m| &m.version, |m| &mut m.version, P::READONLY)
                .add("owned_part", |m| &m.owned_part, |m| &mut m.owned_part, P::MODEL_STATE)
                .add_shared("shared_part", |m| &m.shared_part, |m| &mut m.shared_part, P::SETTING)
                .add("parts", |m| &m.parts, |m| &mut m.parts, P::MODEL_STATE)
                .add("scratch", |m| &m.scratch, |m| &mut m.scratch, P::TRANSIENT)
                .build(),
        }
    }

    /// Every parameter set to a non-default value, except `scratch`.
    pub fn filled() -> Self {
        let mut sparse_matrix = SparseMatrix::new(5);
        sparse_matrix.vectors.push(SparseVector::from_pairs(5, [(0, 1.5_f32), (4, -0.25)]));
        sparse_matrix.vectors.push(SparseVector::new(5));

        Self {
            some_bool: true,
            some_float64: 0.75,
            some_floatmax: FloatMax(1.25),
            some_complex: Complex128::new(1.0, -2.0),
            some_string: "hello".to_owned(),
            vector: vec![1.0, 2.5, -3.0],
            matrix: Matrix::from_column_major(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap(),
            sparse: SparseVector::from_pairs(8, [(1, 0.5), (6, -2.0)]),
            sparse_matrix,
            deferred: Deferred::new(7),
            owned_part: Some(ObjectRef::new(MockPart::new(2.0))),
            shared_part: Some(ObjectRef::new(MockPart::new(3.0))),
            parts: vec![Some(ObjectRef::new(MockPart::new(4.0))), None],
            ..Self::new()
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("MockObject", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
    }
}

impl Object for MockObject {
    fn type_name(&self) -> &'static str {
        "MockObject"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }

    fn pre_serialize(&mut self, hook: &mut Hook) -> Result<()> {
        self.pre_serialize_calls += 1;
        hook.chain();
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// MockPart

pub(crate) trait Weighted {
    fn weight(&self) -> f64;

    fn set_weight(&mut self, weight: f64);
}

pub(crate) struct MockPart {
    pub weight: f64,
    params: ParameterRegistry,
}

impl MockPart {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            params: ParamsBuilder::<Self>::new("MockPart")
                .add("weight", |p| &p.weight, |p| &mut p.weight, P::HYPERPARAMETER | P::GRADIENT_ENABLED)
                .build(),
        }
    }

    pub fn factory() -> ObjectRef {
        ObjectRef::new(Self::new(0.0))
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("MockPart", PrimitiveType::NotGeneric, Self::factory).with_cast(cast!(MockPart => Weighted))
    }
}

impl Weighted for MockPart {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

impl Object for MockPart {
    fn type_name(&self) -> &'static str {
        "MockPart"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(Self::factory())
    }
}

// -----------------------------------------------------------------------------
// MockNumbers

/// Every integer width, `f32` and nested vectors, at their extremes.
pub(crate) struct MockNumbers {
    pub some_i8: i8,
    pub some_u8: u8,
    pub some_i16: i16,
    pub some_u16: u16,
    pub some_i32: i32,
    pub some_u32: u32,
    pub some_i64: i64,
    pub some_u64: u64,
    pub some_f32: f32,
    pub rows: Vec<Vec<i64>>,
    pub words: Vec<Vec<String>>,
    params: ParameterRegistry,
}

impl MockNumbers {
    pub fn new() -> Self {
        Self {
            some_i8: 0,
            some_u8: 0,
            some_i16: 0,
            some_u16: 0,
            some_i32: 0,
            some_u32: 0,
            some_i64: 0,
            some_u64: 0,
            some_f32: 0.0,
            rows: Vec::new(),
            words: Vec::new(),
            params: ParamsBuilder::<Self>::new("MockNumbers")
                .add("some_i8", |m| &m.some_i8, |m| &mut m.some_i8, P::empty())
                .add("some_u8", |m| &m.some_u8, |m| &mut m.some_u8, P::empty())
                .add("some_i16", |m| &m.some_i16, |m| &mut m.some_i16, P::empty())
                .add("some_u16", |m| &m.some_u16, |m| &mut m.some_u16, P::empty())
                .add("some_i32", |m| &m.some_i32, |m| &mut m.some_i32, P::empty())
                .add("some_u32", |m| &m.some_u32, |m| &mut m.some_u32, P::empty())
                .add("some_i64", |m| &m.some_i64, |m| &mut m.some_i64, P::empty())
                .add("some_u64", |m| &m.some_u64, |m| &mut m.some_u64, P::empty())
                .add("some_f32", |m| &m.some_f32, |m| &mut m.some_f32, P::HYPERPARAMETER)
                .add("rows", |m| &m.rows, |m| &mut m.rows, P::MODEL_STATE)
                .add("words", |m| &m.words, |m| &mut m.words, P::MODEL_STATE)
                .build(),
        }
    }

    pub fn filled() -> Self {
        Self {
            some_i8: i8::MIN,
            some_u8: u8::MAX,
            some_i16: i16::MIN,
            some_u16: u16::MAX,
            some_i32: -7,
            some_u32: u32::MAX,
            some_i64: i64::MIN,
            some_u64: u64::MAX,
            some_f32: 0.1,
            rows: vec![vec![1, -2, 3], Vec::new(), vec![i64::MAX]],
            words: vec![vec!["a b".to_owned(), String::new()], vec!["\"\\".to_owned()]],
            ..Self::new()
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("MockNumbers", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
    }
}

impl Object for MockNumbers {
    fn type_name(&self) -> &'static str {
        "MockNumbers"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }
}

// -----------------------------------------------------------------------------
// MockContainer

pub(crate) struct MockContainer {
    pub children: Vec<Option<ObjectRef>>,
    params: ParameterRegistry,
}

impl MockContainer {
    pub fn new(children: Vec<Option<ObjectRef>>) -> Self {
        Self {
            children,
            params: ParamsBuilder::<Self>::new("MockContainer")
                .add("children", |c| &c.children, |c| &mut c.children, P::MODEL_STATE)
                .build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("MockContainer", PrimitiveType::NotGeneric, || {
            ObjectRef::new(Self::new(Vec::new()))
        })
    }
}

impl Object for MockContainer {
    fn type_name(&self) -> &'static str {
        "MockContainer"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new(Vec::new())))
    }
}

// -----------------------------------------------------------------------------
// NoEmpty

/// Cannot create empty instances of itself, so it cannot be cloned.
pub(crate) struct NoEmpty {
    value: i32,
    params: ParameterRegistry,
}

impl NoEmpty {
    pub fn new() -> Self {
        Self {
            value: 1,
            params: ParamsBuilder::<Self>::new("NoEmpty")
                .add("value", |n| &n.value, |n| &mut n.value, P::empty())
                .build(),
        }
    }
}

impl Object for NoEmpty {
    fn type_name(&self) -> &'static str {
        "NoEmpty"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        None
    }
}

// -----------------------------------------------------------------------------
// ForgetfulHook

/// Overrides `pre_serialize` and `pre_deserialize` without chaining.
pub(crate) struct ForgetfulHook {
    value: i32,
    params: ParameterRegistry,
}

impl ForgetfulHook {
    pub fn new() -> Self {
        Self {
            value: 0,
            params: ParamsBuilder::<Self>::new("ForgetfulHook")
                .add("value", |f| &f.value, |f| &mut f.value, P::empty())
                .build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("ForgetfulHook", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
    }
}

impl Object for ForgetfulHook {
    fn type_name(&self) -> &'static str {
        "ForgetfulHook"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }

    fn pre_serialize(&mut self, _hook: &mut Hook) -> Result<()> {
        self.value += 1;
        Ok(())
    }

    fn pre_deserialize(&mut self, _hook: &mut Hook) -> Result<()> {
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Registry

/// A registry holding every mock class that can be created by name.
pub(crate) fn mock_registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    for entry in [
        MockObject::class_entry(),
        MockPart::class_entry(),
        MockNumbers::class_entry(),
        MockContainer::class_entry(),
        ForgetfulHook::class_entry(),
    ] {
        registry.register(entry).unwrap();
    }
    registry
}

// -----------------------------------------------------------------------------
// SharedBuffer

/// An in-memory sink that stays readable after being attached to a serializer.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    pub fn reader(&self) -> Box<dyn std::io::Read + Send> {
        Box::new(std::io::Cursor::new(self.bytes()))
    }
}

impl std::io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
