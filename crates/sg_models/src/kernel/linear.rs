use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::param::{ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::PrimitiveType;
use sg_reflect::{cast, register_class};

use super::{Kernel, dot};

/// `k(a, b) = a · b`. Has no parameters.
pub struct LinearKernel {
    params: ParameterRegistry,
}

impl Default for LinearKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearKernel {
    pub fn new() -> Self {
        Self {
            params: ParamsBuilder::<Self>::new("LinearKernel").build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("LinearKernel", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
            .with_cast(cast!(LinearKernel => Kernel))
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, a: &[f64], b: &[f64]) -> f64 {
        dot(a, b)
    }
}

impl Object for LinearKernel {
    fn type_name(&self) -> &'static str {
        "LinearKernel"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }
}

register_class!(LinearKernel::class_entry);
