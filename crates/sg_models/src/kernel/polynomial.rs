use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::PrimitiveType;
use sg_reflect::{cast, register_class};

use super::{Kernel, dot};

/// `k(a, b) = (a · b + c)^degree`.
pub struct PolynomialKernel {
    pub degree: i32,
    pub c: f64,
    params: ParameterRegistry,
}

impl Default for PolynomialKernel {
    fn default() -> Self {
        Self::new(2, 1.0)
    }
}

impl PolynomialKernel {
    pub fn new(degree: i32, c: f64) -> Self {
        Self {
            degree,
            c,
            params: ParamsBuilder::<Self>::new("PolynomialKernel")
                .add("degree", |k| &k.degree, |k| &mut k.degree, P::HYPERPARAMETER)
                .add("c", |k| &k.c, |k| &mut k.c, P::HYPERPARAMETER)
                .describe("Inhomogeneous offset")
                .build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("PolynomialKernel", PrimitiveType::NotGeneric, || {
            ObjectRef::new(Self::default())
        })
        .with_cast(cast!(PolynomialKernel => Kernel))
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, a: &[f64], b: &[f64]) -> f64 {
        (dot(a, b) + self.c).powi(self.degree)
    }
}

impl Object for PolynomialKernel {
    fn type_name(&self) -> &'static str {
        "PolynomialKernel"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::default()))
    }
}

register_class!(PolynomialKernel::class_entry);
