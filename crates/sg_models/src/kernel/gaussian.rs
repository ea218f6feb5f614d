use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::PrimitiveType;
use sg_reflect::{cast, register_class};

use super::Kernel;

/// `k(a, b) = exp(-|a - b|² / width)`.
pub struct GaussianKernel {
    pub width: f64,
    /// Kernel cache size in MB.
    pub cache_size: i32,
    params: ParameterRegistry,
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl GaussianKernel {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            cache_size: 10,
            params: ParamsBuilder::<Self>::new("GaussianKernel")
                .add("width", |k| &k.width, |k| &mut k.width, P::HYPERPARAMETER | P::GRADIENT_ENABLED)
                .describe("Kernel width")
                .add("cache_size", |k| &k.cache_size, |k| &mut k.cache_size, P::SETTING)
                .describe("Cache size in MB")
                .build(),
        }
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("GaussianKernel", PrimitiveType::NotGeneric, || ObjectRef::new(Self::default()))
            .with_cast(cast!(GaussianKernel => Kernel))
    }
}

impl Kernel for GaussianKernel {
    fn compute(&self, a: &[f64], b: &[f64]) -> f64 {
        let distance: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
        (-distance / self.width).exp()
    }
}

impl Object for GaussianKernel {
    fn type_name(&self) -> &'static str {
        "GaussianKernel"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::default()))
    }
}

register_class!(GaussianKernel::class_entry);
