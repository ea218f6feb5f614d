//! Typed construction by class name.

use sg_reflect::object::TypedRef;
use sg_reflect::registry::{ClassEntry, ClassRegistry, bootstrap};
use sg_reflect::value::{FloatMax, PrimitiveType};

use crate::features::{DenseFeatures, Features, SparseFeatures};
use crate::kernel::{GaussianKernel, Kernel, LinearKernel, PolynomialKernel};
use crate::labels::{BinaryLabels, Labels, MulticlassLabels, RegressionLabels};
use crate::machine::{BaggingMachine, KernelMachine, Machine, NearestCentroid, Pipeline};
use crate::transformer::{MeanCentering, Transformer};

/// Every class of this crate, one entry per specialization.
pub fn entries() -> Vec<ClassEntry> {
    vec![
        GaussianKernel::class_entry(),
        LinearKernel::class_entry(),
        PolynomialKernel::class_entry(),
        DenseFeatures::<u8>::class_entry(),
        DenseFeatures::<u16>::class_entry(),
        DenseFeatures::<f32>::class_entry(),
        DenseFeatures::<f64>::class_entry(),
        DenseFeatures::<FloatMax>::class_entry(),
        SparseFeatures::<f32>::class_entry(),
        SparseFeatures::<f64>::class_entry(),
        BinaryLabels::class_entry(),
        MulticlassLabels::class_entry(),
        RegressionLabels::class_entry(),
        MeanCentering::class_entry(),
        KernelMachine::class_entry(),
        NearestCentroid::class_entry(),
        BaggingMachine::class_entry(),
        Pipeline::class_entry(),
    ]
}

/// Adds every class of this crate to `registry`.
///
/// Needed only without the `auto_register` feature, or for registries other
/// than the process-wide one.
pub fn register_all(registry: &mut ClassRegistry) -> sg_reflect::Result<()> {
    entries().into_iter().try_for_each(|entry| registry.register(entry))
}

/// A new kernel of class `name`.
///
/// # Errors
///
/// [`ClassNotFound`](sg_reflect::Error::ClassNotFound) for an unknown name,
/// [`TypeMismatch`](sg_reflect::Error::TypeMismatch) for a class that is not
/// a kernel.
pub fn kernel(name: &str) -> sg_reflect::Result<TypedRef<dyn Kernel>> {
    bootstrap()?.create_typed(name, PrimitiveType::NotGeneric)
}

pub fn machine(name: &str) -> sg_reflect::Result<TypedRef<dyn Machine>> {
    bootstrap()?.create_typed(name, PrimitiveType::NotGeneric)
}

/// A new features object of class `name` specialized for `primitive_type`.
pub fn features(name: &str, primitive_type: PrimitiveType) -> sg_reflect::Result<TypedRef<dyn Features>> {
    bootstrap()?.create_typed(name, primitive_type)
}

pub fn labels(name: &str) -> sg_reflect::Result<TypedRef<dyn Labels>> {
    bootstrap()?.create_typed(name, PrimitiveType::NotGeneric)
}

pub fn transformer(name: &str) -> sg_reflect::Result<TypedRef<dyn Transformer>> {
    bootstrap()?.create_typed(name, PrimitiveType::NotGeneric)
}

// -----------------------------------------------------------------------------
// Tests
