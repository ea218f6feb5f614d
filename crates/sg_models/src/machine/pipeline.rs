use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{Matrix, PrimitiveType};
use sg_reflect::{cast, register_class};

use super::{MACHINES, Machine, ProblemType, component};
use crate::capability::view;
use crate::error::Result;
use crate::transformer::TRANSFORMERS;

/// Transformers applied in order, followed by a machine.
pub struct Pipeline {
    pub transformers: Vec<Option<ObjectRef>>,
    pub machine: Option<ObjectRef>,
    params: ParameterRegistry,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            transformers: Vec::new(),
            machine: None,
            params: ParamsBuilder::<Self>::new("Pipeline")
                .add("transformers", |p| &p.transformers, |p| &mut p.transformers, P::MODEL_STATE)
                .add("machine", |p| &p.machine, |p| &mut p.machine, P::MODEL_STATE)
                .build(),
        }
    }

    /// Appends a transformer stage.
    pub fn then(mut self, transformer: ObjectRef) -> Self {
        self.transformers.push(Some(transformer));
        self
    }

    /// Sets the final machine.
    pub fn over(mut self, machine: ObjectRef) -> Self {
        self.machine = Some(machine);
        self
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("Pipeline", PrimitiveType::NotGeneric, || ObjectRef::new(Self::new()))
            .with_cast(cast!(Pipeline => Machine))
    }

    fn machine(&self) -> Result<&ObjectRef> {
        component(&self.machine, "Pipeline", "machine")
    }

    fn transform(&self, data: &Matrix<f64>) -> Result<Matrix<f64>> {
        let mut data = data.clone();
        for stage in &self.transformers {
            let stage = component(stage, "Pipeline", "transformer")?;
            data = view(stage, TRANSFORMERS)?.with(|t| t.transform(&data))??;
        }
        Ok(data)
    }
}

impl Machine for Pipeline {
    /// The task of the final machine, [`ProblemType::Regressor`] without one.
    fn problem_type(&self) -> ProblemType {
        self.machine
            .as_ref()
            .and_then(|machine| view(machine, MACHINES).ok())
            .and_then(|machine| machine.with(|m| m.problem_type()).ok())
            .unwrap_or(ProblemType::Regressor)
    }

    fn train(&mut self, data: &Matrix<f64>, labels: &[f64]) -> Result<()> {
        let machine = self.machine()?;
        let mut data = data.clone();
        for stage in &self.transformers {
            let stage = component(stage, "Pipeline", "transformer")?;
            data = view(stage, TRANSFORMERS)?.with_mut(|t| -> Result<Matrix<f64>> {
                t.fit(&data)?;
                t.transform(&data)
            })??;
        }
        view(machine, MACHINES)?.with_mut(|m| m.train(&data, labels))?
    }

    fn apply(&self, data: &Matrix<f64>) -> Result<Vec<f64>> {
        let machine = self.machine()?;
        let data = self.transform(data)?;
        view(machine, MACHINES)?.with(|m| m.apply(&data))?
    }
}

impl Object for Pipeline {
    fn type_name(&self) -> &'static str {
        "Pipeline"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::new()))
    }
}

register_class!(Pipeline::class_entry);
