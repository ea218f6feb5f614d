use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::ops::clone_object;
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{Matrix, PrimitiveType};
use sg_reflect::{cast, register_class};

use super::{MACHINES, Machine, ProblemType, check_labels, component};
use crate::capability::view;
use crate::error::{ModelError, Result};

/// Bootstrap aggregation.
///
/// Training clones the prototype `machine` once per bag and trains each clone
/// on `bag_size` vectors drawn with replacement. Regression outputs are
/// averaged; classifier outputs go to a majority vote, ties going to the
/// smallest label.
///
/// The prototype is a shared parameter: cloning a `BaggingMachine` keeps
/// pointing at the same prototype, while the trained bags are copied.
pub struct BaggingMachine {
    pub machine: Option<ObjectRef>,
    pub bags: Vec<Option<ObjectRef>>,
    pub num_bags: i32,
    /// Vectors per bag, `0` for the size of the training set.
    pub bag_size: i32,
    pub seed: u64,
    params: ParameterRegistry,
}

impl Default for BaggingMachine {
    fn default() -> Self {
        Self {
            machine: None,
            bags: Vec::new(),
            num_bags: 10,
            bag_size: 0,
            seed: 0,
            params: ParamsBuilder::<Self>::new("BaggingMachine")
                .add_shared("machine", |m| &m.machine, |m| &mut m.machine, P::SETTING)
                .describe("Prototype of every bag")
                .add("bags", |m| &m.bags, |m| &mut m.bags, P::MODEL_STATE)
                .add("num_bags", |m| &m.num_bags, |m| &mut m.num_bags, P::HYPERPARAMETER)
                .add("bag_size", |m| &m.bag_size, |m| &mut m.bag_size, P::HYPERPARAMETER)
                .add("seed", |m| &m.seed, |m| &mut m.seed, P::SETTING)
                .build(),
        }
    }
}

impl BaggingMachine {
    pub fn new(machine: ObjectRef, num_bags: i32) -> Self {
        Self {
            machine: Some(machine),
            num_bags,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("BaggingMachine", PrimitiveType::NotGeneric, || ObjectRef::new(Self::default()))
            .with_cast(cast!(BaggingMachine => Machine))
    }
}

impl Machine for BaggingMachine {
    /// The task of the prototype, [`ProblemType::Regressor`] without one.
    fn problem_type(&self) -> ProblemType {
        self.machine
            .as_ref()
            .and_then(|machine| view(machine, MACHINES).ok())
            .and_then(|machine| machine.with(|m| m.problem_type()).ok())
            .unwrap_or(ProblemType::Regressor)
    }

    fn train(&mut self, data: &Matrix<f64>, labels: &[f64]) -> Result<()> {
        check_labels(data, labels)?;
        let prototype = component(&self.machine, "BaggingMachine", "machine")?.clone();
        let n = data.cols();
        let bag_size = usize::try_from(self.bag_size).ok().filter(|&size| size > 0).unwrap_or(n);
        let mut rng = fastrand::Rng::with_seed(self.seed);

        let mut bags = Vec::new();
        for _ in 0..self.num_bags.max(0) {
            let indices: Vec<usize> = (0..bag_size).map(|_| rng.usize(..n)).collect();
            let mut sample = Matrix::new(data.rows(), bag_size);
            for (col, &index) in indices.iter().enumerate() {
                for (row, value) in data.column(index).iter().enumerate() {
                    sample[(row, col)] = *value;
                }
            }
            let sample_labels: Vec<f64> = indices.iter().map(|&index| labels[index]).collect();

            let bag = clone_object(&prototype)?;
            view(&bag, MACHINES)?.with_mut(|m| m.train(&sample, &sample_labels))??;
            bags.push(Some(bag));
        }
        log::debug!("trained {} bags of {bag_size} vectors", bags.len());
        self.bags = bags;
        Ok(())
    }

    fn apply(&self, data: &Matrix<f64>) -> Result<Vec<f64>> {
        if self.bags.is_empty() {
            return Err(ModelError::NotTrained {
                type_name: "BaggingMachine",
            });
        }
        let outputs = self
            .bags
            .iter()
            .map(|bag| {
                let bag = component(bag, "BaggingMachine", "bag")?;
                view(bag, MACHINES)?.with(|m| m.apply(data))?
            })
            .collect::<Result<Vec<_>>>()?;

        let combine: fn(&[f64]) -> f64 = match self.problem_type() {
            ProblemType::Regressor => mean,
            ProblemType::BinaryClassifier | ProblemType::MulticlassClassifier => majority,
        };
        let mut votes = Vec::with_capacity(outputs.len());
        let combined = (0..data.cols()).map(|col| {
            votes.clear();
            votes.extend(outputs.iter().map(|output| output[col]));
            combine(&votes)
        });
        Ok(combined.collect())
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn majority(values: &[f64]) -> f64 {
    let mut tally: Vec<(f64, usize)> = Vec::new();
    for &value in values {
        match tally.iter_mut().find(|(label, _)| *label == value) {
            Some((_, count)) => *count += 1,
            None => tally.push((value, 1)),
        }
    }
    tally
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.total_cmp(&a.0)))
        .map_or(f64::NAN, |(label, _)| label)
}

impl Object for BaggingMachine {
    fn type_name(&self) -> &'static str {
        "BaggingMachine"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::default()))
    }
}

register_class!(BaggingMachine::class_entry);
