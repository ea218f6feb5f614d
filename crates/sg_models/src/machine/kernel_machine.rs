use sg_reflect::object::{Object, ObjectRef};
use sg_reflect::param::{ParameterProperties as P, ParameterRegistry, ParamsBuilder};
use sg_reflect::registry::ClassEntry;
use sg_reflect::value::{Matrix, PrimitiveType};
use sg_reflect::{cast, register_class};

use super::{Machine, ProblemType, check_features, check_labels, component};
use crate::capability::view;
use crate::error::{ModelError, Result};
use crate::kernel::KERNELS;

/// Kernel ridge regression.
///
/// Training solves `(K + alpha I) w = y` for the weights `w`, where `K` is the
/// kernel matrix of the training vectors. The output for `x` is
/// `sum_i w_i k(x_i, x)`, or its sign when the machine is a
/// [`classifier`](Self::classifier).
pub struct KernelMachine {
    pub alpha: f64,
    pub kernel: Option<ObjectRef>,
    pub classify: bool,
    pub support: Matrix<f64>,
    pub weights: Vec<f64>,
    params: ParameterRegistry,
}

impl Default for KernelMachine {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            kernel: None,
            classify: false,
            support: Matrix::default(),
            weights: Vec::new(),
            params: ParamsBuilder::<Self>::new("KernelMachine")
                .add("alpha", |m| &m.alpha, |m| &mut m.alpha, P::HYPERPARAMETER)
                .describe("Ridge regularization")
                .add("kernel", |m| &m.kernel, |m| &mut m.kernel, P::MODEL_STATE)
                .add("classify", |m| &m.classify, |m| &mut m.classify, P::SETTING)
                .describe("Predict the sign of the regression")
                .add("support", |m| &m.support, |m| &mut m.support, P::MODEL_STATE)
                .add("weights", |m| &m.weights, |m| &mut m.weights, P::MODEL_STATE)
                .build(),
        }
    }
}

impl KernelMachine {
    pub fn new(alpha: f64, kernel: ObjectRef) -> Self {
        Self {
            alpha,
            kernel: Some(kernel),
            ..Self::default()
        }
    }

    /// Turns the machine into a binary classifier.
    pub fn classifier(mut self) -> Self {
        self.classify = true;
        self
    }

    pub fn class_entry() -> ClassEntry {
        ClassEntry::new("KernelMachine", PrimitiveType::NotGeneric, || ObjectRef::new(Self::default()))
            .with_cast(cast!(KernelMachine => Machine))
    }

    fn kernel(&self) -> Result<&ObjectRef> {
        component(&self.kernel, "KernelMachine", "kernel")
    }
}

impl Machine for KernelMachine {
    fn problem_type(&self) -> ProblemType {
        if self.classify {
            ProblemType::BinaryClassifier
        } else {
            ProblemType::Regressor
        }
    }

    fn train(&mut self, data: &Matrix<f64>, labels: &[f64]) -> Result<()> {
        check_labels(data, labels)?;
        let mut gram = view(self.kernel()?, KERNELS)?.with(|k| k.gram(data, data))?;
        for i in 0..gram.rows() {
            gram[(i, i)] += self.alpha;
        }
        self.weights = solve(gram, labels.to_vec())?;
        self.support = data.clone();
        Ok(())
    }

    fn apply(&self, data: &Matrix<f64>) -> Result<Vec<f64>> {
        if self.weights.is_empty() {
            return Err(ModelError::NotTrained {
                type_name: "KernelMachine",
            });
        }
        check_features(self.support.rows(), data)?;
        let gram = view(self.kernel()?, KERNELS)?.with(|k| k.gram(&self.support, data))?;

        let outputs = (0..data.cols()).map(|col| {
            let score: f64 = gram.column(col).iter().zip(&self.weights).map(|(k, w)| k * w).sum();
            match self.classify {
                true if score >= 0.0 => 1.0,
                true => -1.0,
                false => score,
            }
        });
        Ok(outputs.collect())
    }
}

/// Solves `a x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Matrix<f64>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[(i, col)].abs().total_cmp(&a[(j, col)].abs()))
            .unwrap_or(col);
        if a[(pivot, col)].abs() < 1e-12 {
            return Err(ModelError::Singular);
        }
        if pivot != col {
            for k in col..n {
                let tmp = a[(col, k)];
                a[(col, k)] = a[(pivot, k)];
                a[(pivot, k)] = tmp;
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[(row, col)] / a[(col, col)];
            for k in col..n {
                let delta = factor * a[(col, k)];
                a[(row, k)] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let sum: f64 = (row + 1..n).map(|k| a[(row, k)] * x[k]).sum();
        x[row] = (b[row] - sum) / a[(row, row)];
    }
    Ok(x)
}

impl Object for KernelMachine {
    fn type_name(&self) -> &'static str {
        "KernelMachine"
    }

    fn parameters(&self) -> &ParameterRegistry {
        &self.params
    }

    fn create_empty(&self) -> Option<ObjectRef> {
        Some(ObjectRef::new(Self::default()))
    }

    fn implements(&self) -> Option<&'static str> {
        Some(self.problem_type().as_str())
    }
}

register_class!(KernelMachine::class_entry);
