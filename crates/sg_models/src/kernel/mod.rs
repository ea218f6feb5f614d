//! Kernel functions.
//!
//! A kernel is an [`Object`](sg_reflect::Object) implementing [`Kernel`],
//! registered with that capability so it can be created with
//! [`kernel`](crate::kernel()) and found inside machines.

// -----------------------------------------------------------------------------
// Modules

mod gaussian;
mod linear;
mod polynomial;

// -----------------------------------------------------------------------------
// Exports

pub use gaussian::GaussianKernel;
pub use linear::LinearKernel;
pub use polynomial::PolynomialKernel;

// -----------------------------------------------------------------------------
// Kernel

use sg_reflect::cast;
use sg_reflect::object::Cast;
use sg_reflect::value::Matrix;

/// A similarity between two feature vectors of equal length.
pub trait Kernel: Send + Sync {
    fn compute(&self, a: &[f64], b: &[f64]) -> f64;

    /// Kernel values between every column of `lhs` and every column of `rhs`.
    fn gram(&self, lhs: &Matrix<f64>, rhs: &Matrix<f64>) -> Matrix<f64> {
        let mut gram = Matrix::new(lhs.cols(), rhs.cols());
        for j in 0..rhs.cols() {
            for i in 0..lhs.cols() {
                gram[(i, j)] = self.compute(lhs.column(i), rhs.column(j));
            }
        }
        gram
    }
}

pub(crate) const KERNELS: &[Cast<dyn Kernel>] = &[
    cast!(GaussianKernel => Kernel),
    cast!(LinearKernel => Kernel),
    cast!(PolynomialKernel => Kernel),
];

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// -----------------------------------------------------------------------------
// Tests
