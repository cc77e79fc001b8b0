//! This module collects the basic types and trait definitions

use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};
use num::Float;
use rand_distr::uniform::SampleUniform;
use std::fmt::{Debug, Display, LowerExp};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HMatrixError {
    #[error("Dimension mismatch in `{operation}`: expected {expected}, found {found}")]
    DimensionMismatch {
        operation: &'static str,
        expected: String,
        found: String,
    },
    #[error("Invalid block structure: {0}")]
    InvalidStructure(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, HMatrixError>;

/// Build a `DimensionMismatch` error from two displayable shapes.
pub(crate) fn dimension_mismatch<E: Debug, F: Debug>(
    operation: &'static str,
    expected: E,
    found: F,
) -> HMatrixError {
    HMatrixError::DimensionMismatch {
        operation,
        expected: format!("{:?}", expected),
        found: format!("{:?}", found),
    }
}

/// Real floating point types the H-matrix routines operate on.
pub trait RealScalar:
    Float
    + ndarray::LinalgScalar
    + ndarray::ScalarOperand
    + SampleUniform
    + Debug
    + Display
    + LowerExp
    + Send
    + Sync
{
    /// Convert a tuning parameter given in double precision.
    fn from_f64(value: f64) -> Self;

    /// Widen to double precision for reporting.
    fn as_f64(self) -> f64;
}

macro_rules! real_scalar_impl {
    ($scalar:ty) => {
        impl RealScalar for $scalar {
            fn from_f64(value: f64) -> Self {
                value as $scalar
            }

            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

real_scalar_impl!(f32);
real_scalar_impl!(f64);

/// Matrix-Vector Product Trait
///
/// This trait defines an interface for operators that provide matrix-vector products.
pub trait MatVec {
    type A: RealScalar;

    /// Number of rows of the operator.
    fn nrows(&self) -> usize;

    /// Number of columns of the operator.
    fn ncols(&self) -> usize;

    /// Apply the operator to `vec`. Fails if the length of `vec` differs from
    /// the number of columns.
    fn matvec(&self, vec: ArrayView1<Self::A>) -> Result<Array1<Self::A>>;
}

impl<A, S> MatVec for ArrayBase<S, Ix2>
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    type A = A;

    fn nrows(&self) -> usize {
        self.nrows()
    }

    fn ncols(&self) -> usize {
        self.ncols()
    }

    fn matvec(&self, vec: ArrayView1<Self::A>) -> Result<Array1<Self::A>> {
        crate::dense::matvec(self, &vec)
    }
}
