//! Shape-checked dense matrix primitives.
//!
//! Quadrant extraction and assembly work on `ndarray` views directly. The
//! factor arithmetic of the leaf operations goes through the functions in this
//! module, which validate the shapes of their arguments and return [`HMatrixError::DimensionMismatch`](crate::types::HMatrixError) instead
//! of panicking, so that a shape error deep inside a recursion surfaces as an
//! error of the public operation.

use crate::types::{dimension_mismatch, RealScalar, Result};
use ndarray::{concatenate, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix1, Ix2};

/// Concatenate two matrices side by side, `[first | second]`.
pub fn hstack<'a, A: RealScalar>(
    first: ArrayView2<'a, A>,
    second: ArrayView2<'a, A>,
) -> Result<Array2<A>> {
    concatenate(Axis(1), &[first, second])
        .map_err(|_| dimension_mismatch("hstack", first.dim(), second.dim()))
}

/// Stack two matrices on top of each other, `[first; second]`.
pub fn vstack<'a, A: RealScalar>(
    first: ArrayView2<'a, A>,
    second: ArrayView2<'a, A>,
) -> Result<Array2<A>> {
    concatenate(Axis(0), &[first, second])
        .map_err(|_| dimension_mismatch("vstack", first.dim(), second.dim()))
}

/// Matrix product `first * second`.
pub fn dot<A, S1, S2>(first: &ArrayBase<S1, Ix2>, second: &ArrayBase<S2, Ix2>) -> Result<Array2<A>>
where
    A: RealScalar,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    if first.ncols() != second.nrows() {
        return Err(dimension_mismatch(
            "dot",
            (first.ncols(), "_"),
            (second.nrows(), second.ncols()),
        ));
    }
    Ok(first.dot(second))
}

/// Matrix-vector product `mat * vec`.
pub fn matvec<A, S1, S2>(mat: &ArrayBase<S1, Ix2>, vec: &ArrayBase<S2, Ix1>) -> Result<Array1<A>>
where
    A: RealScalar,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    if mat.ncols() != vec.len() {
        return Err(dimension_mismatch("matvec", mat.ncols(), vec.len()));
    }
    Ok(mat.dot(vec))
}

/// The Gram matrix `mat^T * mat`.
pub fn gram<A, S>(mat: &ArrayBase<S, Ix2>) -> Array2<A>
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    mat.t().dot(mat)
}

/// Frobenius norm of a matrix.
pub fn frobenius_norm<A, S>(mat: &ArrayBase<S, Ix2>) -> A
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    mat.mapv(|item| item * item).sum().sqrt()
}

/// Euclidean norm of a vector.
pub fn l2_norm<A, S>(vec: &ArrayBase<S, Ix1>) -> A
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    vec.dot(vec).sqrt()
}

/// True if no entry of `mat` exceeds `tol` in absolute value.
pub fn is_numerically_zero<A, S>(mat: &ArrayBase<S, Ix2>, tol: A) -> bool
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    mat.iter().all(|&item| item.abs() <= tol)
}
