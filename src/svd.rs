//! Truncated SVD by power iteration with deflation.
//!
//! Given a matrix $A\in\mathbb{R}^{m\times n}$ the engine works on the Gram matrix
//! $B = A^TA$. It repeatedly extracts the dominant eigenpair $(v, \lambda)$ of the
//! current $B$ by power iteration, records the singular triple
//! $(\sigma, u, v) = (\sqrt{\lambda}, Av/\sigma, v)$ and deflates $B$ so that the next
//! pass finds the next component. The loop stops once $\lambda < \epsilon^2$, once
//! $B$ is numerically zero or once `max_rank` triples were found.
//!
//! Power iteration starts from a random vector and is not orthogonalised against
//! previous components beyond the deflation step. For clustered singular values a
//! fixed number of iterations may not converge, so repeated runs on the same input
//! can return different ranks. [`Deflation::Projected`] limits the damage by
//! keeping the right singular vectors orthogonal.
//!
//! On matrices with many clustered singular values, such as the 3D grid
//! matrices of [`grid_3d_matrix`](crate::random_matrix::grid_3d_matrix), the
//! default [`Deflation::Hotelling`] leaves relative errors around $10^{-4}$ that
//! do not decrease with `max_rank`. Compression and product errors that shrink
//! with the rank bound on such inputs require [`Deflation::Projected`].

use crate::dense::{gram, is_numerically_zero, l2_norm};
use crate::params::{CompressionParams, Deflation};
use crate::random_matrix::RandomMatrix;
use crate::types::{RealScalar, Result};
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
use rand::Rng;

pub struct SVDData<A: RealScalar> {
    /// The U matrix, one left singular vector per column
    pub u: Array2<A>,
    /// The array of singular values
    pub s: Array1<A>,
    /// The vt matrix, one right singular vector per row
    pub vt: Array2<A>,
}

impl<A: RealScalar> SVDData<A> {
    /// An empty decomposition of an (m, n) matrix.
    pub fn empty(dimension: (usize, usize)) -> Self {
        SVDData {
            u: Array2::zeros((dimension.0, 0)),
            s: Array1::zeros(0),
            vt: Array2::zeros((0, dimension.1)),
        }
    }

    pub fn nrows(&self) -> usize {
        self.u.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.vt.ncols()
    }

    /// Number of singular triples.
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// Smallest retained singular value.
    pub fn min_singular_value(&self) -> Option<A> {
        self.s.iter().copied().fold(None, |acc, item| match acc {
            Some(current) if current <= item => Some(current),
            _ => Some(item),
        })
    }

    /// Split into two factors `(u, diag(s) * vt)` whose product approximates the matrix.
    pub fn into_factors(self) -> (Array2<A>, Array2<A>) {
        let (u, s, mut vt) = (self.u, self.s, self.vt);
        Zip::from(vt.axis_iter_mut(Axis(0)))
            .and(s.view())
            .for_each(|mut row, &sigma| row.map_inplace(|item| *item = *item * sigma));
        (u, vt)
    }

    /// Convert the decomposition back to a matrix.
    pub fn to_mat(&self) -> Array2<A> {
        if self.rank() == 0 {
            return Array2::zeros((self.nrows(), self.ncols()));
        }
        let scaled_vt = Array2::from_shape_fn(self.vt.dim(), |(i, j)| self.s[i] * self.vt[[i, j]]);
        self.u.dot(&scaled_vt)
    }
}

pub trait TruncatedSVD {
    type A: RealScalar;

    /// Compute up to `params.max_rank` dominant singular triples.
    fn truncated_svd<R: Rng>(
        &self,
        params: &CompressionParams,
        rng: &mut R,
    ) -> Result<SVDData<Self::A>>;
}

impl<A, S> TruncatedSVD for ArrayBase<S, Ix2>
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    type A = A;

    fn truncated_svd<R: Rng>(&self, params: &CompressionParams, rng: &mut R) -> Result<SVDData<A>> {
        truncated_svd(self, params, rng)
    }
}

/// Dominant eigenpair of a symmetric positive semi-definite matrix.
///
/// Runs `iterations` steps of the power method from a random unit vector. If an
/// iterate is mapped to zero the iteration stops early with the current vector.
/// The eigenvalue is the Rayleigh quotient of the returned vector.
pub fn power_iteration<A, S, R>(mat: &ArrayBase<S, Ix2>, iterations: usize, rng: &mut R) -> (Array1<A>, A)
where
    A: RealScalar,
    S: Data<Elem = A>,
    R: Rng,
{
    let mut vec = A::random_unit_vector(mat.ncols(), rng);

    for _ in 0..iterations {
        let next = mat.dot(&vec);
        let norm = l2_norm(&next);
        if norm == A::zero() {
            break;
        }
        vec = next.mapv(|item| item / norm);
    }

    let mat_vec = mat.dot(&vec);
    let denom = vec.dot(&vec);
    let eigenvalue = if denom == A::zero() {
        A::zero()
    } else {
        vec.dot(&mat_vec) / denom
    };

    (vec, eigenvalue)
}

/// Truncated SVD of `mat`, see the module documentation.
pub fn truncated_svd<A, S, R>(
    mat: &ArrayBase<S, Ix2>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<SVDData<A>>
where
    A: RealScalar,
    S: Data<Elem = A>,
    R: Rng,
{
    params.validate()?;

    let (m, n) = mat.dim();
    if m == 0 || n == 0 {
        return Ok(SVDData::empty((m, n)));
    }

    let epsilon = A::from_f64(params.epsilon);
    let max_rank = params.max_rank;

    let mut b = gram(mat);
    let mut u = Array2::<A>::zeros((m, max_rank));
    let mut vt = Array2::<A>::zeros((max_rank, n));
    let mut singular_values = Vec::<A>::with_capacity(max_rank);

    for index in 0..max_rank {
        let (v, lambda) = power_iteration(&b, params.power_iterations, rng);

        if lambda < epsilon * epsilon {
            log::trace!("svd: component {} below tolerance, lambda = {:e}", index, lambda);
            break;
        }

        let sigma = lambda.sqrt();
        let left = mat.dot(&v);
        if sigma != A::zero() {
            u.column_mut(index).assign(&left.mapv(|item| item / sigma));
        }
        vt.row_mut(index).assign(&v);
        singular_values.push(sigma);

        log::trace!("svd: component {} with sigma = {:e}", index, sigma);

        deflate(&mut b, &v, lambda, params.deflation);

        if is_numerically_zero(&b, epsilon) {
            log::trace!("svd: Gram matrix exhausted after {} components", index + 1);
            break;
        }
    }

    let rank = singular_values.len();

    Ok(SVDData {
        u: u.slice_move(s![.., 0..rank]),
        s: Array1::from(singular_values),
        vt: vt.slice_move(s![0..rank, ..]),
    })
}

fn outer<A, S1, S2>(first: &ArrayBase<S1, Ix1>, second: &ArrayBase<S2, Ix1>) -> Array2<A>
where
    A: RealScalar,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    Array2::from_shape_fn((first.len(), second.len()), |(i, j)| first[i] * second[j])
}

fn deflate<A: RealScalar>(b: &mut Array2<A>, v: &Array1<A>, lambda: A, deflation: Deflation) {
    match deflation {
        Deflation::Hotelling => b.scaled_add(-lambda, &outer(v, v)),
        Deflation::Projected => {
            // (I - vv^T) B (I - vv^T) = B - v w^T - w v^T + (v^T w) v v^T with w = B v
            let w = b.dot(v);
            let curvature = v.dot(&w);
            b.scaled_add(-A::one(), &outer(v, &w));
            b.scaled_add(-A::one(), &outer(&w, v));
            b.scaled_add(curvature, &outer(v, v));
        }
    }
}
