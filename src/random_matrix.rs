//! Generation of random vectors and test matrices

use crate::types::RealScalar;
use ndarray::{Array1, Array2};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

pub trait RandomMatrix
where
    Self: RealScalar,
{
    /// Generate a random Gaussian matrix.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut mat = Array2::<Self>::zeros(dimension);
        mat.map_inplace(|item| *item = Self::from_f64(normal.sample(rng)));
        mat
    }

    /// Generate a matrix with entries uniformly distributed in (0, 1).
    fn random_uniform<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self> {
        let dist = Uniform::new(Self::from_f64(1E-8), Self::one());
        let mut mat = Array2::<Self>::zeros(dimension);
        mat.map_inplace(|item| *item = dist.sample(rng));
        mat
    }

    /// Generate a random vector of unit length with non-negative entries.
    ///
    /// The entries are drawn uniformly from [0, 1) and normalised. For `n = 0`
    /// the empty vector is returned.
    fn random_unit_vector<R: Rng>(n: usize, rng: &mut R) -> Array1<Self> {
        let dist = Uniform::new(Self::zero(), Self::one());
        let mut vec = Array1::<Self>::from_shape_fn(n, |_| dist.sample(rng));
        let norm = crate::dense::l2_norm(&vec);
        if norm > Self::zero() {
            vec.mapv_inplace(|item| item / norm);
        } else if n > 0 {
            vec.fill(Self::one() / Self::from_f64(n as f64).sqrt());
        }
        vec
    }

    /// Generate a random matrix of exact rank `rank`.
    ///
    /// The matrix is the product of two Gaussian factors of
    /// shape (m, rank) and (rank, n).
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rank`: The rank of the generated matrix.
    /// * `rng`: The random number generator to use.
    fn random_low_rank_matrix<R: Rng>(
        dimension: (usize, usize),
        rank: usize,
        rng: &mut R,
    ) -> Array2<Self> {
        let u = Self::random_gaussian((dimension.0, rank), rng);
        let v = Self::random_gaussian((rank, dimension.1), rng);
        u.dot(&v)
    }
}

impl<T: RealScalar> RandomMatrix for T {}

/// Weighted adjacency matrix of a 3D grid with a dominant diagonal.
///
/// The grid has `2^k` vertices per side, so the matrix is of size $n\times n$
/// with $n = 2^{3k}$. Vertex `(x, y, z)` has index `x * g^2 + y * g + z`
/// with `g = 2^k`. Each vertex is linked to its (up to) six axis neighbours with
/// a weight drawn uniformly from [1, 10). The diagonal entry is the sum of the
/// absolute off-diagonal weights of the row plus another draw from [1, 10).
pub fn grid_3d_matrix<T: RealScalar, R: Rng>(k: u32, rng: &mut R) -> Array2<T> {
    let grid_size = 1usize << k;
    let n = grid_size * grid_size * grid_size;
    let weights = Uniform::new(T::one(), T::from_f64(10.0));

    let to_index = |x: usize, y: usize, z: usize| x * grid_size * grid_size + y * grid_size + z;

    let mut mat = Array2::<T>::zeros((n, n));

    for row in 0..n {
        let x = row / (grid_size * grid_size);
        let y = (row / grid_size) % grid_size;
        let z = row % grid_size;

        let neighbours = [
            (x.checked_sub(1), Some(y), Some(z)),
            (Some(x + 1), Some(y), Some(z)),
            (Some(x), y.checked_sub(1), Some(z)),
            (Some(x), Some(y + 1), Some(z)),
            (Some(x), Some(y), z.checked_sub(1)),
            (Some(x), Some(y), Some(z + 1)),
        ];

        for neighbour in neighbours.iter() {
            if let (Some(nx), Some(ny), Some(nz)) = *neighbour {
                if nx < grid_size && ny < grid_size && nz < grid_size {
                    mat[[row, to_index(nx, ny, nz)]] = weights.sample(rng);
                }
            }
        }

        let off_diagonal = mat
            .row(row)
            .iter()
            .enumerate()
            .filter(|&(col, _)| col != row)
            .fold(T::zero(), |acc, (_, &item)| acc + item.abs());
        mat[[row, row]] = off_diagonal + weights.sample(rng);
    }

    mat
}
