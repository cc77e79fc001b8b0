//! Compression of dense matrices into hierarchical matrices.
//!
//! A block is first approximated by a truncated SVD. The factorisation is kept
//! as a leaf if the SVD engine exhausted the block before reaching `max_rank`
//! components, if the smallest retained singular value is below `epsilon`, or if
//! one of the dimensions is at most 2. Otherwise the block is split at half its
//! rows and columns (the extra row or column of an odd dimension going to the
//! bottom or right) and the four quadrants are compressed recursively.

use crate::hnode::{HNode, LowRankBlock};
use crate::params::CompressionParams;
use crate::svd::truncated_svd;
use crate::types::{RealScalar, Result};
use ndarray::{s, Array2, ArrayBase, ArrayView2, Data, Ix2};
use rand::Rng;

/// Blocks with at most this many rows or columns are never subdivided.
const MIN_SPLIT_DIMENSION: usize = 2;

pub trait HMatrixCompressor {
    type A: RealScalar;

    /// Compress the matrix into a hierarchical matrix.
    fn compress_hmatrix<R: Rng>(
        &self,
        params: &CompressionParams,
        rng: &mut R,
    ) -> Result<HNode<Self::A>>;
}

impl<A, S> HMatrixCompressor for ArrayBase<S, Ix2>
where
    A: RealScalar,
    S: Data<Elem = A>,
{
    type A = A;

    fn compress_hmatrix<R: Rng>(&self, params: &CompressionParams, rng: &mut R) -> Result<HNode<A>> {
        HNode::compress(self.view(), params, rng)
    }
}

impl<A: RealScalar> HNode<A> {
    /// Build a hierarchical matrix from a dense matrix.
    pub fn compress<R: Rng>(
        mat: ArrayView2<A>,
        params: &CompressionParams,
        rng: &mut R,
    ) -> Result<Self> {
        params.validate()?;
        log::debug!(
            "compress: {}x{} matrix, max_rank = {}, epsilon = {:e}",
            mat.nrows(),
            mat.ncols(),
            params.max_rank,
            params.epsilon
        );
        build_node(mat, params, rng)
    }
}

fn build_node<A: RealScalar, R: Rng>(
    mat: ArrayView2<A>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<HNode<A>> {
    let (m, n) = mat.dim();

    if m == 0 || n == 0 {
        return Ok(HNode::zero(m, n));
    }

    let svd = truncated_svd(&mat, params, rng)?;

    let epsilon = A::from_f64(params.epsilon);
    let exhausted = svd.rank() < params.max_rank;
    let negligible_tail = svd
        .min_singular_value()
        .map_or(false, |sigma| sigma < epsilon);

    if exhausted || negligible_tail || m <= MIN_SPLIT_DIMENSION || n <= MIN_SPLIT_DIMENSION {
        log::debug!("compress: {}x{} leaf of rank {}", m, n, svd.rank());
        let (u, v) = svd.into_factors();
        return HNode::from_factors(u, v);
    }

    let mid_row = m / 2;
    let mid_col = n / 2;

    log::debug!("compress: splitting {}x{} block at ({}, {})", m, n, mid_row, mid_col);

    HNode::internal([
        build_node(mat.slice(s![..mid_row, ..mid_col]), params, rng)?,
        build_node(mat.slice(s![..mid_row, mid_col..]), params, rng)?,
        build_node(mat.slice(s![mid_row.., ..mid_col]), params, rng)?,
        build_node(mat.slice(s![mid_row.., mid_col..]), params, rng)?,
    ])
}

/// Re-approximate a dense intermediate result by a truncated SVD so that its
/// rank is bounded by `params.max_rank`.
pub(crate) fn recompress<A: RealScalar, R: Rng>(
    dense: &Array2<A>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<LowRankBlock<A>> {
    let svd = truncated_svd(dense, params, rng)?;
    let (u, v) = svd.into_factors();
    LowRankBlock::new(u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::RelDiff;
    use crate::random_matrix::RandomMatrix;
    use ndarray::{array, Array1};

    fn check_tiling(node: &HNode<f64>) {
        match node.children() {
            None => {
                let block = node.as_leaf().unwrap();
                assert_eq!(block.nrows(), node.rows());
                assert_eq!(block.ncols(), node.cols());
            }
            Some(children) => {
                let (mid_row, mid_col) = (node.rows() / 2, node.cols() / 2);
                assert_eq!(children[0].dim(), (mid_row, mid_col));
                assert_eq!(children[3].dim(), (node.rows() - mid_row, node.cols() - mid_col));
                children.iter().for_each(check_tiling);
            }
        }
    }

    #[test]
    fn test_zero_matrix_gives_single_zero_leaf() {
        let mat = Array2::<f64>::zeros((4, 4));
        let params = CompressionParams::new(4, 1E-6);

        let node = mat.compress_hmatrix(&params, &mut rand::thread_rng()).unwrap();

        assert!(node.is_leaf());
        assert_eq!(node.rank(), Some(0));
        assert_eq!(node.dim(), (4, 4));
    }

    #[test]
    fn test_empty_matrix() {
        let mat = Array2::<f64>::zeros((0, 5));
        let node = mat
            .compress_hmatrix(&CompressionParams::default(), &mut rand::thread_rng())
            .unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.dim(), (0, 5));
    }

    #[test]
    fn test_low_rank_matrix_is_single_leaf() {
        let mut rng = rand::thread_rng();
        let u = Array1::from_shape_fn(16, |i| 1.0 + i as f64);
        let v = Array1::from_shape_fn(12, |j| (j as f64 - 5.5) / 4.0);
        let mat = Array2::from_shape_fn((16, 12), |(i, j)| u[i] * v[j]);

        let node = mat
            .compress_hmatrix(&CompressionParams::new(4, 1E-8), &mut rng)
            .unwrap();

        assert!(node.is_leaf());
        assert_eq!(node.rank(), Some(1));
        let dense = node.as_leaf().unwrap().to_mat();
        assert!(f64::rel_diff_fro(dense.view(), mat.view()) < 1E-10);
    }

    #[test]
    fn test_full_rank_matrix_is_subdivided() {
        // The identity has no low rank approximation, so the compressor recurses
        // down to 2x2 blocks: diagonal blocks of rank 2, off diagonal blocks of rank 0.
        let mat = Array2::<f64>::eye(8);
        let node = mat
            .compress_hmatrix(&CompressionParams::new(2, 1E-8), &mut rand::thread_rng())
            .unwrap();

        assert_eq!(node.depth(), 2);
        assert_eq!(node.leaf_count(), 4 + 4 + 2);
        assert_eq!(node.max_leaf_rank(), 2);
        check_tiling(&node);
    }

    #[test]
    fn test_odd_dimensions() {
        let mut rng = rand::thread_rng();
        let mat = f64::random_uniform((13, 9), &mut rng);
        let node = mat
            .compress_hmatrix(&CompressionParams::new(2, 1E-10), &mut rng)
            .unwrap();

        assert_eq!(node.dim(), (13, 9));
        assert!(!node.is_leaf());
        assert!(node.max_leaf_rank() <= 2);
        check_tiling(&node);
    }

    #[test]
    fn test_thin_blocks_are_leaves() {
        let mat = array![[1.0, 2.0, 3.0, 4.0, 5.0], [5.0, 1.0, 2.0, 3.0, 4.0]];
        let node = mat
            .compress_hmatrix(&CompressionParams::new(1, 1E-10), &mut rand::thread_rng())
            .unwrap();

        assert!(node.is_leaf());
        assert_eq!(node.rank(), Some(1));
    }

    #[test]
    fn test_recompress_bounds_rank() {
        let mut rng = rand::thread_rng();
        let mat = f64::random_low_rank_matrix((10, 10), 6, &mut rng);
        let block = recompress(&mat, &CompressionParams::new(3, 1E-10), &mut rng).unwrap();

        assert_eq!(block.rank(), 3);
        assert_eq!((block.nrows(), block.ncols()), (10, 10));
    }
}
