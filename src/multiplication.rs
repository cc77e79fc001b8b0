//! Multiplication of hierarchical matrices.
//!
//! For two leaves the product $U_A(V_AU_B)V_B$ is formed through the small
//! $k_A\times k_B$ middle matrix and then recompressed. Two internal nodes are
//! multiplied by the $2\times 2$ block rule
//! $C_{ij} = A_{i1}B_{1j} + A_{i2}B_{2j}$, where each sum is formed by
//! [`HNode::add`]. A leaf operand facing an internal node is split first so that
//! the inner dimensions of all block products agree.

use crate::addition::add_nodes;
use crate::compress::recompress;
use crate::dense;
use crate::hnode::{HNode, HNodeKind, LowRankBlock};
use crate::params::CompressionParams;
use crate::types::{dimension_mismatch, RealScalar, Result};
use rand::Rng;

/// Index pairs `(i, j)` of the result quadrants in storage order.
const QUADRANT_POSITIONS: [(usize, usize); 4] = [(0, 0), (0, 1), (1, 0), (1, 1)];

impl<A: RealScalar> HNode<A> {
    /// Compute the product `self * other` with recompression of all leaf products.
    ///
    /// The number of columns of `self` must equal the number of rows of `other`.
    pub fn multiply<R: Rng>(
        &self,
        other: &HNode<A>,
        params: &CompressionParams,
        rng: &mut R,
    ) -> Result<HNode<A>> {
        params.validate()?;
        if self.cols() != other.rows() {
            return Err(dimension_mismatch(
                "HNode::multiply",
                self.cols(),
                other.rows(),
            ));
        }
        log::debug!(
            "multiply: {}x{} by {}x{}, max_rank = {}, epsilon = {:e}",
            self.rows(),
            self.cols(),
            other.rows(),
            other.cols(),
            params.max_rank,
            params.epsilon
        );
        multiply_nodes(self, other, params, rng)
    }
}

fn multiply_nodes<A: RealScalar, R: Rng>(
    first: &HNode<A>,
    second: &HNode<A>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<HNode<A>> {
    if first.cols() != second.rows() {
        return Err(dimension_mismatch(
            "HNode::multiply",
            first.cols(),
            second.rows(),
        ));
    }

    match (first.kind(), second.kind()) {
        (HNodeKind::Leaf(first_block), HNodeKind::Leaf(second_block)) => {
            multiply_leaves(first_block, second_block, params, rng).map(HNode::leaf)
        }
        (HNodeKind::Internal(first_children), HNodeKind::Internal(second_children)) => {
            let mut quadrants = Vec::with_capacity(4);
            for &(row, col) in QUADRANT_POSITIONS.iter() {
                let left = multiply_nodes(
                    &first_children[2 * row],
                    &second_children[col],
                    params,
                    rng,
                )?;
                let right = multiply_nodes(
                    &first_children[2 * row + 1],
                    &second_children[2 + col],
                    params,
                    rng,
                )?;
                quadrants.push(add_nodes(&left, &right, params, rng)?);
            }
            HNode::internal_from_iter(quadrants)
        }
        (HNodeKind::Leaf(block), HNodeKind::Internal(children)) => {
            // Columns of the leaf meet the rows of the other operand.
            let split = HNode::split_leaf(block, block.nrows() / 2, children[0].rows())?;
            multiply_nodes(&split, second, params, rng)
        }
        (HNodeKind::Internal(children), HNodeKind::Leaf(block)) => {
            // Rows of the leaf meet the columns of the other operand.
            let split = HNode::split_leaf(block, children[0].cols(), block.ncols() / 2)?;
            multiply_nodes(first, &split, params, rng)
        }
    }
}

fn multiply_leaves<A: RealScalar, R: Rng>(
    first: &LowRankBlock<A>,
    second: &LowRankBlock<A>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<LowRankBlock<A>> {
    if first.rank() == 0 || second.rank() == 0 {
        return Ok(LowRankBlock::zero(first.nrows(), second.ncols()));
    }

    let middle = dense::dot(&first.v(), &second.u())?;
    let u = dense::dot(&first.u(), &middle)?;
    let product = dense::dot(&u, &second.v())?;

    log::trace!(
        "multiply: recompressing {}x{} leaf product of ranks {} and {}",
        product.nrows(),
        product.ncols(),
        first.rank(),
        second.rank()
    );

    recompress(&product, params, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::HMatrixCompressor;
    use crate::helpers::RelDiff;
    use crate::params::Deflation;
    use crate::random_matrix::RandomMatrix;
    use crate::types::HMatrixError;
    use ndarray::{array, Array2};

    fn test_matrix() -> Array2<f64> {
        array![
            [4.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            [1.0, 4.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 1.0, 4.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0, 4.0, 0.0, 0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0, 0.0, 4.0, 1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 1.0, 4.0, 1.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 4.0, 1.0],
            [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 4.0]
        ]
    }

    /// A 4x4 tree whose children meet at (`split`, `split`).
    fn tree_split_at(split: usize) -> HNode<f64> {
        let rest = 4 - split;
        let ones = |n: usize| {
            HNode::from_factors(Array2::from_elem((n, 1), 1.0), Array2::from_elem((1, n), 1.0))
                .unwrap()
        };
        HNode::internal([
            ones(split),
            HNode::zero(split, rest),
            HNode::zero(rest, split),
            ones(rest),
        ])
        .unwrap()
    }

    #[test]
    fn test_multiply_leaves() {
        let mut rng = rand::thread_rng();
        let first = HNode::from_factors(array![[1.0], [2.0]], array![[1.0, 1.0, 0.0]]).unwrap();
        let second =
            HNode::from_factors(array![[1.0], [0.0], [3.0]], array![[2.0, -1.0]]).unwrap();

        let product = first
            .multiply(&second, &CompressionParams::new(4, 1E-10), &mut rng)
            .unwrap();

        let expected = first.to_dense().dot(&second.to_dense());
        assert_eq!(product.dim(), (2, 2));
        assert_eq!(product.rank(), Some(1));
        assert!(f64::rel_diff_fro(product.to_dense().view(), expected.view()) < 1E-10);
    }

    #[test]
    fn test_multiply_by_zero_leaf() {
        let mut rng = rand::thread_rng();
        let first = HNode::from_factors(array![[1.0], [2.0]], array![[1.0, 1.0, 0.0]]).unwrap();

        let product = first
            .multiply(&HNode::zero(3, 5), &CompressionParams::default(), &mut rng)
            .unwrap();

        assert!(product.is_leaf());
        assert_eq!(product.rank(), Some(0));
        assert_eq!(product.dim(), (2, 5));
    }

    #[test]
    fn test_multiply_dimension_mismatch() {
        let mut rng = rand::thread_rng();
        let err = HNode::<f64>::zero(3, 4)
            .multiply(&HNode::zero(3, 4), &CompressionParams::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, HMatrixError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_multiply_by_identity() {
        let mut rng = rand::thread_rng();
        let params = CompressionParams::new(4, 1E-6);
        let mat = test_matrix();

        let node = mat.compress_hmatrix(&params, &mut rng).unwrap();
        let identity = Array2::<f64>::eye(8)
            .compress_hmatrix(&params, &mut rng)
            .unwrap();

        let product = node.multiply(&identity, &params, &mut rng).unwrap();

        assert_eq!(product.dim(), (8, 8));
        assert!(f64::rel_diff_fro(product.to_dense().view(), mat.view()) < 1E-8);
    }

    #[test]
    fn test_square_of_hmatrix_with_projected_deflation() {
        let mut rng = rand::thread_rng();
        let params = CompressionParams::new(4, 1E-8).with_deflation(Deflation::Projected);
        let mat = test_matrix();
        let node = mat.compress_hmatrix(&params, &mut rng).unwrap();

        let product = node.multiply(&node, &params, &mut rng).unwrap();

        let expected = mat.dot(&mat);
        assert!(product.max_leaf_rank() <= 4);
        assert!(f64::rel_diff_fro(product.to_dense().view(), expected.view()) < 1E-6);
    }

    #[test]
    fn test_multiply_leaf_with_internal_node() {
        let mut rng = rand::thread_rng();
        let params = CompressionParams::new(2, 1E-10);

        // The identity is subdivided, the rank one leaf is split to match it.
        let eye = Array2::<f64>::eye(7);
        let tree = eye.compress_hmatrix(&params, &mut rng).unwrap();
        let column = Array2::from_shape_fn((7, 1), |(i, _)| 1.0 + i as f64);
        let row = Array2::from_shape_fn((1, 7), |(_, j)| 7.0 - j as f64);
        let leaf = HNode::from_factors(column, row).unwrap();
        let expected = leaf.to_dense();

        let left = leaf.multiply(&tree, &params, &mut rng).unwrap();
        let right = tree.multiply(&leaf, &params, &mut rng).unwrap();

        assert!(f64::rel_diff_fro(left.to_dense().view(), expected.view()) < 1E-8);
        assert!(f64::rel_diff_fro(right.to_dense().view(), expected.view()) < 1E-8);
    }

    #[test]
    fn test_multiply_respects_rank_cap() {
        let mut rng = rand::thread_rng();
        let params = CompressionParams::new(3, 1E-10);
        let first = f64::random_uniform((16, 16), &mut rng)
            .compress_hmatrix(&params, &mut rng)
            .unwrap();
        let second = f64::random_uniform((16, 16), &mut rng)
            .compress_hmatrix(&params, &mut rng)
            .unwrap();

        let product = first.multiply(&second, &params, &mut rng).unwrap();

        assert_eq!(product.dim(), (16, 16));
        assert!(product.max_leaf_rank() <= 3);
    }

    #[test]
    fn test_multiply_trees_with_different_partitions() {
        let mut rng = rand::thread_rng();
        let first = tree_split_at(1);
        let second = tree_split_at(2);

        let err = first
            .multiply(&second, &CompressionParams::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            HMatrixError::DimensionMismatch { operation: "HNode::multiply", .. }
        ));
    }
}
