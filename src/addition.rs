//! Addition of hierarchical matrices.
//!
//! The sum of two leaves $U_AV_A + U_BV_B = [U_A\ U_B][V_A; V_B]$ is exact but of
//! rank $k_A + k_B$. It is densified and recompressed by a truncated SVD to keep
//! the leaf rank bounded by `max_rank`. Internal nodes are added quadrant by
//! quadrant. If only one operand is a leaf, it is split at the child boundaries
//! of the other operand first.

use crate::compress::recompress;
use crate::dense;
use crate::hnode::{HNode, HNodeKind, LowRankBlock};
use crate::params::CompressionParams;
use crate::types::{dimension_mismatch, RealScalar, Result};
use itertools::Itertools;
use rand::Rng;

impl<A: RealScalar> HNode<A> {
    /// Compute the sum `self + other` with recompression of all leaf sums.
    ///
    /// Both trees must have the same dimensions.
    pub fn add<R: Rng>(
        &self,
        other: &HNode<A>,
        params: &CompressionParams,
        rng: &mut R,
    ) -> Result<HNode<A>> {
        params.validate()?;
        if self.dim() != other.dim() {
            return Err(dimension_mismatch("HNode::add", self.dim(), other.dim()));
        }
        log::debug!(
            "add: {}x{} blocks, max_rank = {}, epsilon = {:e}",
            self.rows(),
            self.cols(),
            params.max_rank,
            params.epsilon
        );
        add_nodes(self, other, params, rng)
    }
}

pub(crate) fn add_nodes<A: RealScalar, R: Rng>(
    first: &HNode<A>,
    second: &HNode<A>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<HNode<A>> {
    if first.dim() != second.dim() {
        return Err(dimension_mismatch("HNode::add", first.dim(), second.dim()));
    }

    match (first.kind(), second.kind()) {
        (HNodeKind::Leaf(first_block), HNodeKind::Leaf(second_block)) => {
            add_leaves(first_block, second_block, params, rng).map(HNode::leaf)
        }
        (HNodeKind::Internal(first_children), HNodeKind::Internal(second_children)) => {
            let sums = first_children
                .iter()
                .zip_eq(second_children.iter())
                .map(|(first_child, second_child)| {
                    add_nodes(first_child, second_child, params, rng)
                })
                .collect::<Result<Vec<_>>>()?;
            HNode::internal_from_iter(sums)
        }
        (HNodeKind::Leaf(block), HNodeKind::Internal(children)) => {
            let split = HNode::split_leaf(block, children[0].rows(), children[0].cols())?;
            add_nodes(&split, second, params, rng)
        }
        (HNodeKind::Internal(children), HNodeKind::Leaf(block)) => {
            let split = HNode::split_leaf(block, children[0].rows(), children[0].cols())?;
            add_nodes(first, &split, params, rng)
        }
    }
}

fn add_leaves<A: RealScalar, R: Rng>(
    first: &LowRankBlock<A>,
    second: &LowRankBlock<A>,
    params: &CompressionParams,
    rng: &mut R,
) -> Result<LowRankBlock<A>> {
    if first.rank() == 0 && second.rank() == 0 {
        return Ok(LowRankBlock::zero(first.nrows(), first.ncols()));
    }

    let u = dense::hstack(first.u(), second.u())?;
    let v = dense::vstack(first.v(), second.v())?;
    let sum = dense::dot(&u, &v)?;

    log::trace!(
        "add: recompressing {}x{} leaf sum of ranks {} and {}",
        sum.nrows(),
        sum.ncols(),
        first.rank(),
        second.rank()
    );

    recompress(&sum, params, rng)
}
