//! Dense reconstruction and structure plots of hierarchical matrices.

use crate::hnode::{HNode, HNodeKind};
use crate::types::RealScalar;
use ndarray::{s, Array2, ArrayViewMut2};

/// Marker for the block of a leaf with positive rank.
const LOW_RANK_MARKER: f64 = 0.0;
/// Marker for the block of a rank 0 leaf. Also the background.
const ZERO_BLOCK_MARKER: f64 = 1.0;
/// Marker along the diagonal of a leaf block, one entry per rank.
const RANK_MARKER: f64 = 0.5;

impl<A: RealScalar> HNode<A> {
    /// Assemble the dense matrix represented by the tree.
    pub fn to_dense(&self) -> Array2<A> {
        let mut result = Array2::<A>::zeros(self.dim());
        write_dense(self, result.view_mut());
        result
    }

    /// A matrix of the same shape marking the leaf structure of the tree.
    ///
    /// Blocks of leaves with positive rank are filled with 0, rank 0 blocks
    /// with 1. The first `min(rank, rows, cols)` diagonal entries of every leaf
    /// block are set to 0.5, so that the plot shows both the partition and
    /// the rank distribution.
    pub fn visualize(&self) -> Array2<A> {
        let mut result = Array2::<A>::from_elem(self.dim(), A::from_f64(ZERO_BLOCK_MARKER));
        mark_leaves(self, &mut result, 0, 0);
        result
    }
}

fn write_dense<A: RealScalar>(node: &HNode<A>, mut out: ArrayViewMut2<A>) {
    match node.kind() {
        HNodeKind::Leaf(block) => {
            // `out` is zero initialised.
            if block.rank() > 0 {
                out.assign(&block.u().dot(&block.v()));
            }
        }
        HNodeKind::Internal(children) => {
            let [top_left, top_right, bottom_left, bottom_right] = &**children;
            let (mid_row, mid_col) = top_left.dim();

            write_dense(top_left, out.slice_mut(s![..mid_row, ..mid_col]));
            write_dense(top_right, out.slice_mut(s![..mid_row, mid_col..]));
            write_dense(bottom_left, out.slice_mut(s![mid_row.., ..mid_col]));
            write_dense(bottom_right, out.slice_mut(s![mid_row.., mid_col..]));
        }
    }
}

fn mark_leaves<A: RealScalar>(
    node: &HNode<A>,
    out: &mut Array2<A>,
    row_offset: usize,
    col_offset: usize,
) {
    match node.kind() {
        HNodeKind::Leaf(block) => {
            let (rows, cols) = node.dim();
            let fill = if block.rank() > 0 {
                LOW_RANK_MARKER
            } else {
                ZERO_BLOCK_MARKER
            };
            out.slice_mut(s![
                row_offset..row_offset + rows,
                col_offset..col_offset + cols
            ])
            .fill(A::from_f64(fill));

            let marker = A::from_f64(RANK_MARKER);
            for index in 0..block.rank().min(rows).min(cols) {
                out[[row_offset + index, col_offset + index]] = marker;
            }
        }
        HNodeKind::Internal(children) => {
            let (mid_row, mid_col) = children[0].dim();
            let offsets = [
                (row_offset, col_offset),
                (row_offset, col_offset + mid_col),
                (row_offset + mid_row, col_offset),
                (row_offset + mid_row, col_offset + mid_col),
            ];
            for (child, &(row, col)) in children.iter().zip(offsets.iter()) {
                mark_leaves(child, out, row, col);
            }
        }
    }
}
