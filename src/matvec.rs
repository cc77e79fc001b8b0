//! Hierarchical matrix-vector product.
//!
//! A leaf applies $U(Vx)$, contracting over the rank first. An internal node
//! splits $x$ at the column split of its children and combines
//! $y = [H_{11}x_1 + H_{12}x_2;\ H_{21}x_1 + H_{22}x_2]$.

use crate::hnode::{HNode, HNodeKind};
use crate::types::{dimension_mismatch, MatVec, RealScalar, Result};
use ndarray::{s, Array1, ArrayView1};

impl<A: RealScalar> HNode<A> {
    /// Compute $y = Hx$.
    pub fn matvec(&self, x: ArrayView1<A>) -> Result<Array1<A>> {
        if x.len() != self.cols() {
            return Err(dimension_mismatch("HNode::matvec", self.cols(), x.len()));
        }
        Ok(apply(self, x))
    }
}

impl<A: RealScalar> MatVec for HNode<A> {
    type A = A;

    fn nrows(&self) -> usize {
        self.rows()
    }

    fn ncols(&self) -> usize {
        self.cols()
    }

    fn matvec(&self, vec: ArrayView1<A>) -> Result<Array1<A>> {
        HNode::matvec(self, vec)
    }
}

// The length is checked once at the top. Children tile their parent, so every
// recursive call receives a slice of matching length.
fn apply<A: RealScalar>(node: &HNode<A>, x: ArrayView1<A>) -> Array1<A> {
    match node.kind() {
        HNodeKind::Leaf(block) => {
            if block.rank() == 0 {
                Array1::zeros(node.rows())
            } else {
                block.u().dot(&block.v().dot(&x))
            }
        }
        HNodeKind::Internal(children) => {
            let [top_left, top_right, bottom_left, bottom_right] = &**children;
            let split = top_left.cols();

            let x_left = x.slice(s![..split]);
            let x_right = x.slice(s![split..]);

            let mid_row = top_left.rows();
            let mut y = Array1::zeros(node.rows());
            y.slice_mut(s![..mid_row])
                .assign(&(apply(top_left, x_left) + apply(top_right, x_right)));
            y.slice_mut(s![mid_row..])
                .assign(&(apply(bottom_left, x_left) + apply(bottom_right, x_right)));
            y
        }
    }
}
