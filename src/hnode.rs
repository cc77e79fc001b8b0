//! Data structures for hierarchical matrices.
//!
//! An [`HNode`] represents an $m\times n$ block either as a leaf holding a low rank
//! factorisation $UV$ with $U\in\mathbb{R}^{m\times k}$ and $V\in\mathbb{R}^{k\times n}$,
//! or as an internal node with exactly four children in the order
//! top-left, top-right, bottom-left, bottom-right. The children of an internal node
//! tile its block: the two top children share their row count, the two left
//! children share their column count, and the sums give the dimensions of the parent.
//!
//! Each child is owned by its parent. Trees are never modified after construction;
//! the arithmetic routines build new trees from borrowed operands.

use crate::types::{dimension_mismatch, HMatrixError, RealScalar, Result};
use itertools::Itertools;
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Data, Ix1};

/// Position of a child inside an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    pub fn index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }
}

/// A low rank block $UV$.
#[derive(Debug, Clone, PartialEq)]
pub struct LowRankBlock<A: RealScalar> {
    u: Array2<A>,
    v: Array2<A>,
}

impl<A: RealScalar> LowRankBlock<A> {
    /// Create a block from its factors. The number of columns of `u` must
    /// match the number of rows of `v`.
    pub fn new(u: Array2<A>, v: Array2<A>) -> Result<Self> {
        if u.ncols() != v.nrows() {
            return Err(dimension_mismatch("LowRankBlock::new", u.ncols(), v.nrows()));
        }
        Ok(LowRankBlock { u, v })
    }

    /// The exact zero block of rank 0.
    pub fn zero(rows: usize, cols: usize) -> Self {
        LowRankBlock {
            u: Array2::zeros((rows, 0)),
            v: Array2::zeros((0, cols)),
        }
    }

    pub fn nrows(&self) -> usize {
        self.u.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.v.ncols()
    }

    pub fn rank(&self) -> usize {
        self.u.ncols()
    }

    pub fn u(&self) -> ArrayView2<A> {
        self.u.view()
    }

    pub fn v(&self) -> ArrayView2<A> {
        self.v.view()
    }

    /// Dense representation $UV$.
    pub fn to_mat(&self) -> Array2<A> {
        if self.rank() == 0 {
            return Array2::zeros((self.nrows(), self.ncols()));
        }
        self.u.dot(&self.v)
    }

    /// Apply the block to a vector, contracting with $V$ first.
    pub fn apply<S: Data<Elem = A>>(&self, x: &ArrayBase<S, Ix1>) -> Result<Array1<A>> {
        if x.len() != self.ncols() {
            return Err(dimension_mismatch("LowRankBlock::apply", self.ncols(), x.len()));
        }
        if self.rank() == 0 {
            return Ok(Array1::zeros(self.nrows()));
        }
        Ok(self.u.dot(&self.v.dot(x)))
    }

    /// Split the block at `row_split` and `col_split` into four leaf blocks.
    ///
    /// The quadrants share the factors of the parent: the top blocks use the
    /// first `row_split` rows of $U$, the left blocks the first `col_split`
    /// columns of $V$. A rank 0 block splits into four rank 0 blocks.
    pub fn split(&self, row_split: usize, col_split: usize) -> Result<[LowRankBlock<A>; 4]> {
        let (rows, cols) = (self.nrows(), self.ncols());
        if row_split > rows || col_split > cols {
            return Err(dimension_mismatch(
                "LowRankBlock::split",
                (rows, cols),
                (row_split, col_split),
            ));
        }

        if self.rank() == 0 {
            return Ok([
                LowRankBlock::zero(row_split, col_split),
                LowRankBlock::zero(row_split, cols - col_split),
                LowRankBlock::zero(rows - row_split, col_split),
                LowRankBlock::zero(rows - row_split, cols - col_split),
            ]);
        }

        let u_top = self.u.slice(s![..row_split, ..]);
        let u_bottom = self.u.slice(s![row_split.., ..]);
        let v_left = self.v.slice(s![.., ..col_split]);
        let v_right = self.v.slice(s![.., col_split..]);

        Ok([
            LowRankBlock::new(u_top.to_owned(), v_left.to_owned())?,
            LowRankBlock::new(u_top.to_owned(), v_right.to_owned())?,
            LowRankBlock::new(u_bottom.to_owned(), v_left.to_owned())?,
            LowRankBlock::new(u_bottom.to_owned(), v_right.to_owned())?,
        ])
    }

    pub fn into_factors(self) -> (Array2<A>, Array2<A>) {
        (self.u, self.v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HNodeKind<A: RealScalar> {
    Leaf(LowRankBlock<A>),
    Internal(Box<[HNode<A>; 4]>),
}

/// A node of a hierarchical matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct HNode<A: RealScalar> {
    rows: usize,
    cols: usize,
    kind: HNodeKind<A>,
}

impl<A: RealScalar> HNode<A> {
    /// A leaf node holding `block`.
    pub fn leaf(block: LowRankBlock<A>) -> Self {
        HNode {
            rows: block.nrows(),
            cols: block.ncols(),
            kind: HNodeKind::Leaf(block),
        }
    }

    /// A leaf node from the factors $U$ and $V$.
    pub fn from_factors(u: Array2<A>, v: Array2<A>) -> Result<Self> {
        Ok(HNode::leaf(LowRankBlock::new(u, v)?))
    }

    /// The rank 0 leaf of the given dimension.
    pub fn zero(rows: usize, cols: usize) -> Self {
        HNode::leaf(LowRankBlock::zero(rows, cols))
    }

    /// An internal node. The children must tile the block.
    pub fn internal(children: [HNode<A>; 4]) -> Result<Self> {
        let [top_left, top_right, bottom_left, bottom_right] = &children;

        if top_left.rows != top_right.rows
            || bottom_left.rows != bottom_right.rows
            || top_left.cols != bottom_left.cols
            || top_right.cols != bottom_right.cols
        {
            return Err(HMatrixError::InvalidStructure(format!(
                "children {:?}, {:?}, {:?}, {:?} do not tile a block",
                top_left.dim(),
                top_right.dim(),
                bottom_left.dim(),
                bottom_right.dim()
            )));
        }

        let rows = top_left.rows + bottom_left.rows;
        let cols = top_left.cols + top_right.cols;

        Ok(HNode {
            rows,
            cols,
            kind: HNodeKind::Internal(Box::new(children)),
        })
    }

    /// An internal node from an iterator yielding the four children in
    /// quadrant order.
    pub fn internal_from_iter<I>(children: I) -> Result<Self>
    where
        I: IntoIterator<Item = HNode<A>>,
    {
        let (top_left, top_right, bottom_left, bottom_right) = children
            .into_iter()
            .collect_tuple()
            .ok_or_else(|| {
                HMatrixError::InvalidStructure("an internal node needs exactly four children".to_string())
            })?;
        HNode::internal([top_left, top_right, bottom_left, bottom_right])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn kind(&self) -> &HNodeKind<A> {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, HNodeKind::Leaf(_))
    }

    /// The rank of a leaf, `None` for internal nodes.
    pub fn rank(&self) -> Option<usize> {
        self.as_leaf().map(|block| block.rank())
    }

    pub fn as_leaf(&self) -> Option<&LowRankBlock<A>> {
        match &self.kind {
            HNodeKind::Leaf(block) => Some(block),
            HNodeKind::Internal(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[HNode<A>; 4]> {
        match &self.kind {
            HNodeKind::Leaf(_) => None,
            HNodeKind::Internal(children) => Some(children),
        }
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&HNode<A>> {
        self.children().map(|children| &children[quadrant.index()])
    }

    /// Row and column index at which the children of an internal node meet.
    pub fn split_point(&self) -> Option<(usize, usize)> {
        self.children()
            .map(|children| (children[0].rows, children[0].cols))
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            HNodeKind::Leaf(_) => 1,
            HNodeKind::Internal(children) => children.iter().map(|child| child.leaf_count()).sum(),
        }
    }

    /// Number of levels below this node. A leaf has depth 0.
    pub fn depth(&self) -> usize {
        match &self.kind {
            HNodeKind::Leaf(_) => 0,
            HNodeKind::Internal(children) => {
                1 + children.iter().map(|child| child.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Largest rank of any leaf in the tree.
    pub fn max_leaf_rank(&self) -> usize {
        match &self.kind {
            HNodeKind::Leaf(block) => block.rank(),
            HNodeKind::Internal(children) => children
                .iter()
                .map(|child| child.max_leaf_rank())
                .max()
                .unwrap_or(0),
        }
    }

    /// Number of scalars stored in all leaf factors.
    pub fn stored_entries(&self) -> usize {
        match &self.kind {
            HNodeKind::Leaf(block) => block.rank() * (block.nrows() + block.ncols()),
            HNodeKind::Internal(children) => {
                children.iter().map(|child| child.stored_entries()).sum()
            }
        }
    }

    /// Ratio of stored scalars to the entries of the dense block.
    pub fn compression_ratio(&self) -> f64 {
        let dense = self.rows * self.cols;
        if dense == 0 {
            return 0.0;
        }
        self.stored_entries() as f64 / dense as f64
    }

    /// Turn a leaf into an internal node of four leaves split at the given
    /// position. Used by the arithmetic routines to match the block structure
    /// of the other operand.
    pub(crate) fn split_leaf(block: &LowRankBlock<A>, row_split: usize, col_split: usize) -> Result<Self> {
        let [top_left, top_right, bottom_left, bottom_right] = block.split(row_split, col_split)?;
        HNode::internal([
            HNode::leaf(top_left),
            HNode::leaf(top_right),
            HNode::leaf(bottom_left),
            HNode::leaf(bottom_right),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_block() -> LowRankBlock<f64> {
        let u = array![[1.0], [2.0], [3.0]];
        let v = array![[1.0, 0.0, -1.0, 2.0]];
        LowRankBlock::new(u, v).unwrap()
    }

    #[test]
    fn test_leaf_factors_must_agree() {
        let u = Array2::<f64>::zeros((3, 2));
        let v = Array2::<f64>::zeros((1, 4));
        assert!(LowRankBlock::new(u, v).is_err());
    }

    #[test]
    fn test_zero_leaf() {
        let node = HNode::<f64>::zero(4, 5);
        assert!(node.is_leaf());
        assert_eq!(node.rank(), Some(0));
        assert_eq!(node.dim(), (4, 5));
        assert_eq!(node.as_leaf().unwrap().to_mat(), Array2::<f64>::zeros((4, 5)));
        assert_eq!(node.stored_entries(), 0);
    }

    #[test]
    fn test_internal_node_tiling() {
        let node = HNode::internal([
            HNode::<f64>::zero(2, 3),
            HNode::zero(2, 1),
            HNode::zero(3, 3),
            HNode::zero(3, 1),
        ])
        .unwrap();

        assert!(!node.is_leaf());
        assert_eq!(node.rank(), None);
        assert_eq!(node.dim(), (5, 4));
        assert_eq!(node.split_point(), Some((2, 3)));
        assert_eq!(node.child(Quadrant::BottomLeft).unwrap().dim(), (3, 3));
        assert_eq!(node.leaf_count(), 4);
        assert_eq!(node.depth(), 1);

        let ragged = HNode::internal([
            HNode::<f64>::zero(2, 3),
            HNode::zero(1, 1),
            HNode::zero(3, 3),
            HNode::zero(3, 1),
        ]);
        assert!(matches!(ragged, Err(HMatrixError::InvalidStructure(_))));
    }

    #[test]
    fn test_internal_from_iter_needs_four_children() {
        let three = vec![HNode::<f64>::zero(1, 1), HNode::zero(1, 1), HNode::zero(1, 1)];
        assert!(HNode::internal_from_iter(three).is_err());

        let four = (0..4).map(|_| HNode::<f64>::zero(1, 1));
        assert_eq!(HNode::internal_from_iter(four).unwrap().dim(), (2, 2));
    }

    #[test]
    fn test_split_preserves_dense_block() {
        let block = sample_block();
        let dense = block.to_mat();

        let node = HNode::split_leaf(&block, 1, 3).unwrap();
        let quadrants = node.children().unwrap();

        assert_eq!(quadrants[0].as_leaf().unwrap().to_mat(), dense.slice(s![..1, ..3]));
        assert_eq!(quadrants[1].as_leaf().unwrap().to_mat(), dense.slice(s![..1, 3..]));
        assert_eq!(quadrants[2].as_leaf().unwrap().to_mat(), dense.slice(s![1.., ..3]));
        assert_eq!(quadrants[3].as_leaf().unwrap().to_mat(), dense.slice(s![1.., 3..]));
        assert!(quadrants.iter().all(|child| child.rank() == Some(1)));
    }

    #[test]
    fn test_split_zero_block() {
        let block = LowRankBlock::<f64>::zero(5, 3);
        let parts = block.split(2, 1).unwrap();

        assert_eq!(parts[3].nrows(), 3);
        assert_eq!(parts[3].ncols(), 2);
        assert!(parts.iter().all(|part| part.rank() == 0));
        assert!(block.split(6, 1).is_err());
    }

    #[test]
    fn test_apply() {
        let block = sample_block();
        let x = array![1.0, 1.0, 1.0, 1.0];
        assert_eq!(block.apply(&x).unwrap(), array![2.0, 4.0, 6.0]);
        assert!(block.apply(&array![1.0]).is_err());
    }

    #[test]
    fn test_tree_statistics() {
        let leaf = HNode::leaf(sample_block());
        let inner = HNode::internal([
            leaf.clone(),
            HNode::zero(3, 4),
            HNode::zero(3, 4),
            leaf,
        ])
        .unwrap();
        let outer = HNode::internal([
            inner,
            HNode::zero(6, 2),
            HNode::zero(1, 8),
            HNode::zero(1, 2),
        ])
        .unwrap();

        assert_eq!(outer.dim(), (7, 10));
        assert_eq!(outer.depth(), 2);
        assert_eq!(outer.leaf_count(), 7);
        assert_eq!(outer.max_leaf_rank(), 1);
        assert_eq!(outer.stored_entries(), 2 * (3 + 4));
        assert!((outer.compression_ratio() - 14.0 / 70.0).abs() < 1E-14);
    }
}
