//! Hierarchical low rank compression of dense matrices.
//!
//! A dense matrix is recursively partitioned into quadrants. Blocks that admit
//! a low rank approximation are stored as factors $UV$, all other blocks are
//! subdivided further. The resulting tree of [`HNode`]s supports
//! matrix-vector products, addition and multiplication, where every leaf
//! produced by the arithmetic is recompressed to the rank bound given in
//! [`CompressionParams`].

pub mod addition;
pub mod compress;
pub mod dense;
pub mod helpers;
pub mod hnode;
pub mod materialize;
pub mod matvec;
pub mod multiplication;
pub mod params;
pub mod prelude;
pub mod random_matrix;
pub mod svd;
pub mod types;

pub use compress::HMatrixCompressor;
pub use helpers::RelDiff;
pub use hnode::{HNode, HNodeKind, LowRankBlock, Quadrant};
pub use params::{CompressionParams, Deflation};
pub use random_matrix::{grid_3d_matrix, RandomMatrix};
pub use svd::{SVDData, TruncatedSVD};
pub use types::{HMatrixError, MatVec, RealScalar, Result};
