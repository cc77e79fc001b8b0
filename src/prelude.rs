//! Collect all traits and other exports here.

pub use crate::compress::HMatrixCompressor;
pub use crate::helpers::RelDiff;
pub use crate::hnode::{HNode, HNodeKind, LowRankBlock, Quadrant};
pub use crate::params::{CompressionParams, Deflation};
pub use crate::random_matrix::{grid_3d_matrix, RandomMatrix};
pub use crate::svd::{SVDData, TruncatedSVD};
pub use crate::types::{HMatrixError, MatVec, RealScalar};
