//! Hierarchical matrix arithmetic on a 3D grid matrix.
//!
//! The weighted adjacency matrix of a 3D grid is compressed for a range of rank
//! bounds. For each bound we form $H + H$ and $H\cdot H$ and compare against the
//! dense results.

use hmatrix_compression::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn main() {
    let _ = env_logger::builder().try_init();

    // A seeded generator makes the grid weights and the power iterations
    // reproducible.
    let mut rng = StdRng::seed_from_u64(42);

    // The grid has 4 vertices per side, so the matrix is 64 x 64.
    let mat = grid_3d_matrix::<f64, _>(2, &mut rng);

    let dense_sum = &mat + &mat;
    let dense_product = mat.dot(&mat);

    for &max_rank in [4, 8, 16].iter() {
        // Projected deflation keeps the recompressed factors orthogonal when
        // singular values are close together.
        let params = CompressionParams::new(max_rank, 1E-6).with_deflation(Deflation::Projected);

        let hmat = mat.compress_hmatrix(&params, &mut rng).unwrap();
        let sum = hmat.add(&hmat, &params, &mut rng).unwrap();
        let product = hmat.multiply(&hmat, &params, &mut rng).unwrap();

        println!("Maximum rank {}", max_rank);
        println!(
            "  compression: {} leaves, ratio {:.3}, relative difference {:1.2E}",
            hmat.leaf_count(),
            hmat.compression_ratio(),
            f64::rel_diff_fro(hmat.to_dense().view(), mat.view())
        );
        println!(
            "  H + H: relative difference {:1.2E}",
            f64::rel_diff_fro(sum.to_dense().view(), dense_sum.view())
        );
        println!(
            "  H * H: maximum leaf rank {}, relative difference {:1.2E}",
            product.max_leaf_rank(),
            f64::rel_diff_fro(product.to_dense().view(), dense_product.view())
        );
    }
}
