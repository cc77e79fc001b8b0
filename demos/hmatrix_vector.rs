//! Compressing a matrix and applying it to a vector.
//!
//! This example compresses a small diagonally dominant matrix into a hierarchical
//! matrix, compares the hierarchical matrix-vector product with the dense one and
//! prints the leaf structure of the tree.

use hmatrix_compression::prelude::*;
use ndarray::{array, Array1};

pub fn main() {
    // Logging is controlled through the `RUST_LOG` environment variable.
    let _ = env_logger::builder().try_init();

    // We initialize a random number generator.
    let mut rng = rand::thread_rng();

    // Each vertex of a ring of size 4 is linked to its neighbours and to the
    // corresponding vertex of a second ring.
    let mat = array![
        [4.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        [1.0, 4.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        [0.0, 1.0, 4.0, 1.0, 0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0, 4.0, 0.0, 0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 0.0, 4.0, 1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0, 1.0, 4.0, 1.0, 0.0],
        [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 4.0, 1.0],
        [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 4.0]
    ];

    // Leaves may have at most rank 4. Singular values below 1E-6 are dropped.
    let params = CompressionParams::new(4, 1E-6);

    // Build the hierarchical matrix.
    let hmat = mat
        .compress_hmatrix(&params, &mut rng)
        .expect("Could not compress the matrix.");

    println!(
        "Tree with {} leaves, depth {} and maximum leaf rank {}.",
        hmat.leaf_count(),
        hmat.depth(),
        hmat.max_leaf_rank()
    );

    // Apply the hierarchical matrix and the dense matrix to the same vector.
    let x = Array1::from_shape_fn(8, |i| 1.0 + i as f64);
    let y = hmat.matvec(x.view()).unwrap();
    let expected = mat.dot(&x);

    println!("H * x = {}", y);
    println!(
        "The relative difference to the dense product is {:1.2E}",
        f64::rel_diff_l2(y.view(), expected.view())
    );

    // Blocks stored with positive rank are shown as 0, zero blocks as 1 and
    // the rank of every leaf as a run of 0.5 along its diagonal.
    println!("Leaf structure:\n{}", hmat.visualize());

    // A larger, less structured example on the 3D grid.
    let grid = grid_3d_matrix::<f64, _>(2, &mut rng);
    let hgrid = grid
        .compress_hmatrix(&CompressionParams::new(8, 1E-6), &mut rng)
        .unwrap();

    let x = Array1::from_shape_fn(grid.ncols(), |i| (i as f64).sin());
    let y = hgrid.matvec(x.view()).unwrap();
    println!(
        "Grid matrix of size {}: compression ratio {:.3}, relative matvec difference {:1.2E}",
        grid.nrows(),
        hgrid.compression_ratio(),
        f64::rel_diff_l2(y.view(), grid.dot(&x).view())
    );
}
