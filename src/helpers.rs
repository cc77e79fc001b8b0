//! Relative error measures used by tests, demos and benchmarks.

use crate::dense::{frobenius_norm, l2_norm};
use ndarray::{ArrayView1, ArrayView2};

pub trait RelDiff {
    type A;

    /// Return the relative Frobenius norm difference of `first` and `second`.
    fn rel_diff_fro(first: ArrayView2<Self::A>, second: ArrayView2<Self::A>) -> Self::A;

    /// Return the relative l2 vector norm difference of `first` and `second`.
    fn rel_diff_l2(first: ArrayView1<Self::A>, second: ArrayView1<Self::A>) -> Self::A;
}

macro_rules! rel_diff_impl {
    ($scalar:ty) => {
        impl RelDiff for $scalar {
            type A = $scalar;
            fn rel_diff_fro(first: ArrayView2<Self::A>, second: ArrayView2<Self::A>) -> Self::A {
                let diff = first.to_owned() - &second;
                frobenius_norm(&diff) / frobenius_norm(&second)
            }

            fn rel_diff_l2(first: ArrayView1<Self::A>, second: ArrayView1<Self::A>) -> Self::A {
                let diff = first.to_owned() - &second;
                l2_norm(&diff) / l2_norm(&second)
            }
        }
    };
}

rel_diff_impl!(f32);
rel_diff_impl!(f64);
