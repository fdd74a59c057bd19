//! Lane-based reductions used by the aggregation engine.
//!
//! A reduction is a function over one lane (`&[T] -> T`); `reduce_axes`
//! applies it along one or several axes at once. Reducing several axes
//! flattens them into a single lane so order-sensitive statistics (std,
//! quantiles) are computed jointly, not as a fold of per-axis folds.

use ndarray::{ArrayD, Axis, Dimension, IxDyn};
use num_traits::Float;

use std::cmp::Ordering;

/// Reduce the given axes away with a lane function.
///
/// The kept axes preserve their relative order; lane elements are visited in
/// row-major order of the reduced axes.
pub fn reduce_axes<T, F>(data: &ArrayD<T>, axes: &[usize], f: F) -> ArrayD<T>
where
    T: Copy,
    F: Fn(&[T]) -> T,
{
    let ndim = data.ndim();
    let mut reduced: Vec<usize> = axes.to_vec();
    reduced.sort_unstable();
    reduced.dedup();

    let kept: Vec<usize> = (0..ndim).filter(|i| !reduced.contains(i)).collect();
    let mut perm = kept.clone();
    perm.extend(&reduced);

    let v = data.view().permuted_axes(IxDyn(&perm));
    let kept_shape: Vec<usize> = kept.iter().map(|&i| data.shape()[i]).collect();

    ArrayD::from_shape_fn(IxDyn(&kept_shape), |idx| {
        let mut sub = v.view();
        for &i in idx.slice() {
            sub = sub.index_axis_move(Axis(0), i);
        }
        let lane: Vec<T> = sub.iter().copied().collect();
        f(&lane)
    })
}

pub fn max_lane<T: Float>(xs: &[T]) -> T {
    xs.iter().fold(T::neg_infinity(), |a, &b| a.max(b))
}

pub fn min_lane<T: Float>(xs: &[T]) -> T {
    xs.iter().fold(T::infinity(), |a, &b| a.min(b))
}

pub fn mean_lane<T: Float>(xs: &[T]) -> T {
    if xs.is_empty() {
        return T::nan();
    }
    let sum = xs.iter().fold(T::zero(), |a, &b| a + b);
    sum / T::from(xs.len()).unwrap_or_else(T::one)
}

/// Population standard deviation (ddof = 0)
pub fn std_lane<T: Float>(xs: &[T]) -> T {
    if xs.is_empty() {
        return T::nan();
    }
    let m = mean_lane(xs);
    let var = xs
        .iter()
        .fold(T::zero(), |a, &b| a + (b - m) * (b - m))
        / T::from(xs.len()).unwrap_or_else(T::one);
    var.sqrt()
}

/// Range (max - min), peak to peak
pub fn ptp_lane<T: Float>(xs: &[T]) -> T {
    max_lane(xs) - min_lane(xs)
}

pub fn nanmax_lane<T: Float>(xs: &[T]) -> T {
    let kept: Vec<T> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    if kept.is_empty() {
        T::nan()
    } else {
        max_lane(&kept)
    }
}

pub fn nanmin_lane<T: Float>(xs: &[T]) -> T {
    let kept: Vec<T> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    if kept.is_empty() {
        T::nan()
    } else {
        min_lane(&kept)
    }
}

pub fn nanmean_lane<T: Float>(xs: &[T]) -> T {
    let kept: Vec<T> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    mean_lane(&kept)
}

pub fn nanstd_lane<T: Float>(xs: &[T]) -> T {
    let kept: Vec<T> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    std_lane(&kept)
}

/// Linear-interpolated quantile at level `q` in [0, 1]; any NaN makes the
/// result NaN (use `nanquantile_lane` to skip NaNs)
pub fn quantile_lane<T: Float>(xs: &[T], q: f64) -> T {
    if xs.is_empty() || xs.iter().any(|x| x.is_nan()) {
        return T::nan();
    }
    let mut sorted: Vec<T> = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = T::from(pos - lo as f64).unwrap_or_else(T::zero);
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn nanquantile_lane<T: Float>(xs: &[T], q: f64) -> T {
    let kept: Vec<T> = xs.iter().copied().filter(|x| !x.is_nan()).collect();
    quantile_lane(&kept, q)
}

/// Weighted mean; `weights` must have the lane's length
pub fn weighted_mean_lane<T: Float>(xs: &[T], weights: &[f64]) -> T {
    if xs.is_empty() || xs.len() != weights.len() {
        return T::nan();
    }
    let mut num = T::zero();
    let mut den = T::zero();
    for (&x, &w) in xs.iter().zip(weights.iter()) {
        let w = T::from(w).unwrap_or_else(T::zero);
        num = num + x * w;
        den = den + w;
    }
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn arr(shape: &[usize], values: Vec<f64>) -> ArrayD<f64> {
        ArrayD::from_shape_vec(IxDyn(shape), values).unwrap()
    }

    #[test]
    fn test_reduce_single_axis() {
        let a = arr(&[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let m = reduce_axes(&a, &[0], mean_lane);
        assert_eq!(m.shape(), &[3]);
        assert_eq!(m.as_slice().unwrap(), &[2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_reduce_two_axes_jointly() {
        let a = arr(&[2, 2, 2], (1..=8).map(|v| v as f64).collect());
        let s = reduce_axes(&a, &[1, 2], std_lane);
        assert_eq!(s.shape(), &[2]);
        // joint std of [1,2,3,4] is sqrt(1.25), not a std-of-std
        let expected = 1.25f64.sqrt();
        assert!((s[[0]] - expected).abs() < 1e-12);
        assert!((s[[1]] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_all_axes() {
        let a = arr(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]);
        let total = reduce_axes(&a, &[0, 1], max_lane);
        assert_eq!(total.ndim(), 0);
        assert_eq!(total[IxDyn(&[])], 4.0);
    }

    #[test]
    fn test_quantile_lane_extremes_match_min_max() {
        let xs = [3.0, 1.0, 4.0, 1.5, 9.0];
        assert_eq!(quantile_lane(&xs, 0.0), min_lane(&xs));
        assert_eq!(quantile_lane(&xs, 1.0), max_lane(&xs));
        assert!((quantile_lane(&xs, 0.5) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_variants_skip_nan() {
        let xs = [1.0, f64::NAN, 3.0];
        assert!(mean_lane(&xs).is_nan());
        assert_eq!(nanmean_lane(&xs), 2.0);
        assert_eq!(nanmax_lane(&xs), 3.0);
        assert_eq!(nanmin_lane(&xs), 1.0);
        assert!(quantile_lane(&xs, 0.5).is_nan());
        assert_eq!(nanquantile_lane(&xs, 0.5), 2.0);
    }

    #[test]
    fn test_weighted_mean() {
        let xs = [2.0, 4.0];
        assert_eq!(weighted_mean_lane(&xs, &[1.0, 3.0]), 3.5);
    }
}
