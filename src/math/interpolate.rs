use ndarray::{ArrayD, ArrayViewD, Zip};
use num_traits::Float;

/// Generic linear interpolation between two values
pub fn lin_interp<T: Float>(v0: T, v1: T, fac: T) -> T {
    v0 + (v1 - v0) * fac
}

/// Linear interpolation between two points (traditional interface)
pub fn linear_interpolate(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    if (x1 - x0).abs() < f64::EPSILON {
        return y0; // Avoid division by zero
    }
    let fac = (x - x0) / (x1 - x0);
    lin_interp(y0, y1, fac)
}

/// Parallel linear interpolation between two equally-shaped snapshots
/// Uses Zip + par_for_each for SIMD/parallel processing
pub fn lin_interp_array<T>(v0: ArrayViewD<T>, v1: ArrayViewD<T>, fac: T) -> ArrayD<T>
where
    T: Float + Send + Sync,
{
    let mut result = ArrayD::zeros(v0.raw_dim());

    Zip::from(&mut result)
        .and(&v0)
        .and(&v1)
        .par_for_each(|res, &val0, &val1| {
            *res = lin_interp(val0, val1, fac);
        });

    result
}

/// Generic bilinear interpolation
/// Interpolates between four corner values using two interpolation factors
pub fn bilin_interp<T: Float>(f00: T, f01: T, f10: T, f11: T, fac_x: T, fac_y: T) -> T {
    let f_y0 = lin_interp(f00, f10, fac_x);
    let f_y1 = lin_interp(f01, f11, fac_x);
    lin_interp(f_y0, f_y1, fac_y)
}

/// Bilinear interpolation in 2D grid (traditional interface)
pub fn bilinear_interpolate(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64, // Grid coordinates
    f00: f64,
    f01: f64,
    f10: f64,
    f11: f64, // Function values at grid corners
    x: f64,
    y: f64, // Interpolation point
) -> f64 {
    let dx = x1 - x0;
    let dy = y1 - y0;

    if dx.abs() < f64::EPSILON || dy.abs() < f64::EPSILON {
        return f00; // Degenerate case
    }

    let fac_x = (x - x0) / dx;
    let fac_y = (y - y0) / dy;

    bilin_interp(f00, f01, f10, f11, fac_x, fac_y)
}

/// Find bracketing indices and interpolation weight on a sorted coordinate
/// axis. Targets outside the axis clamp to the nearest end with weight 0.
pub fn find_grid_indices(coords: &[f64], target: f64) -> (usize, usize, f64) {
    if coords.is_empty() {
        return (0, 0, 0.0);
    }

    // Handle extrapolation cases
    if target <= coords[0] {
        return (0, 0, 0.0);
    }
    if target >= coords[coords.len() - 1] {
        let last = coords.len() - 1;
        return (last, last, 0.0);
    }

    // Binary search for insertion point
    let mut left = 0;
    let mut right = coords.len() - 1;

    while right - left > 1 {
        let mid = (left + right) / 2;
        if coords[mid] <= target {
            left = mid;
        } else {
            right = mid;
        }
    }

    // Calculate weight
    let weight = (target - coords[left]) / (coords[right] - coords[left]);

    (left, right, weight)
}

/// Inverse-distance weights for a target point against a set of source
/// points (2D). An exact hit gets full weight.
pub fn idw_weights(sources: &[[f64; 2]], x: f64, y: f64) -> Vec<f64> {
    let d: Vec<f64> = sources
        .iter()
        .map(|p| ((p[0] - x).powi(2) + (p[1] - y).powi(2)).sqrt())
        .collect();

    if let Some(hit) = d.iter().position(|&di| di < 1e-12) {
        let mut w = vec![0.0; sources.len()];
        w[hit] = 1.0;
        return w;
    }

    let inv: Vec<f64> = d.iter().map(|&di| 1.0 / di).collect();
    let total: f64 = inv.iter().sum();
    inv.iter().map(|&wi| wi / total).collect()
}
