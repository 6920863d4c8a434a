use ndarray::{Array1, Array2};
use ndarray_linalg::LeastSquaresSvd;

use crate::Result;

/// Generate the degree one Vandermonde matrix for observations `x`
///
/// The result is an (n x 2) matrix. Each row is `[1, x_i]`, so the least-squares solution of
/// `V c = y` is the coefficient vector `[intercept, slope]` of the best straight line.
///
/// # Examples
///
/// ```
/// use level_calibration::math::design_matrix;
/// use ndarray::{arr1, arr2};
///
/// let observations = arr1(&[2., 3.]);
/// let vander = design_matrix(&observations);
///
/// let expected = arr2(&[[1., 2.], [1., 3.]]);
/// assert_eq!(vander, expected);
/// ```
pub fn design_matrix(x: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((x.len(), 2), |(ii, jj)| if jj == 0 { 1.0 } else { x[ii] })
}

/// Solve the overdetermined system `V c = y` in the least-squares sense using LAPACK
///
/// Returns the coefficients in ascending power order.
///
/// # Errors
/// Returns an error if LAPACK fails to converge on the solution.
///
/// # Examples
///
/// ```
/// use level_calibration::math::least_squares;
/// use ndarray::arr1;
///
/// let x = arr1(&[0., 1., 2., 3.]);
/// let y = arr1(&[1., 3., 5., 7.]);
/// let coeffs = least_squares(&x, &y).unwrap();
///
/// assert!((coeffs[0] - 1.0).abs() < 1e-10);
/// assert!((coeffs[1] - 2.0).abs() < 1e-10);
/// ```
pub fn least_squares(x: &Array1<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    let vandermonde = design_matrix(x);
    let result = vandermonde.least_squares(y)?;
    Ok(result.solution)
}

/// Sum of products of deviations from the respective means, $\sum (u_i - \bar u)(v_i - \bar v)$
///
/// `u` and `v` must have equal, non-zero length.
///
/// # Examples
///
/// ```
/// use level_calibration::math::centred_cross_sum;
/// use ndarray::arr1;
///
/// let x = arr1(&[1., 2., 3.]);
/// let y = arr1(&[2., 4., 6.]);
/// assert_eq!(centred_cross_sum(&x, &y), 4.0);
/// ```
pub fn centred_cross_sum(u: &Array1<f64>, v: &Array1<f64>) -> f64 {
    let u_mean = u.sum() / u.len() as f64;
    let v_mean = v.sum() / v.len() as f64;
    u.iter()
        .zip(v.iter())
        .map(|(ui, vi)| (ui - u_mean) * (vi - v_mean))
        .sum()
}

/// Whether every element of `values` equals the first
///
/// The comparison is exact, a series constant in value but not in representation (such as
/// `0.1` repeated) is still detected because each element holds the same bits.
///
/// # Examples
///
/// ```
/// use level_calibration::math::is_constant;
/// use ndarray::arr1;
///
/// assert!(is_constant(&arr1(&[0.7, 0.7, 0.7])));
/// assert!(!is_constant(&arr1(&[0.7, 0.7, 0.8])));
/// ```
#[allow(clippy::float_cmp)]
pub fn is_constant(values: &Array1<f64>) -> bool {
    values.first().map_or(true, |first| values.iter().all(|v| v == first))
}

/// Largest absolute value in `values`, zero for an empty array
///
/// # Examples
///
/// ```
/// use level_calibration::math::max_abs;
/// use ndarray::arr1;
///
/// assert_eq!(max_abs(&arr1(&[0.5, -3.0, 2.0])), 3.0);
/// ```
pub fn max_abs(values: &Array1<f64>) -> f64 {
    values.iter().fold(0.0, |acc, v| acc.max(v.abs()))
}
