//! Statistical utility functions for the valuation and trend models.
//!
//! This module provides the order statistics and regression primitives used
//! across the workspace: linear-interpolation quantiles, tail means, rounding
//! to a fixed number of decimals, and ordinary least squares slopes.

use ndarray::Array1;

/// Minimum threshold for the variance of a regressor.
/// Values below this threshold are treated as a degenerate (constant) axis.
pub const MIN_VARIANCE_THRESHOLD: f64 = 1e-12;

/// Quantile of `values` using linear interpolation between closest ranks.
///
/// This is Hyndman–Fan definition 7, the default of NumPy and pandas: for
/// `n` sorted values the quantile `q` sits at fractional rank `q * (n - 1)`
/// and is interpolated linearly between its two neighbours.
///
/// Non-finite values are ignored. Returns `None` for an empty input or a `q`
/// outside `[0, 1]`.
///
/// # Examples
///
/// ```
/// use bluechip_traits::stats::quantile;
///
/// let q = quantile(&[0.01, 0.02, 0.03, 0.04, 0.10], 0.25).unwrap();
/// assert!((q - 0.02).abs() < 1e-12);
/// ```
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Arithmetic mean of the finite values, `None` when there are none.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}

/// Round `value` to `decimals` places after the decimal point.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Ordinary least squares fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Estimated slope.
    pub slope: f64,
    /// Estimated intercept.
    pub intercept: f64,
    /// Number of observations used.
    pub n_obs: usize,
}

/// Fit a simple linear regression of `y` on `x`.
///
/// Returns `None` if the inputs differ in length, hold fewer than two points,
/// or `x` has (near) zero variance.
///
/// # Examples
///
/// ```
/// use bluechip_traits::stats::ols;
///
/// let fit = ols(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn ols(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let x = Array1::from_vec(x.to_vec());
    let y = Array1::from_vec(y.to_vec());

    let x_mean = x.mean()?;
    let y_mean = y.mean()?;
    let dx = &x - x_mean;
    let dy = &y - y_mean;

    let sxx = dx.dot(&dx);
    if sxx / (x.len() as f64) < MIN_VARIANCE_THRESHOLD {
        return None;
    }
    let slope = dx.dot(&dy) / sxx;

    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
        n_obs: x.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // rank = 0.25 * 3 = 0.75
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert_relative_eq!(quantile(&values, 0.75).unwrap(), 3.25);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_quantile_ignores_order_and_nan() {
        let values = [0.10, f64::NAN, 0.03, 0.01, 0.04, 0.02];
        assert_relative_eq!(quantile(&values, 0.25).unwrap(), 0.02);
    }

    #[test]
    fn test_quantile_edge_cases() {
        assert!(quantile(&[], 0.5).is_none());
        assert!(quantile(&[1.0], 1.5).is_none());
        assert_relative_eq!(quantile(&[7.0], 0.25).unwrap(), 7.0);
    }

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[1.0, 2.0, 6.0]).unwrap(), 3.0);
        assert!(mean(&[]).is_none());
        assert!(mean(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(0.034_567, 4), 0.0346);
        assert_relative_eq!(round_to(0.012_34, 4), 0.0123);
    }

    #[test]
    fn test_ols_negative_slope() {
        let fit = ols(&[10.0, 17.0, 24.0], &[50.0, 43.0, 36.0]).unwrap();
        assert_relative_eq!(fit.slope, -1.0, epsilon = 1e-12);
        assert_eq!(fit.n_obs, 3);
    }

    #[test]
    fn test_ols_degenerate_inputs() {
        assert!(ols(&[1.0], &[1.0]).is_none());
        assert!(ols(&[1.0, 2.0], &[1.0]).is_none());
        assert!(ols(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }
}
