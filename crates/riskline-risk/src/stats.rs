//! Sample statistics shared by the metric, regression and rolling modules.
//!
//! Every dispersion measure here uses Bessel's correction (divide by n - 1)
//! and returns `None` below two observations.

use ndarray::ArrayView1;

/// Arithmetic mean, `None` for an empty series.
pub fn mean(values: ArrayView1<'_, f64>) -> Option<f64> {
    values.mean()
}

/// Sample variance (ddof = 1).
pub fn sample_variance(values: ArrayView1<'_, f64>) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.var(1.0))
}

/// Sample variance (ddof = 1), `None` when the spread is rounding noise.
///
/// A series whose squared deviations vanish against its raw second moment
/// (see [`is_negligible_spread`]) has no usable dispersion, even if the
/// computed variance is a tiny positive number.
pub fn dispersion_variance(values: ArrayView1<'_, f64>) -> Option<f64> {
    let variance = sample_variance(values)?;
    let centered = variance * (values.len() - 1) as f64;
    let raw = values.dot(&values);
    (!is_negligible_spread(centered, raw)).then_some(variance)
}

/// Sample standard deviation (ddof = 1), `None` when the spread is
/// rounding noise.
pub fn dispersion_std(values: ArrayView1<'_, f64>) -> Option<f64> {
    dispersion_variance(values).map(f64::sqrt)
}

/// Whether a centered sum of squares `Σ(x - x̄)²` is indistinguishable from
/// zero relative to the raw sum of squares `Σx²`.
pub fn is_negligible_spread(centered: f64, raw: f64) -> bool {
    !centered.is_finite() || centered <= f64::EPSILON * raw
}

/// Sample standard deviation (ddof = 1).
pub fn sample_std(values: ArrayView1<'_, f64>) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Sample covariance (ddof = 1). `None` when the lengths differ or fewer
/// than two pairs are available.
pub fn sample_covariance(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let x_mean = x.mean()?;
    let y_mean = y.mean()?;
    let cross: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - x_mean) * (b - y_mean))
        .sum();
    Some(cross / (x.len() - 1) as f64)
}

/// `numerator / denominator`, or `None` when the denominator is zero or the
/// quotient is not finite.
pub fn checked_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    #[test]
    fn test_sample_variance_uses_bessel_correction() {
        let values = array![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(sample_variance(values.view()).unwrap(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(
            sample_std(values.view()).unwrap(),
            2.5_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_short_series_have_no_dispersion() {
        assert_eq!(sample_variance(array![1.0].view()), None);
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(sample_std(empty.view()), None);
        assert_eq!(mean(empty.view()), None);
    }

    #[test]
    fn test_sample_covariance() {
        let x = array![1.0, 2.0, 3.0];
        let y = array![2.0, 4.0, 6.0];
        assert_relative_eq!(sample_covariance(x.view(), y.view()).unwrap(), 2.0);
        assert_relative_eq!(
            sample_covariance(x.view(), x.view()).unwrap(),
            sample_variance(x.view()).unwrap(),
            epsilon = 1e-12
        );
        assert_eq!(sample_covariance(x.view(), array![1.0].view()), None);
    }

    #[test]
    fn test_constant_growth_has_no_dispersion() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let returns: Array1<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

        assert_eq!(dispersion_variance(returns.view()), None);
        assert_eq!(dispersion_std(returns.view()), None);
        assert_eq!(dispersion_variance(array![0.0, 0.0, 0.0].view()), None);
    }

    #[test]
    fn test_real_spread_is_kept() {
        let values = array![0.01, -0.02, 0.03, 0.0, 0.015];
        assert_relative_eq!(
            dispersion_variance(values.view()).unwrap(),
            sample_variance(values.view()).unwrap(),
            epsilon = 1e-15
        );
        assert!(!is_negligible_spread(1e-10, 1e-4));
        assert!(is_negligible_spread(1e-35, 1e-4));
        assert!(is_negligible_spread(f64::NAN, 1.0));
    }

    #[test]
    fn test_checked_ratio() {
        assert_eq!(checked_ratio(1.0, 4.0), Some(0.25));
        assert_eq!(checked_ratio(1.0, 0.0), None);
        assert_eq!(checked_ratio(f64::NAN, 1.0), None);
        assert_eq!(checked_ratio(f64::MAX, 1e-300), None);
    }
}
