//! Hypothesis testing: one-sample t-test and chi-squared goodness of fit.
//!
//! Both tests validate their inputs completely before any arithmetic and
//! report p-values computed by [`crate::special`].
//!
//! # Examples
//!
//! ```
//! use u_statcalc::ingest::NumericSample;
//! use u_statcalc::testing::one_sample_t_test;
//!
//! let data = NumericSample::new(vec![5.1, 4.9, 5.2, 5.0, 4.8, 5.3, 5.1, 4.9]).unwrap();
//! let result = one_sample_t_test(&data, 5.0).unwrap();
//! assert!(result.p_value > 0.05); // cannot reject H₀: μ = 5.0
//! ```

use crate::error::{StatsError, StatsResult};
use crate::ingest::NumericSample;
use crate::interpret::Significance;
use crate::special;
use crate::stats;
use serde::Serialize;
use tracing::debug;

/// Observed and expected totals closer than this are treated as equal.
pub const SUM_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// t-test
// ---------------------------------------------------------------------------

/// Result of a one-sample t-test.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TTestResult {
    #[serde(rename = "sampleSize")]
    pub n: usize,
    pub sample_mean: f64,
    /// Hypothesized population mean μ₀.
    pub population_mean: f64,
    #[serde(rename = "sampleStdDev")]
    pub sample_std_dev: f64,
    pub standard_error: f64,
    pub t_statistic: f64,
    #[serde(rename = "degreesOfFreedom")]
    pub df: usize,
    /// Two-tailed p-value.
    pub p_value: f64,
    pub significance: Significance,
    /// The sample as supplied.
    pub sample_data: Vec<f64>,
    /// μ₀ as supplied; left unrounded in presented reports.
    pub pop_mean: f64,
}

/// One-sample t-test: H₀: μ = μ₀.
///
/// # Algorithm
///
/// t = (x̄ − μ₀) / (s / √n), df = n − 1, two-tailed p-value from
/// [`special::t_two_tailed_p_value`].
///
/// # Errors
///
/// - [`StatsError::InsufficientData`] if the sample has fewer than 2
///   observations.
/// - [`StatsError::NumericDomain`] if `population_mean` is not finite.
/// - [`StatsError::ZeroStandardError`] if every observation is identical.
///
/// # Examples
///
/// ```
/// use u_statcalc::ingest::NumericSample;
/// use u_statcalc::interpret::Significance;
/// use u_statcalc::testing::one_sample_t_test;
///
/// let data = NumericSample::new(vec![10.0, 12.0, 14.0, 16.0, 18.0]).unwrap();
/// let r = one_sample_t_test(&data, 5.0).unwrap();
/// assert_eq!(r.df, 4);
/// assert_eq!(r.significance, Significance::Significant);
/// ```
pub fn one_sample_t_test(sample: &NumericSample, population_mean: f64) -> StatsResult<TTestResult> {
    let data = sample.values();
    let n = data.len();
    if n < 2 {
        return Err(StatsError::InsufficientData { required: 2, got: n });
    }
    if !population_mean.is_finite() {
        return Err(StatsError::NumericDomain(format!(
            "hypothesized mean must be finite, got {population_mean}"
        )));
    }

    let sample_mean = stats::mean(data).ok_or(StatsError::EmptyInput)?;
    let sample_std_dev =
        stats::std_dev(data).ok_or(StatsError::InsufficientData { required: 2, got: n })?;
    let standard_error = sample_std_dev / (n as f64).sqrt();
    if standard_error == 0.0 {
        return Err(StatsError::ZeroStandardError);
    }

    let t_statistic = (sample_mean - population_mean) / standard_error;
    let df = n - 1;
    let p_value = special::t_two_tailed_p_value(t_statistic.abs(), df as f64)?;

    Ok(TTestResult {
        n,
        sample_mean,
        population_mean,
        sample_std_dev,
        standard_error,
        t_statistic,
        df,
        p_value,
        significance: Significance::from_p_value(p_value),
        sample_data: data.to_vec(),
        pop_mean: population_mean,
    })
}

// ---------------------------------------------------------------------------
// Chi-squared goodness of fit
// ---------------------------------------------------------------------------

/// Result of a chi-squared goodness-of-fit test.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChiSquareResult {
    pub observed: Vec<f64>,
    /// Expected frequencies actually used, after any rescaling.
    pub expected: Vec<f64>,
    #[serde(rename = "chiSquareStatistic")]
    pub statistic: f64,
    #[serde(rename = "degreesOfFreedom")]
    pub df: usize,
    pub categories: usize,
    pub p_value: f64,
    pub significance: Significance,
    pub observed_sum: f64,
    /// Total of the expected frequencies as supplied.
    pub expected_sum: f64,
    /// Total of the expected frequencies used for the statistic.
    pub normalized_expected_sum: f64,
    /// Whether the expected frequencies were rescaled to the observed total.
    pub rescaled: bool,
}

/// Chi-squared goodness-of-fit test: H₀: observed follows expected.
///
/// # Algorithm
///
/// If the totals differ by more than [`SUM_TOLERANCE`], every expected
/// frequency is multiplied by `Σobserved / Σexpected` first, which keeps
/// the expected proportions while matching the observed total. Then
/// χ² = Σ (Oᵢ − Eᵢ)² / Eᵢ with df = k − 1.
///
/// A single category has df = 0 and a statistic of 0 after rescaling; its
/// p-value is reported as 1.
///
/// # Errors
///
/// - [`StatsError::LengthMismatch`] if the slices differ in length.
/// - [`StatsError::EmptyInput`] if both are empty.
/// - [`StatsError::NumericDomain`] if any value is not finite.
/// - [`StatsError::NonPositiveExpected`] if any expected frequency is
///   ≤ 0, before or after rescaling.
///
/// # Examples
///
/// ```
/// use u_statcalc::testing::chi_squared_goodness_of_fit;
///
/// // Expected given against a different total: rescaled to 140.
/// let r = chi_squared_goodness_of_fit(&[20.0, 30.0, 40.0, 50.0], &[10.0; 4]).unwrap();
/// assert!(r.rescaled);
/// assert!((r.normalized_expected_sum - 140.0).abs() < 1e-9);
/// assert_eq!(r.df, 3);
/// ```
pub fn chi_squared_goodness_of_fit(
    observed: &[f64],
    expected: &[f64],
) -> StatsResult<ChiSquareResult> {
    let k = observed.len();
    if k != expected.len() {
        return Err(StatsError::LengthMismatch {
            left: k,
            right: expected.len(),
        });
    }
    if k == 0 {
        return Err(StatsError::EmptyInput);
    }
    if observed.iter().chain(expected).any(|v| !v.is_finite()) {
        return Err(StatsError::NumericDomain(
            "frequencies must be finite".to_string(),
        ));
    }
    if let Some((index, &value)) = expected.iter().enumerate().find(|(_, &e)| e <= 0.0) {
        return Err(StatsError::NonPositiveExpected { index, value });
    }

    let observed_sum = stats::kahan_sum(observed);
    let expected_sum = stats::kahan_sum(expected);

    let rescaled = (observed_sum - expected_sum).abs() > SUM_TOLERANCE;
    let expected_used: Vec<f64> = if rescaled {
        let factor = observed_sum / expected_sum;
        if factor <= 0.0 {
            return Err(StatsError::NonPositiveExpected {
                index: 0,
                value: expected[0] * factor,
            });
        }
        debug!(
            observed_sum,
            expected_sum, factor, "rescaling expected frequencies to the observed total"
        );
        expected.iter().map(|&e| e * factor).collect()
    } else {
        expected.to_vec()
    };

    let statistic: f64 = observed
        .iter()
        .zip(&expected_used)
        .map(|(&o, &e)| (o - e).powi(2) / e)
        .sum();

    let df = k - 1;
    let p_value = if df == 0 {
        1.0
    } else {
        special::chi_squared_sf(statistic, df as f64)?
    };

    Ok(ChiSquareResult {
        observed: observed.to_vec(),
        normalized_expected_sum: stats::kahan_sum(&expected_used),
        expected: expected_used,
        statistic,
        df,
        categories: k,
        p_value,
        significance: Significance::from_p_value(p_value),
        observed_sum,
        expected_sum,
        rescaled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(v: &[f64]) -> NumericSample {
        NumericSample::new(v.to_vec()).unwrap()
    }

    // -----------------------------------------------------------------------
    // One-sample t-test
    // -----------------------------------------------------------------------

    #[test]
    fn test_t_test_significant_difference() {
        let r = one_sample_t_test(&sample(&[10.0, 12.0, 14.0, 16.0, 18.0]), 5.0).unwrap();
        assert_eq!(r.n, 5);
        assert_eq!(r.sample_mean, 14.0);
        assert_eq!(r.population_mean, 5.0);
        assert_eq!(r.sample_data, vec![10.0, 12.0, 14.0, 16.0, 18.0]);
        assert_eq!(r.pop_mean, 5.0);
        assert_eq!(r.df, 4);
        assert!((r.sample_std_dev - 10.0_f64.sqrt()).abs() < 1e-12);
        assert!((r.standard_error - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((r.t_statistic - 9.0 / 2.0_f64.sqrt()).abs() < 1e-10);
        // p = 2·P(T₄ > 6.364) ≈ 0.0031256
        assert!((r.p_value - 0.0031256).abs() < 1e-6, "p = {}", r.p_value);
        assert_eq!(r.significance, Significance::Significant);
    }

    #[test]
    fn test_t_test_not_significant() {
        let r = one_sample_t_test(&sample(&[5.0, 5.1, 4.9, 5.0, 5.0]), 5.0).unwrap();
        assert!(r.p_value > 0.05);
        assert_eq!(r.significance, Significance::NotSignificant);
    }

    #[test]
    fn test_t_test_moderate_effect() {
        let r = one_sample_t_test(&sample(&[2.3, 2.5, 2.7, 2.9, 3.1]), 2.5).unwrap();
        assert!((r.sample_mean - 2.7).abs() < 1e-12);
        assert!((r.t_statistic - 2.0_f64.sqrt()).abs() < 1e-9);
        // p = 2·P(T₄ > √2) ≈ 0.2302
        assert!((r.p_value - 0.2302).abs() < 1e-3, "p = {}", r.p_value);
    }

    #[test]
    fn test_t_test_sign_of_statistic() {
        let r = one_sample_t_test(&sample(&[1.0, 2.0, 3.0]), 10.0).unwrap();
        assert!(r.t_statistic < 0.0);
        assert!(r.p_value < 0.05);
    }

    #[test]
    fn test_t_test_insufficient_data() {
        let err = one_sample_t_test(&sample(&[5.0]), 4.0).unwrap_err();
        assert_eq!(err, StatsError::InsufficientData { required: 2, got: 1 });
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_t_test_constant_sample() {
        assert_eq!(
            one_sample_t_test(&sample(&[3.0, 3.0, 3.0]), 1.0).unwrap_err(),
            StatsError::ZeroStandardError
        );
    }

    #[test]
    fn test_t_test_non_finite_mean() {
        assert!(matches!(
            one_sample_t_test(&sample(&[1.0, 2.0]), f64::NAN),
            Err(StatsError::NumericDomain(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Chi-squared goodness of fit
    // -----------------------------------------------------------------------

    #[test]
    fn test_chi2_equal_frequencies() {
        let f = [10.0, 20.0, 30.0, 40.0];
        let r = chi_squared_goodness_of_fit(&f, &f).unwrap();
        assert!(r.statistic.abs() < 1e-4);
        assert!(r.p_value > 0.95);
        assert!(!r.rescaled);
        assert_eq!(r.df, 3);
        assert_eq!(r.categories, 4);
        assert_eq!(r.significance, Significance::NotSignificant);
    }

    #[test]
    fn test_chi2_rescales_expected() {
        let r = chi_squared_goodness_of_fit(&[20.0, 30.0, 40.0, 50.0], &[10.0; 4]).unwrap();
        assert!(r.rescaled);
        assert_eq!(r.observed_sum, 140.0);
        assert_eq!(r.expected_sum, 40.0);
        assert!((r.normalized_expected_sum - 140.0).abs() < 1e-9);
        for &e in &r.expected {
            assert!((e - 35.0).abs() < 1e-12);
        }
        assert!((r.statistic - 500.0 / 35.0).abs() < 1e-10);
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
    }

    #[test]
    fn test_chi2_rescale_preserves_proportions() {
        // Expected supplied as proportions.
        let r = chi_squared_goodness_of_fit(&[50.0, 30.0, 20.0], &[0.5, 0.3, 0.2]).unwrap();
        assert!(r.rescaled);
        assert!((r.expected[0] - 50.0).abs() < 1e-9);
        assert!((r.expected[1] - 30.0).abs() < 1e-9);
        assert!((r.expected[2] - 20.0).abs() < 1e-9);
        assert!(r.statistic.abs() < 1e-12);
    }

    #[test]
    fn test_chi2_within_tolerance_is_not_rescaled() {
        let r = chi_squared_goodness_of_fit(&[10.0, 10.0], &[10.0, 10.0 + 1e-9]).unwrap();
        assert!(!r.rescaled);
        assert_eq!(r.expected, vec![10.0, 10.0 + 1e-9]);
    }

    #[test]
    fn test_chi2_significant() {
        let r = chi_squared_goodness_of_fit(&[90.0, 10.0], &[50.0, 50.0]).unwrap();
        assert!((r.statistic - 64.0).abs() < 1e-12);
        assert!(r.p_value < 0.001, "p = {}", r.p_value);
        assert_eq!(r.significance, Significance::Significant);
    }

    #[test]
    fn test_chi2_single_category() {
        let r = chi_squared_goodness_of_fit(&[7.0], &[3.0]).unwrap();
        assert_eq!(r.df, 0);
        assert!(r.statistic.abs() < 1e-12);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_chi2_length_mismatch() {
        let err = chi_squared_goodness_of_fit(&[10.0, 20.0, 30.0], &[10.0, 20.0]).unwrap_err();
        assert_eq!(err, StatsError::LengthMismatch { left: 3, right: 2 });
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn test_chi2_empty() {
        assert_eq!(
            chi_squared_goodness_of_fit(&[], &[]).unwrap_err(),
            StatsError::EmptyInput
        );
    }

    #[test]
    fn test_chi2_non_positive_expected() {
        assert_eq!(
            chi_squared_goodness_of_fit(&[10.0, 20.0, 30.0], &[0.0, 10.0, 20.0]).unwrap_err(),
            StatsError::NonPositiveExpected { index: 0, value: 0.0 }
        );
        assert_eq!(
            chi_squared_goodness_of_fit(&[10.0, 20.0, 30.0], &[10.0, -5.0, 20.0]).unwrap_err(),
            StatsError::NonPositiveExpected { index: 1, value: -5.0 }
        );
    }

    #[test]
    fn test_chi2_zero_observed_total() {
        assert!(matches!(
            chi_squared_goodness_of_fit(&[0.0, 0.0], &[1.0, 1.0]),
            Err(StatsError::NonPositiveExpected { .. })
        ));
    }

    #[test]
    fn test_chi2_non_finite() {
        assert!(matches!(
            chi_squared_goodness_of_fit(&[1.0, f64::INFINITY], &[1.0, 1.0]),
            Err(StatsError::NumericDomain(_))
        ));
    }
}
