//! Pearson correlation analysis.
//!
//! # Examples
//!
//! ```
//! use u_statcalc::correlation::pearson;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 3.0, 5.0, 7.0, 8.0];
//!
//! let r = pearson(&x, &y).unwrap();
//! assert!(r.r > 0.8);
//! assert!(r.interpretation.starts_with("Very strong positive"));
//! ```

use crate::error::{StatsError, StatsResult};
use crate::interpret::{interpret_correlation, Significance};
use crate::special;
use crate::stats;
use serde::Serialize;

/// Result of a Pearson correlation analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    /// X series as supplied.
    pub x_values: Vec<f64>,
    /// Y series as supplied.
    pub y_values: Vec<f64>,
    pub n: usize,
    /// Correlation coefficient in [-1, 1].
    #[serde(rename = "correlationCoefficient")]
    pub r: f64,
    pub r_squared: f64,
    /// Two-tailed p-value for H₀: ρ = 0.
    pub p_value: f64,
    #[serde(rename = "meanX")]
    pub mean_x: f64,
    #[serde(rename = "meanY")]
    pub mean_y: f64,
    pub significance: Significance,
    pub interpretation: String,
}

/// Computes the Pearson product-moment correlation, its p-value and a
/// qualitative interpretation.
///
/// # Algorithm
///
/// r = Σ(x−x̄)(y−ȳ) / √(Σ(x−x̄)² · Σ(y−ȳ)²)
///
/// When either series is constant the denominator is zero and r is
/// defined as 0. The p-value uses t = r·√((n−2)/(1−r²)) with df = n−2.
///
/// # Errors
///
/// - [`StatsError::LengthMismatch`] if the slices differ in length.
/// - [`StatsError::InsufficientData`] if fewer than 2 pairs are given.
/// - [`StatsError::NumericDomain`] if any value is not finite.
///
/// # Examples
///
/// ```
/// use u_statcalc::correlation::pearson;
///
/// let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0; 5]).unwrap();
/// assert_eq!(r.r, 0.0); // constant series: no error
/// assert_eq!(r.p_value, 1.0);
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> StatsResult<CorrelationResult> {
    let n = x.len();
    if n != y.len() {
        return Err(StatsError::LengthMismatch {
            left: n,
            right: y.len(),
        });
    }
    if n < 2 {
        return Err(StatsError::InsufficientData { required: 2, got: n });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(StatsError::NumericDomain(
            "correlation inputs must be finite".to_string(),
        ));
    }

    let mean_x = stats::mean(x).ok_or(StatsError::EmptyInput)?;
    let mean_y = stats::mean(y).ok_or(StatsError::EmptyInput)?;

    // Constant series give exactly 0 even if their mean is off by an ulp.
    let r = if is_constant(x) || is_constant(y) {
        0.0
    } else {
        scaled_r(x, y)?
    };
    let p_value = correlation_p_value(r, n)?;

    Ok(CorrelationResult {
        x_values: x.to_vec(),
        y_values: y.to_vec(),
        n,
        r,
        r_squared: r * r,
        p_value,
        mean_x,
        mean_y,
        significance: Significance::from_p_value(p_value),
        interpretation: interpret_correlation(r, p_value),
    })
}

/// r on copies of `x` and `y` divided by powers of two.
///
/// r is invariant to scaling each series, and power-of-two factors are
/// exact, so this gives the same r as the raw data while keeping the sums
/// of squares in range for any finite input.
fn scaled_r(x: &[f64], y: &[f64]) -> StatsResult<f64> {
    let xs = scaled(x);
    let ys = scaled(y);
    let mx = stats::mean(&xs).ok_or(StatsError::EmptyInput)?;
    let my = stats::mean(&ys).ok_or(StatsError::EmptyInput)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in xs.iter().zip(&ys) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if !denominator.is_finite() || !sxy.is_finite() {
        return Err(StatsError::NumericDomain(
            "correlation sums of squares are not finite".to_string(),
        ));
    }
    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok((sxy / denominator).clamp(-1.0, 1.0))
}

/// `data` divided by the largest power of two not above `max |v|`.
fn scaled(data: &[f64]) -> Vec<f64> {
    let largest = data.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if largest == 0.0 {
        return data.to_vec();
    }
    let exponent = (largest.log2().floor() as i32).clamp(-1022, 1023);
    let factor = 2.0_f64.powi(exponent);
    data.iter().map(|v| v / factor).collect()
}

fn is_constant(data: &[f64]) -> bool {
    data.iter().all(|&v| v == data[0])
}

/// Two-tailed p-value for H₀: ρ = 0 via the t transform.
///
/// Two pairs leave no residual degrees of freedom, so p is 1. A perfect
/// correlation would divide by zero in the transform and has p = 0.
fn correlation_p_value(r: f64, n: usize) -> StatsResult<f64> {
    if n < 3 {
        return Ok(1.0);
    }
    let one_minus_r2 = 1.0 - r * r;
    if r.abs() == 1.0 || one_minus_r2 <= 0.0 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / one_minus_r2).sqrt();
    special::t_two_tailed_p_value(t.abs(), df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_positive() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        assert_eq!(r.n, 5);
        assert!((r.r - 1.0).abs() < 1e-4);
        assert!((r.r_squared - 1.0).abs() < 1e-4);
        assert!(r.p_value < 0.05);
        assert_eq!(r.significance, Significance::Significant);
        assert_eq!(r.mean_x, 3.0);
        assert_eq!(r.mean_y, 6.0);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[10.0, 8.0, 6.0, 4.0, 2.0]).unwrap();
        assert!((r.r + 1.0).abs() < 1e-4);
        assert!((r.r_squared - 1.0).abs() < 1e-4);
        assert!(r.interpretation.starts_with("Very strong negative"));
    }

    #[test]
    fn test_pearson_constant_series() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0; 5]).unwrap();
        assert_eq!(r.r, 0.0);
        assert_eq!(r.r_squared, 0.0);
        assert_eq!(r.p_value, 1.0);
        assert_eq!(r.significance, Significance::NotSignificant);
        assert_eq!(
            r.interpretation,
            "Very weak no correlation (not statistically significant)"
        );

        let both = pearson(&[2.0; 4], &[7.0; 4]).unwrap();
        assert_eq!(both.r, 0.0);
    }

    #[test]
    fn test_pearson_moderate_positive() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 3.0, 5.0, 7.0, 8.0]).unwrap();
        // sxy = 16, sxx = 10, syy = 26
        let expected = 16.0 / (260.0_f64).sqrt();
        assert!((r.r - expected).abs() < 1e-12);
        assert!(r.r > 0.8);
        assert!(r.p_value < 0.05, "p = {}", r.p_value);
    }

    #[test]
    fn test_pearson_p_value_matches_t_transform() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 1.0, 4.0, 3.0, 7.0, 5.0];
        let r = pearson(&x, &y).unwrap();
        let t = r.r * (4.0 / (1.0 - r.r * r.r)).sqrt();
        let p = special::t_two_tailed_p_value(t, 4.0).unwrap();
        assert!((r.p_value - p).abs() < 1e-15);
    }

    #[test]
    fn test_pearson_two_points() {
        let r = pearson(&[1.0, 2.0], &[3.0, 5.0]).unwrap();
        assert!((r.r - 1.0).abs() < 1e-12);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_pearson_length_mismatch() {
        let err = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0]).unwrap_err();
        assert_eq!(err, StatsError::LengthMismatch { left: 5, right: 3 });
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn test_pearson_insufficient_data() {
        let err = pearson(&[5.0], &[10.0]).unwrap_err();
        assert_eq!(err, StatsError::InsufficientData { required: 2, got: 1 });
        assert!(err.to_string().contains("at least 2"));
        assert!(pearson(&[], &[]).is_err());
    }

    #[test]
    fn test_pearson_huge_values() {
        let r = pearson(&[1e200, 2e200, 3e200, 4e200], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!((r.r - 1.0).abs() < 1e-12, "r = {}", r.r);
        assert_eq!(r.significance, Significance::Significant);

        let r = pearson(&[f64::MAX, -f64::MAX, f64::MAX], &[1.0, -1.0, 1.0]).unwrap();
        assert!((r.r - 1.0).abs() < 1e-12, "r = {}", r.r);
    }

    #[test]
    fn test_pearson_tiny_values() {
        let r = pearson(&[1e-300, 2e-300, 3e-300, 4e-300], &[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!((r.r + 1.0).abs() < 1e-12, "r = {}", r.r);
    }

    #[test]
    fn test_pearson_non_finite() {
        assert!(matches!(
            pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::NumericDomain(_))
        ));
    }
}
