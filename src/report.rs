//! Presentation boundary: rounding and the tagged report record.
//!
//! Analyses keep full precision. Consumers of the serialized output expect
//! real-valued fields rounded to [`REPORT_DECIMALS`] places, so rounding
//! happens here and nowhere else. Counts, degrees of freedom and the
//! echoed input series are never rounded.

use crate::correlation::CorrelationResult;
use crate::stats::{DescriptiveSummary, Mode};
use crate::testing::{ChiSquareResult, TTestResult};
use serde::Serialize;

/// Decimal places kept in presented results.
pub const REPORT_DECIMALS: usize = 4;

/// Rounds `x` to `decimals` places using its exact decimal expansion.
///
/// The value is formatted with `decimals` fraction digits and read back.
/// Formatting works on the exact binary value and breaks exact ties to
/// even, so `0.00015` (stored just below the tie) rounds down and `0.125`
/// rounds to `0.12`. Non-finite values are returned as is.
///
/// # Examples
/// ```
/// use u_statcalc::report::round_to;
/// assert_eq!(round_to(1.58113883, 4), 1.5811);
/// assert_eq!(round_to(-2.71828, 2), -2.72);
/// assert_eq!(round_to(0.00015, 4), 0.0001);
/// ```
pub fn round_to(x: f64, decimals: usize) -> f64 {
    if !x.is_finite() {
        return x;
    }
    format!("{x:.decimals$}").parse().unwrap_or(x)
}

/// Rounds to [`REPORT_DECIMALS`] places.
pub fn round4(x: f64) -> f64 {
    round_to(x, REPORT_DECIMALS)
}

impl DescriptiveSummary {
    /// Copy with every real-valued field rounded for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            raw_data: self.raw_data.clone(),
            count: self.count,
            sum: round4(self.sum),
            mean: round4(self.mean),
            median: round4(self.median),
            mode: match self.mode {
                Mode::Value(v) => Mode::Value(round4(v)),
                Mode::NoUniqueMode => Mode::NoUniqueMode,
            },
            variance: round4(self.variance),
            std_dev: round4(self.std_dev),
            min: round4(self.min),
            max: round4(self.max),
            range: round4(self.range),
        }
    }
}

impl TTestResult {
    /// Copy with every real-valued field rounded for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            sample_mean: round4(self.sample_mean),
            population_mean: round4(self.population_mean),
            sample_std_dev: round4(self.sample_std_dev),
            standard_error: round4(self.standard_error),
            t_statistic: round4(self.t_statistic),
            p_value: round4(self.p_value),
            ..self.clone()
        }
    }
}

impl ChiSquareResult {
    /// Copy with the statistic, p-value, sums and expected frequencies
    /// rounded for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            expected: self.expected.iter().copied().map(round4).collect(),
            statistic: round4(self.statistic),
            p_value: round4(self.p_value),
            observed_sum: round4(self.observed_sum),
            expected_sum: round4(self.expected_sum),
            normalized_expected_sum: round4(self.normalized_expected_sum),
            ..self.clone()
        }
    }
}

impl CorrelationResult {
    /// Copy with every derived real-valued field rounded for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            r: round4(self.r),
            r_squared: round4(self.r_squared),
            p_value: round4(self.p_value),
            mean_x: round4(self.mean_x),
            mean_y: round4(self.mean_y),
            ..self.clone()
        }
    }
}

/// One analysis outcome, tagged by kind for serialization.
///
/// Serializes as the record's own fields plus `"analysis": "<kind>"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "analysis", rename_all = "camelCase")]
pub enum AnalysisReport {
    Descriptive(DescriptiveSummary),
    TTest(TTestResult),
    ChiSquare(ChiSquareResult),
    Correlation(CorrelationResult),
}

impl AnalysisReport {
    /// Rounds the wrapped record for presentation.
    pub fn rounded(&self) -> Self {
        match self {
            Self::Descriptive(r) => Self::Descriptive(r.rounded()),
            Self::TTest(r) => Self::TTest(r.rounded()),
            Self::ChiSquare(r) => Self::ChiSquare(r.rounded()),
            Self::Correlation(r) => Self::Correlation(r.rounded()),
        }
    }
}

impl From<DescriptiveSummary> for AnalysisReport {
    fn from(r: DescriptiveSummary) -> Self {
        Self::Descriptive(r)
    }
}

impl From<TTestResult> for AnalysisReport {
    fn from(r: TTestResult) -> Self {
        Self::TTest(r)
    }
}

impl From<ChiSquareResult> for AnalysisReport {
    fn from(r: ChiSquareResult) -> Self {
        Self::ChiSquare(r)
    }
}

impl From<CorrelationResult> for AnalysisReport {
    fn from(r: CorrelationResult) -> Self {
        Self::Correlation(r)
    }
}
