//! Stateless analysis facade.
//!
//! [`StatsEngine`] bundles the four analyses behind one value and knows the
//! two input conventions in use: a text body (one series per line, comma
//! separated) and a tolerant tabular upload.
//!
//! # Examples
//!
//! ```
//! use u_statcalc::engine::{AnalysisKind, StatsEngine};
//! use u_statcalc::report::AnalysisReport;
//!
//! let engine = StatsEngine::new();
//! let report = engine.run_text(AnalysisKind::TTest, "10, 12, 14, 16, 18\n5").unwrap();
//! match report {
//!     AnalysisReport::TTest(t) => assert_eq!(t.df, 4),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use crate::correlation::{self, CorrelationResult};
use crate::error::{StatsError, StatsResult};
use crate::ingest::{self, NumericSample, DEFAULT_SEPARATOR};
use crate::report::AnalysisReport;
use crate::stats::{self, DescriptiveSummary};
use crate::testing::{self, ChiSquareResult, TTestResult};
use std::fmt;
use tracing::debug;

/// Which analysis to run on a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    Descriptive,
    TTest,
    ChiSquare,
    Correlation,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Descriptive => "descriptive",
            Self::TTest => "t-test",
            Self::ChiSquare => "chi-square",
            Self::Correlation => "correlation",
        })
    }
}

/// Stateless entry point for every analysis.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsEngine;

impl StatsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Descriptive summary of a validated sample.
    pub fn descriptive_stats(&self, sample: &NumericSample) -> StatsResult<DescriptiveSummary> {
        debug!(n = sample.len(), "descriptive statistics");
        Ok(stats::describe(sample))
    }

    /// One-sample t-test of `sample` against `population_mean`.
    pub fn t_test(&self, sample: &NumericSample, population_mean: f64) -> StatsResult<TTestResult> {
        debug!(n = sample.len(), population_mean, "one-sample t-test");
        testing::one_sample_t_test(sample, population_mean)
    }

    /// Chi-square goodness-of-fit of `observed` against `expected`.
    pub fn chi_square(&self, observed: &[f64], expected: &[f64]) -> StatsResult<ChiSquareResult> {
        debug!(categories = observed.len(), "chi-square goodness of fit");
        testing::chi_squared_goodness_of_fit(observed, expected)
    }

    /// Pearson correlation between `x` and `y`.
    pub fn correlation(&self, x: &[f64], y: &[f64]) -> StatsResult<CorrelationResult> {
        debug!(n = x.len(), "pearson correlation");
        correlation::pearson(x, y)
    }

    /// Runs `kind` on a text body and returns the rounded report.
    ///
    /// Body layout per kind:
    ///
    /// | kind        | line 1           | line 2               |
    /// |-------------|------------------|----------------------|
    /// | descriptive | values           | (none)               |
    /// | t-test      | sample           | hypothesized mean    |
    /// | chi-square  | observed         | expected             |
    /// | correlation | X values         | Y values             |
    ///
    /// # Errors
    ///
    /// Any ingestion error, [`StatsError::MissingLine`] for an absent second
    /// line, or the error of the analysis itself.
    pub fn run_text(&self, kind: AnalysisKind, text: &str) -> StatsResult<AnalysisReport> {
        let sep = DEFAULT_SEPARATOR;
        let report: AnalysisReport = match kind {
            AnalysisKind::Descriptive => {
                let sample = ingest::parse_delimited(text.trim(), sep)?;
                self.descriptive_stats(&sample)?.into()
            }
            AnalysisKind::TTest => {
                let (sample, mu0) = ingest::parse_t_test_input(text, sep)?;
                self.t_test(&sample, mu0)?.into()
            }
            AnalysisKind::ChiSquare => {
                let (observed, expected) = ingest::parse_two_lines(text, sep)?;
                self.chi_square(observed.values(), expected.values())?.into()
            }
            AnalysisKind::Correlation => {
                let (x, y) = ingest::parse_two_lines(text, sep)?;
                self.correlation(x.values(), y.values())?.into()
            }
        };
        Ok(report.rounded())
    }

    /// Runs `kind` on a tabular upload and returns the rounded report.
    ///
    /// Descriptive statistics use every value of every row in order.
    /// Chi-square and correlation use rows 1 and 2; further rows are
    /// ignored. The t-test accepts two layouts:
    ///
    /// - a single row whose last value is the hypothesized mean and whose
    ///   other values form the sample;
    /// - two or more rows, with row 1 as the sample and the first value of
    ///   row 2 as the hypothesized mean.
    ///
    /// # Errors
    ///
    /// [`StatsError::EmptyInput`] if no numeric rows are found,
    /// [`StatsError::MissingLine`] if a required second row is absent,
    /// [`StatsError::InsufficientData`] if a single-row t-test upload has
    /// fewer than 3 values, or the error of the analysis itself.
    pub fn run_tabular(&self, kind: AnalysisKind, text: &str) -> StatsResult<AnalysisReport> {
        let rows = ingest::parse_tabular(text)?;
        debug!(%kind, rows = rows.len(), "tabular upload");
        let report: AnalysisReport = match kind {
            AnalysisKind::Descriptive => {
                let all: Vec<f64> = rows.into_iter().flat_map(NumericSample::into_values).collect();
                self.descriptive_stats(&NumericSample::new(all)?)?.into()
            }
            AnalysisKind::TTest => match rows.as_slice() {
                [only] => {
                    let (mu0, sample) = split_last_value(only)?;
                    self.t_test(&sample, mu0)?.into()
                }
                _ => {
                    let (sample, second) = first_two(&rows, "the hypothesized population mean")?;
                    self.t_test(sample, second.values()[0])?.into()
                }
            },
            AnalysisKind::ChiSquare => {
                let (observed, expected) = first_two(&rows, "the expected frequencies")?;
                self.chi_square(observed.values(), expected.values())?.into()
            }
            AnalysisKind::Correlation => {
                let (x, y) = first_two(&rows, "a second series of values")?;
                self.correlation(x.values(), y.values())?.into()
            }
        };
        Ok(report.rounded())
    }
}

/// Splits a single t-test row into its trailing mean and the sample before it.
fn split_last_value(row: &NumericSample) -> StatsResult<(f64, NumericSample)> {
    match row.values() {
        [sample @ .., mu0] if sample.len() >= 2 => Ok((*mu0, NumericSample::new(sample.to_vec())?)),
        values => Err(StatsError::InsufficientData {
            required: 3,
            got: values.len(),
        }),
    }
}

fn first_two<'a>(
    rows: &'a [NumericSample],
    what: &'static str,
) -> StatsResult<(&'a NumericSample, &'a NumericSample)> {
    match rows {
        [first, second, ..] => Ok((first, second)),
        _ => Err(StatsError::MissingLine { line: 2, what }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::Significance;
    use crate::stats::Mode;

    fn engine() -> StatsEngine {
        StatsEngine::new()
    }

    #[test]
    fn test_descriptive_text() {
        match engine().run_text(AnalysisKind::Descriptive, "1, 2, 3, 4, 5\n").unwrap() {
            AnalysisReport::Descriptive(d) => {
                assert_eq!(d.count, 5);
                assert_eq!(d.sum, 15.0);
                assert_eq!(d.mean, 3.0);
                assert_eq!(d.median, 3.0);
                assert_eq!(d.variance, 2.5);
                assert_eq!(d.std_dev, 1.5811);
                assert_eq!(d.range, 4.0);
                assert_eq!(d.mode, Mode::NoUniqueMode);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_descriptive_single_value() {
        match engine().run_text(AnalysisKind::Descriptive, "42").unwrap() {
            AnalysisReport::Descriptive(d) => {
                assert_eq!(d.count, 1);
                assert_eq!(d.variance, 0.0);
                assert_eq!(d.std_dev, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_descriptive_invalid_token() {
        let err = engine()
            .run_text(AnalysisKind::Descriptive, "1, 2, abc, 4")
            .unwrap_err();
        assert_eq!(err, StatsError::InvalidToken("abc".to_string()));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_t_test_text() {
        match engine().run_text(AnalysisKind::TTest, "10, 12, 14, 16, 18\n5").unwrap() {
            AnalysisReport::TTest(t) => {
                assert_eq!(t.n, 5);
                assert_eq!(t.sample_mean, 14.0);
                assert_eq!(t.population_mean, 5.0);
                assert_eq!(t.df, 4);
                assert!(t.p_value < 0.05);
                assert_eq!(t.significance, Significance::Significant);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_t_test_missing_mean() {
        let err = engine().run_text(AnalysisKind::TTest, "1, 2, 3").unwrap_err();
        assert!(matches!(err, StatsError::MissingLine { line: 2, .. }));
    }

    #[test]
    fn test_t_test_single_value() {
        let err = engine().run_text(AnalysisKind::TTest, "5\n3").unwrap_err();
        assert_eq!(err, StatsError::InsufficientData { required: 2, got: 1 });
    }

    #[test]
    fn test_chi_square_text() {
        match engine()
            .run_text(AnalysisKind::ChiSquare, "10, 20, 30, 40\n10, 20, 30, 40")
            .unwrap()
        {
            AnalysisReport::ChiSquare(c) => {
                assert_eq!(c.statistic, 0.0);
                assert!(c.p_value > 0.95);
                assert!(!c.rescaled);
                assert_eq!(c.significance, Significance::NotSignificant);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_chi_square_rescaled_text() {
        match engine()
            .run_text(AnalysisKind::ChiSquare, "20, 30, 40, 50\n10, 10, 10, 10")
            .unwrap()
        {
            AnalysisReport::ChiSquare(c) => {
                assert_eq!(c.observed_sum, 140.0);
                assert_eq!(c.normalized_expected_sum, 140.0);
                assert_eq!(c.expected, vec![35.0; 4]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_chi_square_errors() {
        let e = engine();
        assert!(matches!(
            e.run_text(AnalysisKind::ChiSquare, "10, 20, 30"),
            Err(StatsError::MissingLine { .. })
        ));
        assert!(matches!(
            e.run_text(AnalysisKind::ChiSquare, "10, 20, 30\n10, 20"),
            Err(StatsError::LengthMismatch { left: 3, right: 2 })
        ));
        assert!(matches!(
            e.run_text(AnalysisKind::ChiSquare, "10, 20\n0, 30"),
            Err(StatsError::NonPositiveExpected { index: 0, .. })
        ));
    }

    #[test]
    fn test_correlation_text() {
        match engine()
            .run_text(AnalysisKind::Correlation, "1, 2, 3, 4, 5\n2, 4, 6, 8, 10")
            .unwrap()
        {
            AnalysisReport::Correlation(c) => {
                assert_eq!(c.r, 1.0);
                assert_eq!(c.r_squared, 1.0);
                assert!(c.p_value < 0.05);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_correlation_text_errors() {
        let e = engine();
        assert!(matches!(
            e.run_text(AnalysisKind::Correlation, "1, 2, 3, 4, 5\n2, 4, 6"),
            Err(StatsError::LengthMismatch { left: 5, right: 3 })
        ));
        assert!(matches!(
            e.run_text(AnalysisKind::Correlation, "5\n10"),
            Err(StatsError::InsufficientData { required: 2, got: 1 })
        ));
    }

    #[test]
    fn test_tabular_descriptive_flattens_rows() {
        let text = "a,b,c\n1,2,3\n4,5\n";
        match engine().run_tabular(AnalysisKind::Descriptive, text).unwrap() {
            AnalysisReport::Descriptive(d) => {
                assert_eq!(d.count, 5);
                assert_eq!(d.sum, 15.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tabular_t_test() {
        let text = "10,12,14,16,18\n5,99\n";
        match engine().run_tabular(AnalysisKind::TTest, text).unwrap() {
            AnalysisReport::TTest(t) => {
                assert_eq!(t.population_mean, 5.0);
                assert_eq!(t.n, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tabular_t_test_single_row() {
        match engine()
            .run_tabular(AnalysisKind::TTest, "10,12,14,16,18,15\n")
            .unwrap()
        {
            AnalysisReport::TTest(t) => {
                assert_eq!(t.sample_data, vec![10.0, 12.0, 14.0, 16.0, 18.0]);
                assert_eq!(t.pop_mean, 15.0);
                assert_eq!(t.n, 5);
                assert_eq!(t.df, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_tabular_t_test_single_row_too_short() {
        assert_eq!(
            engine().run_tabular(AnalysisKind::TTest, "10,15"),
            Err(StatsError::InsufficientData { required: 3, got: 2 })
        );
    }

    #[test]
    fn test_tabular_correlation_and_missing_row() {
        let e = engine();
        let report = e
            .run_tabular(AnalysisKind::Correlation, "x\n1,2,3\n3,2,1\n9,9,9")
            .unwrap();
        match report {
            AnalysisReport::Correlation(c) => assert_eq!(c.r, -1.0),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            e.run_tabular(AnalysisKind::ChiSquare, "10,20,30"),
            Err(StatsError::MissingLine { line: 2, .. })
        ));
        assert_eq!(
            e.run_tabular(AnalysisKind::Descriptive, "name,label\n"),
            Err(StatsError::EmptyInput)
        );
    }

    #[test]
    fn test_direct_calls_match_text() {
        let e = engine();
        let sample = NumericSample::new(vec![2.3, 2.5, 2.7, 2.4, 2.6]).unwrap();
        let direct = AnalysisReport::from(e.t_test(&sample, 2.5).unwrap()).rounded();
        let text = e.run_text(AnalysisKind::TTest, "2.3, 2.5, 2.7, 2.4, 2.6\n2.5").unwrap();
        assert_eq!(direct, text);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AnalysisKind::ChiSquare.to_string(), "chi-square");
        assert_eq!(AnalysisKind::TTest.to_string(), "t-test");
    }
}
