//! Numeric ingestion.
//!
//! Turns raw request text into [`NumericSample`]s. Two policies exist on
//! purpose:
//!
//! - **Strict** ([`parse_delimited`]): every non-empty token must parse as
//!   a finite number, and the first one that does not is reported.
//! - **Tolerant** ([`parse_tabular`]): tokens that do not parse are skipped,
//!   so header cells and other junk in uploaded tables are absorbed.

use crate::error::{StatsError, StatsResult};
use serde::Serialize;

/// Default token separator for delimited input.
pub const DEFAULT_SEPARATOR: char = ',';

/// An immutable, non-empty, ordered sequence of finite numbers.
///
/// The only way to obtain one is through validation, so analyses can rely
/// on both invariants without re-checking them.
///
/// # Examples
/// ```
/// use u_statcalc::ingest::NumericSample;
/// let s = NumericSample::new(vec![1.0, 2.5]).unwrap();
/// assert_eq!(s.len(), 2);
/// assert!(NumericSample::new(vec![]).is_err());
/// assert!(NumericSample::new(vec![f64::NAN]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NumericSample {
    values: Vec<f64>,
}

impl NumericSample {
    /// Validates `values` and wraps them.
    ///
    /// # Errors
    /// - [`StatsError::EmptyInput`] if `values` is empty.
    /// - [`StatsError::InvalidToken`] naming the first non-finite value.
    pub fn new(values: Vec<f64>) -> StatsResult<Self> {
        if values.is_empty() {
            return Err(StatsError::EmptyInput);
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(StatsError::InvalidToken(bad.to_string()));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for NumericSample {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

impl TryFrom<Vec<f64>> for NumericSample {
    type Error = StatsError;

    fn try_from(values: Vec<f64>) -> StatsResult<Self> {
        Self::new(values)
    }
}

/// Parses a single token as a finite number.
fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses separator-delimited text strictly.
///
/// Tokens are trimmed and empty tokens dropped; every remaining token must
/// be a finite number.
///
/// # Errors
/// - [`StatsError::InvalidToken`] with the first offending token.
/// - [`StatsError::EmptyInput`] if no tokens remain.
///
/// # Examples
/// ```
/// use u_statcalc::ingest::parse_delimited;
/// let s = parse_delimited("  1 ,  2,3  , , 4  ", ',').unwrap();
/// assert_eq!(s.values(), &[1.0, 2.0, 3.0, 4.0]);
/// assert!(parse_delimited("1, 2, abc", ',').is_err());
/// ```
pub fn parse_delimited(text: &str, sep: char) -> StatsResult<NumericSample> {
    let mut values = Vec::new();
    for token in text.split(sep).map(str::trim).filter(|t| !t.is_empty()) {
        match parse_finite(token) {
            Some(v) => values.push(v),
            None => return Err(StatsError::InvalidToken(token.to_string())),
        }
    }
    NumericSample::new(values)
}

/// Parses comma-separated tabular text tolerantly, one sample per row.
///
/// Rows are separated by line breaks. Tokens that are not finite numbers
/// are skipped, and rows left without any value are dropped.
///
/// # Errors
/// [`StatsError::EmptyInput`] if no row yields a value.
///
/// # Examples
/// ```
/// use u_statcalc::ingest::parse_tabular;
/// let rows = parse_tabular("x,y,z\n1,2,3\r\n4,n/a,6\n").unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].values(), &[4.0, 6.0]);
/// ```
pub fn parse_tabular(text: &str) -> StatsResult<Vec<NumericSample>> {
    let rows: Vec<NumericSample> = text
        .lines()
        .filter_map(|line| {
            let values: Vec<f64> = line
                .split(DEFAULT_SEPARATOR)
                .filter_map(|t| parse_finite(t.trim()))
                .collect();
            NumericSample::new(values).ok()
        })
        .collect();

    if rows.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(rows)
}

/// Splits a request body into its first two lines.
///
/// The whole body is trimmed first, so a leading or trailing blank line
/// does not count as one of the two.
fn two_lines<'a>(text: &'a str, second: &'static str) -> StatsResult<(&'a str, &'a str)> {
    let mut lines = text.trim().lines();
    let first = lines.next().unwrap_or("");
    match lines.next() {
        Some(line) => Ok((first, line)),
        None => Err(StatsError::MissingLine {
            line: 2,
            what: second,
        }),
    }
}

/// Parses a two-line body into two strictly validated samples.
///
/// Line 1 and line 2 are each parsed with [`parse_delimited`]; further
/// lines are ignored.
///
/// # Errors
/// [`StatsError::MissingLine`] if the body has fewer than two lines, plus
/// any error from [`parse_delimited`].
///
/// # Examples
/// ```
/// use u_statcalc::ingest::parse_two_lines;
/// let (x, y) = parse_two_lines("1, 2, 3\n2, 4, 6", ',').unwrap();
/// assert_eq!(x.len(), 3);
/// assert_eq!(y.values()[2], 6.0);
/// ```
pub fn parse_two_lines(text: &str, sep: char) -> StatsResult<(NumericSample, NumericSample)> {
    let (first, second) = two_lines(text, "a second series of values")?;
    Ok((parse_delimited(first, sep)?, parse_delimited(second, sep)?))
}

/// Parses a t-test body: the sample on line 1, the hypothesized mean on
/// line 2.
///
/// # Errors
/// - [`StatsError::MissingLine`] if the mean line is absent or blank.
/// - [`StatsError::InvalidToken`] if the mean is not a finite number.
/// - Any error from [`parse_delimited`] for the sample line.
///
/// # Examples
/// ```
/// use u_statcalc::ingest::parse_t_test_input;
/// let (sample, mu0) = parse_t_test_input("2.3, 2.5, 2.7\n2.5", ',').unwrap();
/// assert_eq!(sample.len(), 3);
/// assert_eq!(mu0, 2.5);
/// ```
pub fn parse_t_test_input(text: &str, sep: char) -> StatsResult<(NumericSample, f64)> {
    const WHAT: &str = "the hypothesized population mean";
    let (first, second) = two_lines(text, WHAT)?;
    let sample = parse_delimited(first, sep)?;
    let token = second.trim();
    if token.is_empty() {
        return Err(StatsError::MissingLine { line: 2, what: WHAT });
    }
    let mean = parse_finite(token).ok_or_else(|| StatsError::InvalidToken(token.to_string()))?;
    Ok((sample, mean))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn delimited_preserves_order(data in proptest::collection::vec(-1e9_f64..1e9, 1..50)) {
            let text = data.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" , ");
            let s = parse_delimited(&text, ',').unwrap();
            prop_assert_eq!(s.values(), data.as_slice());
        }

        #[test]
        fn tabular_row_count_matches_numeric_rows(
            rows in proptest::collection::vec(proptest::collection::vec(-1e6_f64..1e6, 1..8), 1..10)
        ) {
            let text = rows
                .iter()
                .map(|r| {
                    let mut cells: Vec<String> = r.iter().map(|v| v.to_string()).collect();
                    cells.push("label".to_string());
                    cells.join(",")
                })
                .collect::<Vec<_>>()
                .join("\n");
            let parsed = parse_tabular(&text).unwrap();
            prop_assert_eq!(parsed.len(), rows.len());
            for (p, r) in parsed.iter().zip(rows.iter()) {
                prop_assert_eq!(p.values(), r.as_slice());
            }
        }
    }
}
