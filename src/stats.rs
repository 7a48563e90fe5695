//! Descriptive statistics with numerical stability guarantees.
//!
//! The slice primitives handle edge cases explicitly and return `None` on
//! empty or non-finite input. [`describe`] assembles them into a
//! [`DescriptiveSummary`] for a validated [`NumericSample`].
//!
//! # Algorithms
//!
//! - **Sum/Mean**: Neumaier compensated summation for O(ε) error
//!   independent of n.
//! - **Variance/StdDev**: Welford's online algorithm.
//!   Reference: Welford (1962), "Note on a Method for Calculating
//!   Corrected Sums of Squares and Products", *Technometrics* 4(3).
//! - **Median/Mode**: one sort of a copy, O(n log n).

use crate::ingest::NumericSample;
use serde::{Serialize, Serializer};

/// Label reported in place of a mode when the highest frequency is shared.
pub const NO_UNIQUE_MODE: &str = "No unique mode";

/// The whole slice, if it is non-empty and every value is finite.
fn finite_slice(data: &[f64]) -> Option<&[f64]> {
    (!data.is_empty() && data.iter().all(|v| v.is_finite())).then_some(data)
}

/// Arithmetic mean over a compensated sum.
///
/// `None` for an empty slice or one holding NaN/Inf.
///
/// # Examples
/// ```
/// use u_statcalc::stats::mean;
/// assert_eq!(mean(&[1.5, 2.5, 3.5]), Some(2.5));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    finite_slice(data).map(mean_of_finite)
}

/// Mean of non-empty finite data. A total that overflows falls back to
/// summing `x / n`, which stays in range.
fn mean_of_finite(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let total = kahan_sum(data);
    if total.is_finite() {
        total / n
    } else {
        neumaier(data.iter().map(|&x| x / n))
    }
}

/// Sample variance with the `n − 1` denominator.
///
/// `None` for fewer than two values or any NaN/Inf.
///
/// # Examples
/// ```
/// use u_statcalc::stats::variance;
/// assert_eq!(variance(&[1.0, 3.0]), Some(2.0));
/// assert_eq!(variance(&[7.0]), None);
/// ```
pub fn variance(data: &[f64]) -> Option<f64> {
    finite_slice(data)?.iter().copied().collect::<Moments>().sample_variance()
}

/// Square root of [`variance`].
pub fn std_dev(data: &[f64]) -> Option<f64> {
    variance(data).map(f64::sqrt)
}

/// Smallest and largest value in one pass, `None` if empty or NaN is present.
fn extremes(data: &[f64]) -> Option<(f64, f64)> {
    if data.is_empty() || data.iter().any(|v| v.is_nan()) {
        return None;
    }
    Some(
        data.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            }),
    )
}

/// Smallest value; `None` if empty or NaN is present.
///
/// ```
/// use u_statcalc::stats::min;
/// assert_eq!(min(&[-2.0, 8.0, 0.5]), Some(-2.0));
/// ```
pub fn min(data: &[f64]) -> Option<f64> {
    extremes(data).map(|(lo, _)| lo)
}

/// Largest value; `None` if empty or NaN is present.
pub fn max(data: &[f64]) -> Option<f64> {
    extremes(data).map(|(_, hi)| hi)
}

/// Ascending copy, or `None` if NaN is present.
fn sorted_copy(data: &[f64]) -> Option<Vec<f64>> {
    if data.iter().any(|v| v.is_nan()) {
        return None;
    }
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Some(sorted)
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        // Halve first so two values near f64::MAX do not overflow.
        sorted[mid - 1] / 2.0 + sorted[mid] / 2.0
    } else {
        sorted[mid]
    }
}

/// Middle value of the sorted data; mean of the two middle values for an
/// even count. The input is left untouched.
///
/// `None` if empty or NaN is present.
///
/// # Examples
/// ```
/// use u_statcalc::stats::median;
/// assert_eq!(median(&[9.0, 1.0, 5.0]), Some(5.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// ```
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    sorted_copy(data).map(|s| median_sorted(&s))
}

/// The most frequent value of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// A single value occurs strictly more often than every other value.
    Value(f64),
    /// Two or more values share the highest frequency.
    NoUniqueMode,
}

impl Mode {
    pub fn value(&self) -> Option<f64> {
        match self {
            Mode::Value(v) => Some(*v),
            Mode::NoUniqueMode => None,
        }
    }
}

impl Serialize for Mode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mode::Value(v) => serializer.serialize_f64(*v),
            Mode::NoUniqueMode => serializer.serialize_str(NO_UNIQUE_MODE),
        }
    }
}

/// Mode of already sorted, non-empty data.
///
/// Equal values are adjacent after sorting, so a single run-length pass
/// finds every frequency.
fn mode_sorted(sorted: &[f64]) -> Mode {
    let mut best = sorted[0];
    let mut best_count = 0_usize;
    let mut tied = false;

    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == value {
            j += 1;
        }
        let count = j - i;
        if count > best_count {
            best = value;
            best_count = count;
            tied = false;
        } else if count == best_count {
            tied = true;
        }
        i = j;
    }

    if tied {
        Mode::NoUniqueMode
    } else {
        Mode::Value(best)
    }
}

/// Computes the mode of `data`.
///
/// When the highest frequency is attained by more than one value the
/// result is [`Mode::NoUniqueMode`], never an arbitrary winner.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN.
///
/// # Examples
/// ```
/// use u_statcalc::stats::{mode, Mode};
/// assert_eq!(mode(&[1.0, 2.0, 2.0, 3.0]), Some(Mode::Value(2.0)));
/// assert_eq!(mode(&[1.0, 2.0, 3.0, 4.0]), Some(Mode::NoUniqueMode));
/// ```
pub fn mode(data: &[f64]) -> Option<Mode> {
    if data.is_empty() {
        return None;
    }
    sorted_copy(data).map(|s| mode_sorted(&s))
}

// ---------------------------------------------------------------------------
// Compensated summation
// ---------------------------------------------------------------------------

/// Sum with Neumaier's compensation, accurate to O(ε) regardless of length.
///
/// Unlike plain Kahan summation the correction also holds when an addend
/// outweighs the running total.
///
/// Reference: Neumaier (1974), *ZAMM* 54(1), pp. 39–51.
///
/// ```
/// use u_statcalc::stats::kahan_sum;
/// assert_eq!(kahan_sum(&[1e16, 1.0, -1e16]), 1.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    neumaier(data.iter().copied())
}

fn neumaier(values: impl IntoIterator<Item = f64>) -> f64 {
    let (total, correction) = values.into_iter().fold((0.0_f64, 0.0_f64), |(total, corr), x| {
        let next = total + x;
        if !next.is_finite() {
            // No correction is defined once the total has overflowed.
            return (next, 0.0);
        }
        let lost = if total.abs() >= x.abs() {
            (total - next) + x
        } else {
            (x - next) + total
        };
        (next, corr + lost)
    });
    total + correction
}

// ---------------------------------------------------------------------------
// Running moments
// ---------------------------------------------------------------------------

/// Count, mean and sum of squared deviations, updated one value at a time
/// with Welford's recurrence.
///
/// Reference: Welford (1962), *Technometrics* 4(3).
///
/// # Examples
/// ```
/// use u_statcalc::stats::Moments;
/// let m: Moments = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter().collect();
/// assert_eq!(m.len(), 8);
/// assert!((m.mean().unwrap() - 5.0).abs() < 1e-12);
/// assert!((m.sample_variance().unwrap() - 32.0 / 7.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    n: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Running mean; `None` before the first value.
    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    /// `m2 / (n − 1)`; `None` below two values.
    pub fn sample_variance(&self) -> Option<f64> {
        (self.n > 1).then(|| self.m2 / (self.n - 1) as f64)
    }
}

impl Extend<f64> for Moments {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl FromIterator<f64> for Moments {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Descriptive summary of one sample.
///
/// Serialized field names match the report format consumed downstream
/// (`stdDev`, `min`, `max`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveSummary {
    /// The sample as supplied.
    pub raw_data: Vec<f64>,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: Mode,
    /// Sample variance; 0 for a single observation.
    pub variance: f64,
    /// Sample standard deviation; 0 for a single observation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Computes the full descriptive summary of a sample.
///
/// The sample is non-empty and finite by construction, so this cannot
/// fail. A single observation has variance and standard deviation 0 by
/// convention.
///
/// # Examples
/// ```
/// use u_statcalc::ingest::NumericSample;
/// use u_statcalc::stats::describe;
/// let s = NumericSample::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let d = describe(&s);
/// assert_eq!(d.count, 5);
/// assert!((d.variance - 2.5).abs() < 1e-12);
/// assert_eq!(d.range, 4.0);
/// ```
pub fn describe(sample: &NumericSample) -> DescriptiveSummary {
    let data = sample.values();
    let count = data.len();

    let variance = data
        .iter()
        .copied()
        .collect::<Moments>()
        .sample_variance()
        .unwrap_or(0.0);

    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let (min, max) = (sorted[0], sorted[count - 1]);
    DescriptiveSummary {
        raw_data: data.to_vec(),
        count,
        sum: kahan_sum(data),
        mean: mean_of_finite(data),
        median: median_sorted(&sorted),
        mode: mode_sorted(&sorted),
        variance,
        std_dev: variance.sqrt(),
        min,
        max,
        range: max - min,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
