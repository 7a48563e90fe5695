//! Qualitative labels for test outcomes.
//!
//! Significance is judged against the fixed level [`SIGNIFICANCE_LEVEL`];
//! correlation strength uses the conventional |r| buckets 0.9 / 0.7 / 0.5 /
//! 0.3.

use serde::Serialize;
use std::fmt;

/// Two-tailed significance level used by every test in the crate.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Verdict of a hypothesis test at [`SIGNIFICANCE_LEVEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Significance {
    #[serde(rename = "Significant")]
    Significant,
    #[serde(rename = "Not Significant")]
    NotSignificant,
}

impl Significance {
    /// `Significant` iff `p_value < 0.05`.
    ///
    /// # Examples
    /// ```
    /// use u_statcalc::interpret::Significance;
    /// assert_eq!(Significance::from_p_value(0.01), Significance::Significant);
    /// assert_eq!(Significance::from_p_value(0.05), Significance::NotSignificant);
    /// ```
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < SIGNIFICANCE_LEVEL {
            Self::Significant
        } else {
            Self::NotSignificant
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, Self::Significant)
    }

    fn phrase(&self) -> &'static str {
        match self {
            Self::Significant => "statistically significant",
            Self::NotSignificant => "not statistically significant",
        }
    }
}

impl fmt::Display for Significance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Significant => "Significant",
            Self::NotSignificant => "Not Significant",
        })
    }
}

/// Strength bucket of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    VeryWeak,
}

impl CorrelationStrength {
    /// Classifies `|r|`; each bucket includes its lower threshold.
    pub fn from_r(r: f64) -> Self {
        let r_abs = r.abs();
        if r_abs >= 0.9 {
            Self::VeryStrong
        } else if r_abs >= 0.7 {
            Self::Strong
        } else if r_abs >= 0.5 {
            Self::Moderate
        } else if r_abs >= 0.3 {
            Self::Weak
        } else {
            Self::VeryWeak
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::VeryStrong => "Very strong",
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
            Self::VeryWeak => "Very weak",
        })
    }
}

/// Sign of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

impl CorrelationDirection {
    pub fn from_r(r: f64) -> Self {
        if r > 0.0 {
            Self::Positive
        } else if r < 0.0 {
            Self::Negative
        } else {
            Self::None
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::None => "no",
        })
    }
}

/// Builds the human-readable interpretation of a correlation.
///
/// # Examples
/// ```
/// use u_statcalc::interpret::interpret_correlation;
/// assert_eq!(
///     interpret_correlation(0.95, 0.001),
///     "Very strong positive correlation (statistically significant)"
/// );
/// assert_eq!(
///     interpret_correlation(0.0, 1.0),
///     "Very weak no correlation (not statistically significant)"
/// );
/// ```
pub fn interpret_correlation(r: f64, p_value: f64) -> String {
    format!(
        "{} {} correlation ({})",
        CorrelationStrength::from_r(r),
        CorrelationDirection::from_r(r),
        Significance::from_p_value(p_value).phrase()
    )
}
