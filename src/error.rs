//! Error types for ingestion and statistical analysis.
//!
//! Every failure is a terminal validation failure: analyses check their
//! inputs completely before computing anything, so a returned error never
//! accompanies a partially computed result.

use thiserror::Error;

/// Result type for statistics operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors that can occur while ingesting data or running an analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// No values remained after parsing, or an analysis received an empty
    /// sequence.
    #[error("no numeric values were provided")]
    EmptyInput,

    /// A token could not be parsed as a finite number.
    #[error("invalid number: '{0}'")]
    InvalidToken(String),

    /// Two sequences that must be paired have different lengths.
    #[error("inputs must have the same length: got {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Too few observations for the requested analysis.
    #[error("need at least {required} data points, got {got}")]
    InsufficientData { required: usize, got: usize },

    /// An expected frequency is zero or negative.
    #[error("expected frequencies must be positive: expected[{index}] = {value}")]
    NonPositiveExpected { index: usize, value: f64 },

    /// The sample is constant, so the t statistic is undefined.
    #[error("standard error is zero: all sample values are identical")]
    ZeroStandardError,

    /// A distribution routine received a non-finite value or
    /// non-positive degrees of freedom.
    #[error("numeric domain error: {0}")]
    NumericDomain(String),

    /// A multi-line request body is missing one of its lines.
    #[error("line {line} must contain {what}")]
    MissingLine { line: usize, what: &'static str },
}

impl StatsError {
    /// Returns `true` when the error was caused by the caller's input.
    ///
    /// Hosts map these to client errors; the remaining kinds indicate a
    /// failure inside the numeric machinery.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::NumericDomain(_))
    }
}
