//! # u-statcalc
//!
//! Statistical analysis primitives: descriptive statistics and three
//! classical hypothesis tests over numeric samples.
//!
//! Every operation is a pure function of its inputs. Inputs are validated in
//! full before any computation, and failures are reported through
//! [`StatsError`] rather than panics.
//!
//! ## Modules
//!
//! - [`ingest`] — Strict and tolerant parsing of numeric text
//! - [`special`] — Incomplete gamma/beta functions and the χ² and t tails
//! - [`stats`] — Descriptive statistics with numerical stability guarantees
//! - [`testing`] — One-sample t-test and χ² goodness of fit
//! - [`correlation`] — Pearson correlation with significance
//! - [`interpret`] — Significance and correlation-strength labels
//! - [`report`] — Presentation rounding and the tagged report record
//! - [`engine`] — Stateless facade over all analyses
//! - [`error`] — Error type shared by every module
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: Neumaier summation for totals,
//!   Lentz continued fractions for the distribution tails
//! - **No statistics dependencies**: distribution functions are computed
//!   from first principles
//! - **Property-based testing**: Mathematical invariants verified via proptest

pub mod correlation;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod interpret;
pub mod report;
pub mod special;
pub mod stats;
pub mod testing;

pub use engine::{AnalysisKind, StatsEngine};
pub use error::{StatsError, StatsResult};
pub use ingest::NumericSample;
pub use report::AnalysisReport;
