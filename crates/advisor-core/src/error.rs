// ABOUTME: Error taxonomy shared across the advisor pipeline.
// ABOUTME: Covers bad arguments, missing catalog entries, and lookup tolerance violations.

use thiserror::Error;

/// Errors raised by domain operations: catalog lookups and aggregator updates.
///
/// An exhausted iteration budget is not an error — partial results are still
/// returned to the caller, so that condition lives on
/// [`crate::report::RunStatus`] instead.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Bad arguments: empty candidate sets, malformed names, thresholds
    /// outside their valid range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// None of the requested course names exist in the catalog.
    #[error("no requested course found in catalog (requested {requested})")]
    NotFound { requested: usize },

    /// Too many requested names failed to resolve against the catalog.
    /// Signals that upstream stages are producing names that don't match
    /// catalog entries (truncated or reformatted titles).
    #[error(
        "lookup tolerance exceeded: resolved {resolved} of {requested} names, tolerance {tolerance}"
    )]
    ToleranceExceeded {
        resolved: usize,
        requested: usize,
        tolerance: f64,
    },
}
