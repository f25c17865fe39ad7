//! Error types for DTW configuration and alignment.

use crate::step_pattern::Normalization;

/// Errors caused by malformed input or an inconsistent alignment configuration.
///
/// These are detected before (or instead of) running the cost-matrix recurrence
/// and never depend on the numeric content of the alignment itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Returned when a local cost matrix has no rows, no columns, or ragged rows.
    #[error("a non-empty rectangular 2D local cost matrix was expected: {reason}")]
    MalformedCostMatrix {
        /// What was wrong with the supplied rows.
        reason: String,
    },

    /// Returned when a local cost matrix contains a negative entry.
    #[error("local cost matrix has negative value {value} at ({row}, {col})")]
    NegativeLocalCost {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The negative value.
        value: f64,
    },

    /// Returned when an input matrix or sequence contains NaN or an infinity.
    #[error("non-finite value at ({row}, {col})")]
    NonFiniteValue {
        /// Row (time step) of the offending value.
        row: usize,
        /// Column (feature) of the offending value.
        col: usize,
    },

    /// Returned when a sequence has no time steps or no features.
    #[error("sequence must have at least one time step and one feature")]
    EmptySequence,

    /// Returned when the time steps of a sequence differ in dimensionality.
    #[error("time step {row} has {got} features, expected {expected}")]
    RaggedSequence {
        /// Zero-based time step index.
        row: usize,
        /// Feature count of the first time step.
        expected: usize,
        /// Feature count of the offending time step.
        got: usize,
    },

    /// Returned when query and reference have different feature counts.
    #[error("query has {query} features but reference has {reference}")]
    DimensionMismatch {
        /// Features per query time step.
        query: usize,
        /// Features per reference time step.
        reference: usize,
    },

    /// Returned when a window type name is not recognized.
    #[error("unknown window type \"{name}\" (expected none, sakoechiba, itakura, or slantedband)")]
    UnknownWindow {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when a banded window is requested without a window size.
    #[error("window type \"{window}\" requires a window size")]
    MissingWindowSize {
        /// The window type that needs the parameter.
        window: &'static str,
    },

    /// Returned when a step pattern name is not one of the predefined patterns.
    #[error("unknown step pattern \"{name}\"")]
    UnknownStepPattern {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when a step pattern table violates its structural invariants.
    #[error("invalid step pattern: {reason}")]
    InvalidStepPattern {
        /// Which invariant was violated.
        reason: String,
    },

    /// Returned when a local distance method name is not recognized.
    #[error("unknown distance method \"{name}\"")]
    UnknownDistanceMethod {
        /// The unrecognized name.
        name: String,
    },

    /// Returned when open-begin is requested with a pattern not normalized by N.
    #[error("open-begin requires step patterns with \"N\" normalization, got \"{hint}\"")]
    OpenBeginRequiresN {
        /// Normalization hint of the rejected pattern.
        hint: Normalization,
    },

    /// Returned when open-end is requested with a non-normalizable pattern.
    #[error("open-end alignments require normalizable step patterns")]
    OpenEndRequiresNormalization,
}

/// Errors from DTW alignment.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// The input or configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The terminal cell is unreachable under the window and step pattern.
    #[error("no warping path found compatible with the local constraints (terminal cell ({row}, {col}) unreached)")]
    NoWarpingPath {
        /// Row of the terminal cell.
        row: usize,
        /// Column of the terminal cell.
        col: usize,
    },

    /// Backtracking met an unreached cell on the chosen path.
    #[error("direction matrix is inconsistent: unreached cell ({row}, {col}) on the optimal path")]
    BrokenPath {
        /// Row of the unreached cell.
        row: usize,
        /// Column of the unreached cell.
        col: usize,
    },
}

impl DtwError {
    /// Return true if this error reports a rejected input or configuration.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Return true if no admissible warping path exists.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::NoWarpingPath { .. })
    }
}
