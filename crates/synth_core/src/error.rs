//! Error types for simulation input validation.
//!
//! Every variant is raised during up-front validation, before any random
//! draw or numeric work. Price and variance floors applied during the
//! recurrence are clamps and never surface here.

use thiserror::Error;

/// Result alias used across the simulation crates.
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Validation failure for a simulation input.
///
/// Each variant identifies the offending field so the caller can correct
/// the input. Retrying with unchanged inputs always fails the same way.
///
/// # Examples
///
/// ```
/// use synth_core::SimulationError;
///
/// let err = SimulationError::InvalidDiagonal { index: 0, value: 0.9 };
/// assert!(err.to_string().contains("0.9"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Two inputs whose dimensions must agree do not.
    #[error("shape mismatch for {field}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Name of the offending input.
        field: &'static str,
        /// Dimension implied by the other inputs.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },

    /// A matrix that must be square is not.
    #[error("{field} must be square, got {rows}x{cols}")]
    NonSquareMatrix {
        field: &'static str,
        rows: usize,
        cols: usize,
    },

    /// Correlation matrix differs from its transpose by more than the tolerance.
    #[error(
        "correlation matrix is not symmetric at ({row}, {col}): {upper} vs {lower}"
    )]
    AsymmetricCorrelation {
        row: usize,
        col: usize,
        /// Value at `(row, col)`.
        upper: f64,
        /// Value at `(col, row)`.
        lower: f64,
    },

    /// Correlation diagonal entry is not within tolerance of 1.0.
    #[error("correlation diagonal at index {index} is {value}, expected 1.0")]
    InvalidDiagonal { index: usize, value: f64 },

    /// Covariance matrix failed Cholesky factorisation.
    #[error("covariance matrix is not positive definite (pivot {pivot} = {value})")]
    NonPositiveDefinite {
        /// Row at which the factorisation broke down.
        pivot: usize,
        /// Non-positive value found under the square root.
        value: f64,
    },

    /// A scalar parameter lies outside its admissible range.
    #[error("parameter '{name}' = {value} is out of range: {constraint}")]
    OutOfRangeParameter {
        name: String,
        value: f64,
        /// Human-readable description of the admissible range.
        constraint: &'static str,
    },
}

impl SimulationError {
    /// Creates an [`SimulationError::OutOfRangeParameter`].
    pub fn out_of_range(name: impl Into<String>, value: f64, constraint: &'static str) -> Self {
        Self::OutOfRangeParameter {
            name: name.into(),
            value,
            constraint,
        }
    }

    /// Creates a [`SimulationError::ShapeMismatch`].
    pub fn shape(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            field,
            expected,
            actual,
        }
    }

    /// Name of the input this error refers to.
    pub fn field(&self) -> &str {
        match self {
            Self::ShapeMismatch { field, .. } | Self::NonSquareMatrix { field, .. } => field,
            Self::AsymmetricCorrelation { .. } | Self::InvalidDiagonal { .. } => "correlation",
            Self::NonPositiveDefinite { .. } => "covariance",
            Self::OutOfRangeParameter { name, .. } => name,
        }
    }
}
