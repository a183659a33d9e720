//! Estimation errors.
//!
//! None of these are recovered inside the library. They propagate to the caller which decides
//! whether to abort the cycle or substitute a fallback.

use thiserror::Error;

/// Errors raised by the filters, models and controller.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EstimateError {
    /// Elapsed time was not strictly positive. Rejected before any matrix operation.
    #[error("invalid timestep {dt}: elapsed time must be > 0")]
    InvalidTimestep { dt: f64 },

    /// An observation, control or covariance shape disagrees with the model.
    #[error("{what} has shape {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A covariance or variance is negative or NaN.
    #[error("invalid covariance: {0}")]
    InvalidCovariance(&'static str),

    /// A matrix that must be inverted is singular.
    #[error("singular matrix: {0}")]
    SingularMatrix(&'static str),

    /// A component was constructed with an invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(&'static str),
}

/// Result type of the estimation operations.
pub type EstimateResult<T> = Result<T, EstimateError>;
