//! Dense linear algebra for factor simulation.
//!
//! - [`matrix`]: pre-sized row-major [`Matrix`] buffers
//! - [`correlation`]: covariance construction and Cholesky factorisation

pub mod correlation;
pub mod matrix;

pub use correlation::{
    CholeskyFactor, CorrelationStructureBuilder, CovarianceStructure, CORRELATION_TOLERANCE,
};
pub use matrix::Matrix;
