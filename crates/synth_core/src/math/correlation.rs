//! Factor covariance construction with Cholesky decomposition.
//!
//! ## Mathematical Background
//!
//! Given factor volatilities `σ` and a correlation matrix `C`, the factor
//! covariance is
//!
//! ```text
//! Σ = diag(σ) · C · diag(σ)
//! ```
//!
//! and independent standard normals `Z` become correlated factor
//! increments through the lower-triangular factor `L` of `Σ`:
//!
//! ```text
//! X = L · Z,   Σ = L · Lᵀ
//! ```
//!
//! ## Usage
//!
//! ```
//! use synth_core::math::{CorrelationStructureBuilder, Matrix};
//!
//! let corr = Matrix::from_rows(&[
//!     vec![1.0, 0.5],
//!     vec![0.5, 1.0],
//! ]).unwrap();
//!
//! let structure = CorrelationStructureBuilder::build(&[1.0, 2.0], &corr).unwrap();
//! assert_eq!(structure.covariance().get(0, 1), 1.0);
//!
//! let x = structure.cholesky().transform(&[1.0, 0.0]);
//! assert_eq!(x[0], 1.0);
//! ```

use super::matrix::Matrix;
use crate::error::{SimulationError, SimulationResult};

/// Tolerance for symmetry and unit-diagonal checks.
pub const CORRELATION_TOLERANCE: f64 = 1e-8;

/// Validates factor inputs and derives the covariance and its Cholesky factor.
pub struct CorrelationStructureBuilder;

impl CorrelationStructureBuilder {
    /// Builds the covariance structure for the given volatilities and correlation.
    ///
    /// Checks run in this order, and the first failure is returned:
    ///
    /// 1. correlation is square ([`SimulationError::NonSquareMatrix`])
    /// 2. correlation dimension equals `volatilities.len()`
    ///    ([`SimulationError::ShapeMismatch`])
    /// 3. each volatility is finite ([`SimulationError::OutOfRangeParameter`])
    /// 4. `|C - Cᵀ| <= 1e-8` elementwise ([`SimulationError::AsymmetricCorrelation`])
    /// 5. `|C_ii - 1| <= 1e-8` ([`SimulationError::InvalidDiagonal`])
    /// 6. covariance admits a Cholesky factor ([`SimulationError::NonPositiveDefinite`])
    ///
    /// Volatilities are not sign-checked. A zero volatility leaves a zero
    /// pivot and fails at step 6; a negative one flips the sign of that
    /// factor's covariances with the others and is otherwise accepted.
    pub fn build(volatilities: &[f64], correlation: &Matrix) -> SimulationResult<CovarianceStructure> {
        Self::validate(volatilities, correlation)?;

        let n = volatilities.len();
        let mut covariance = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                covariance.set(i, j, volatilities[i] * correlation.get(i, j) * volatilities[j]);
            }
        }

        let cholesky = CholeskyFactor::decompose(&covariance)?;
        tracing::debug!(factors = n, "covariance structure built");

        Ok(CovarianceStructure {
            covariance,
            cholesky,
        })
    }

    /// Runs every structural check without factorising.
    pub fn validate(volatilities: &[f64], correlation: &Matrix) -> SimulationResult<()> {
        let (rows, cols) = correlation.shape();
        if rows != cols {
            return Err(SimulationError::NonSquareMatrix {
                field: "correlation",
                rows,
                cols,
            });
        }

        let n = volatilities.len();
        if rows != n {
            return Err(SimulationError::shape("correlation", n, rows));
        }

        for (i, &vol) in volatilities.iter().enumerate() {
            if !vol.is_finite() {
                return Err(SimulationError::out_of_range(
                    format!("volatilities[{i}]"),
                    vol,
                    "must be finite",
                ));
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let upper = correlation.get(i, j);
                let lower = correlation.get(j, i);
                // a NaN entry fails this comparison and is reported as asymmetric
                let symmetric = (upper - lower).abs() <= CORRELATION_TOLERANCE;
                if !symmetric {
                    return Err(SimulationError::AsymmetricCorrelation {
                        row: i,
                        col: j,
                        upper,
                        lower,
                    });
                }
            }
        }

        for i in 0..n {
            let diag = correlation.get(i, i);
            let unit = (diag - 1.0).abs() <= CORRELATION_TOLERANCE;
            if !unit {
                return Err(SimulationError::InvalidDiagonal {
                    index: i,
                    value: diag,
                });
            }
        }

        Ok(())
    }
}

/// Factor covariance and its Cholesky factor.
///
/// Created once per configuration and never mutated.
#[derive(Clone, Debug)]
pub struct CovarianceStructure {
    covariance: Matrix,
    cholesky: CholeskyFactor,
}

impl CovarianceStructure {
    /// Number of factors.
    #[inline]
    pub fn dim(&self) -> usize {
        self.covariance.rows()
    }

    /// `diag(σ) · C · diag(σ)`.
    #[inline]
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    /// Lower-triangular `L` with `L · Lᵀ = Σ`.
    #[inline]
    pub fn cholesky(&self) -> &CholeskyFactor {
        &self.cholesky
    }
}

/// Lower-triangular Cholesky factor.
///
/// Used to transform independent standard normals into correlated draws.
#[derive(Clone, Debug)]
pub struct CholeskyFactor {
    lower: Matrix,
}

impl CholeskyFactor {
    /// Factorises a symmetric positive-definite matrix (Cholesky–Banachiewicz).
    ///
    /// # Errors
    ///
    /// - [`SimulationError::NonSquareMatrix`] if `matrix` is not square
    /// - [`SimulationError::NonPositiveDefinite`] if a pivot is not strictly positive
    pub fn decompose(matrix: &Matrix) -> SimulationResult<Self> {
        if !matrix.is_square() {
            return Err(SimulationError::NonSquareMatrix {
                field: "covariance",
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }

        let n = matrix.rows();
        let mut lower = Matrix::zeros(n, n);

        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..j {
                    sum += lower.get(i, k) * lower.get(j, k);
                }

                if i == j {
                    let diag = matrix.get(i, i) - sum;
                    if diag.is_nan() || diag <= 0.0 {
                        return Err(SimulationError::NonPositiveDefinite {
                            pivot: i,
                            value: diag,
                        });
                    }
                    lower.set(i, i, diag.sqrt());
                } else {
                    lower.set(i, j, (matrix.get(i, j) - sum) / lower.get(j, j));
                }
            }
        }

        Ok(Self { lower })
    }

    /// Wraps an existing lower-triangular matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NonSquareMatrix`] if `lower` is not square.
    /// Entries above the diagonal are ignored by [`transform`](Self::transform).
    pub fn from_lower(lower: Matrix) -> SimulationResult<Self> {
        if !lower.is_square() {
            return Err(SimulationError::NonSquareMatrix {
                field: "cholesky_factor",
                rows: lower.rows(),
                cols: lower.cols(),
            });
        }
        Ok(Self { lower })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.lower.rows()
    }

    /// Element at `(i, j)`; zero above the diagonal.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if j > i {
            0.0
        } else {
            self.lower.get(i, j)
        }
    }

    /// Computes `L · z` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `z` or `out` is shorter than [`dim`](Self::dim).
    #[inline]
    pub fn transform_into(&self, z: &[f64], out: &mut [f64]) {
        let n = self.dim();
        assert!(
            z.len() >= n && out.len() >= n,
            "input length {} / output length {} below dimension {}",
            z.len(),
            out.len(),
            n
        );

        for (i, slot) in out.iter_mut().enumerate().take(n) {
            let row = self.lower.row(i);
            *slot = row[..=i].iter().zip(z).map(|(l, x)| l * x).sum();
        }
    }

    /// Computes `L · z` into a new vector.
    pub fn transform(&self, z: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.dim()];
        self.transform_into(z, &mut out);
        out
    }

    /// Reconstructs `L · Lᵀ`.
    pub fn reconstruct(&self) -> Matrix {
        let n = self.dim();
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let sum = (0..=i.min(j)).map(|k| self.get(i, k) * self.get(j, k)).sum();
                m.set(i, j, sum);
            }
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn corr2(rho: f64) -> Matrix {
        Matrix::from_rows(&[vec![1.0, rho], vec![rho, 1.0]]).unwrap()
    }

    fn reference_correlation() -> Matrix {
        #[rustfmt::skip]
        let rows = [
            vec![1.0, 0.3, -0.2],
            vec![0.3, 1.0, 0.1],
            vec![-0.2, 0.1, 1.0],
        ];
        Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_build_covariance() {
        let s = CorrelationStructureBuilder::build(&[0.1, 0.2], &corr2(0.5)).unwrap();
        let cov = s.covariance();
        assert_abs_diff_eq!(cov.get(0, 0), 0.01, epsilon = 1e-15);
        assert_abs_diff_eq!(cov.get(1, 1), 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(cov.get(0, 1), 0.01, epsilon = 1e-15);
        assert_abs_diff_eq!(cov.get(1, 0), 0.01, epsilon = 1e-15);
        assert_eq!(s.dim(), 2);
    }

    #[test]
    fn test_cholesky_2x2() {
        let s = CorrelationStructureBuilder::build(&[1.0, 1.0], &corr2(0.5)).unwrap();
        let l = s.cholesky();
        // L = [[1, 0], [0.5, sqrt(0.75)]]
        assert_abs_diff_eq!(l.get(0, 0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.get(1, 0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(l.get(1, 1), 0.75_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(l.get(0, 1), 0.0);
    }

    #[test]
    fn test_cholesky_reconstruction() {
        let s = CorrelationStructureBuilder::build(&[0.01, 0.008, 0.006], &reference_correlation())
            .unwrap();
        let rebuilt = s.cholesky().reconstruct();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(rebuilt.get(i, j), s.covariance().get(i, j), epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_non_square() {
        let corr = Matrix::zeros(2, 3);
        let err = CorrelationStructureBuilder::build(&[1.0, 1.0], &corr).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::NonSquareMatrix { rows: 2, cols: 3, .. }
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = CorrelationStructureBuilder::build(&[1.0, 1.0, 1.0], &corr2(0.1)).unwrap_err();
        assert_eq!(err, SimulationError::shape("correlation", 3, 2));
    }

    #[test]
    fn test_non_finite_volatility() {
        let err = CorrelationStructureBuilder::build(&[0.1, f64::INFINITY], &corr2(0.1)).unwrap_err();
        assert_eq!(err.field(), "volatilities[1]");

        let err = CorrelationStructureBuilder::build(&[f64::NAN, 0.1], &corr2(0.1)).unwrap_err();
        assert!(matches!(err, SimulationError::OutOfRangeParameter { .. }));
    }

    #[test]
    fn test_zero_volatility_is_singular() {
        let err = CorrelationStructureBuilder::build(&[0.1, 0.0], &corr2(0.1)).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::NonPositiveDefinite { pivot: 1, .. }
        ));
    }

    #[test]
    fn test_negative_volatility_flips_correlation_sign() {
        let positive = CorrelationStructureBuilder::build(&[0.1, 0.2], &corr2(0.3)).unwrap();
        let negative = CorrelationStructureBuilder::build(&[-0.1, 0.2], &corr2(0.3)).unwrap();

        assert_abs_diff_eq!(negative.covariance().get(0, 1), -0.006, epsilon = 1e-15);
        assert_abs_diff_eq!(negative.covariance().get(0, 0), 0.01, epsilon = 1e-15);

        let (p, n) = (positive.cholesky(), negative.cholesky());
        assert_abs_diff_eq!(n.get(0, 0), p.get(0, 0), epsilon = 1e-15);
        assert_abs_diff_eq!(n.get(1, 0), -p.get(1, 0), epsilon = 1e-15);
        assert_abs_diff_eq!(n.get(1, 1), p.get(1, 1), epsilon = 1e-15);
    }

    #[test]
    fn test_asymmetric() {
        let corr = Matrix::from_rows(&[vec![1.0, 0.5], vec![0.3, 1.0]]).unwrap();
        let err = CorrelationStructureBuilder::build(&[1.0, 1.0], &corr).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::AsymmetricCorrelation { row: 0, col: 1, .. }
        ));
    }

    #[test]
    fn test_symmetry_within_tolerance_accepted() {
        let corr = Matrix::from_rows(&[vec![1.0, 0.5], vec![0.5 + 5e-9, 1.0]]).unwrap();
        assert!(CorrelationStructureBuilder::build(&[1.0, 1.0], &corr).is_ok());
    }

    #[test]
    fn test_invalid_diagonal() {
        let corr = Matrix::from_rows(&[vec![0.9, 0.5], vec![0.5, 1.0]]).unwrap();
        let err = CorrelationStructureBuilder::build(&[1.0, 1.0], &corr).unwrap_err();
        assert_eq!(
            err,
            SimulationError::InvalidDiagonal {
                index: 0,
                value: 0.9
            }
        );
    }

    #[test]
    fn test_not_positive_definite() {
        // rho = 1 makes the covariance singular
        let err = CorrelationStructureBuilder::build(&[1.0, 1.0], &corr2(1.0)).unwrap_err();
        assert!(matches!(err, SimulationError::NonPositiveDefinite { pivot: 1, .. }));

        // symmetric, unit diagonal, but indefinite
        #[rustfmt::skip]
        let rows = [
            vec![1.0, 0.9, -0.9],
            vec![0.9, 1.0, 0.9],
            vec![-0.9, 0.9, 1.0],
        ];
        let corr = Matrix::from_rows(&rows).unwrap();
        let err = CorrelationStructureBuilder::build(&[1.0, 1.0, 1.0], &corr).unwrap_err();
        assert!(matches!(err, SimulationError::NonPositiveDefinite { .. }));
    }

    #[test]
    fn test_empty_factor_set() {
        let s = CorrelationStructureBuilder::build(&[], &Matrix::zeros(0, 0)).unwrap();
        assert_eq!(s.dim(), 0);
        assert!(s.cholesky().transform(&[]).is_empty());
    }

    #[test]
    fn test_transform() {
        let s = CorrelationStructureBuilder::build(&[1.0, 1.0], &corr2(0.5)).unwrap();
        let w = s.cholesky().transform(&[1.0, 0.0]);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_from_lower_ignores_upper_triangle() {
        let lower = Matrix::from_rows(&[vec![2.0, 99.0], vec![1.0, 3.0]]).unwrap();
        let l = CholeskyFactor::from_lower(lower).unwrap();
        assert_eq!(l.transform(&[1.0, 1.0]), vec![2.0, 4.0]);
        assert!(CholeskyFactor::from_lower(Matrix::zeros(1, 2)).is_err());
    }
}
