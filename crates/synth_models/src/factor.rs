//! Correlated multi-factor Gaussian random walk.
//!
//! For each step `t` a vector of `F` independent standard normals `z_t` is
//! drawn and mapped to a correlated increment through the Cholesky factor of
//! the factor covariance:
//!
//! ```text
//! x_t     = L · z_t
//! level_t = level_{t-1} + x_t,   level_0 = x_0
//! ```
//!
//! Draws are consumed strictly in order `t = 0..T`, `F` values per step, so
//! a given seed always reproduces the same increments.

use synth_core::math::{CholeskyFactor, CorrelationStructureBuilder, CovarianceStructure, Matrix};
use synth_core::rng::PathRng;
use synth_core::{SimulationError, SimulationResult};

/// Inputs for a factor simulation.
///
/// # Examples
///
/// ```rust
/// use synth_core::math::Matrix;
/// use synth_models::factor::FactorModelConfig;
///
/// let config = FactorModelConfig::new(vec![0.01], Matrix::identity(1), 10, 1);
/// assert_eq!(config.num_factors(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct FactorModelConfig {
    /// Per-factor volatility (length F).
    pub volatilities: Vec<f64>,
    /// Factor correlation matrix (F x F).
    pub correlation: Matrix,
    /// Number of time steps T.
    pub steps: usize,
    /// Seed of the factor stream.
    pub seed: u64,
}

impl FactorModelConfig {
    pub fn new(volatilities: Vec<f64>, correlation: Matrix, steps: usize, seed: u64) -> Self {
        Self {
            volatilities,
            correlation,
            steps,
            seed,
        }
    }

    /// Number of factors F.
    #[inline]
    pub fn num_factors(&self) -> usize {
        self.volatilities.len()
    }

    /// Checks the step count and derives the covariance structure.
    pub fn covariance_structure(&self) -> SimulationResult<CovarianceStructure> {
        validate_steps(self.steps)?;
        CorrelationStructureBuilder::build(&self.volatilities, &self.correlation)
    }
}

fn validate_steps(steps: usize) -> SimulationResult<()> {
    if steps == 0 {
        return Err(SimulationError::out_of_range(
            "steps",
            steps as f64,
            "must be a positive integer",
        ));
    }
    Ok(())
}

/// Factor increments and cumulative levels, both `T x F`.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorPaths {
    increments: Matrix,
    levels: Matrix,
}

impl FactorPaths {
    /// Per-step correlated increments.
    #[inline]
    pub fn increments(&self) -> &Matrix {
        &self.increments
    }

    /// Running sums of the increments.
    #[inline]
    pub fn levels(&self) -> &Matrix {
        &self.levels
    }

    /// Number of time steps T.
    #[inline]
    pub fn steps(&self) -> usize {
        self.increments.rows()
    }

    /// Number of factors F.
    #[inline]
    pub fn num_factors(&self) -> usize {
        self.increments.cols()
    }
}

/// Generates correlated factor increments from a validated covariance.
pub struct FactorPathSimulator<'a> {
    cholesky: &'a CholeskyFactor,
}

impl<'a> FactorPathSimulator<'a> {
    pub fn new(structure: &'a CovarianceStructure) -> Self {
        Self::from_cholesky(structure.cholesky())
    }

    pub fn from_cholesky(cholesky: &'a CholeskyFactor) -> Self {
        Self { cholesky }
    }

    /// Runs `steps` steps on a fresh stream seeded with `seed`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::OutOfRangeParameter`] if `steps == 0`.
    pub fn simulate(&self, steps: usize, seed: u64) -> SimulationResult<FactorPaths> {
        let mut rng = PathRng::from_seed(seed);
        self.simulate_with_rng(steps, &mut rng)
    }

    /// Runs `steps` steps drawing from a caller-owned stream.
    pub fn simulate_with_rng(&self, steps: usize, rng: &mut PathRng) -> SimulationResult<FactorPaths> {
        validate_steps(steps)?;

        let n_factors = self.cholesky.dim();
        let mut increments = Matrix::zeros(steps, n_factors);
        let mut levels = Matrix::zeros(steps, n_factors);
        let mut z = vec![0.0; n_factors];

        for t in 0..steps {
            rng.fill_normal(&mut z);
            self.cholesky.transform_into(&z, increments.row_mut(t));
        }

        levels.row_mut(0).copy_from_slice(increments.row(0));
        for t in 1..steps {
            let (prev, next) = levels.step_rows_mut(t - 1);
            for ((level, &p), &dx) in next.iter_mut().zip(prev).zip(increments.row(t)) {
                *level = p + dx;
            }
        }

        tracing::debug!(steps, factors = n_factors, seed = rng.seed(), "factor paths simulated");

        Ok(FactorPaths { increments, levels })
    }
}

/// Validates `config`, builds its covariance structure and simulates.
///
/// # Errors
///
/// - [`SimulationError::OutOfRangeParameter`] for `steps == 0` or a bad volatility
/// - [`SimulationError::NonSquareMatrix`], [`SimulationError::ShapeMismatch`],
///   [`SimulationError::AsymmetricCorrelation`], [`SimulationError::InvalidDiagonal`]
///   for a malformed correlation matrix
/// - [`SimulationError::NonPositiveDefinite`] if the covariance has no Cholesky factor
pub fn simulate_factor_paths(config: &FactorModelConfig) -> SimulationResult<FactorPaths> {
    let structure = config.covariance_structure()?;
    FactorPathSimulator::new(&structure).simulate(config.steps, config.seed)
}
