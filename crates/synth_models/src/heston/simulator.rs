//! Euler recurrence for the multi-asset Heston stage.

use rayon::prelude::*;
use synth_core::math::Matrix;
use synth_core::rng::PathRng;
use synth_core::{SimulationError, SimulationResult};

use super::config::{ExecutionPolicy, HestonConfig};
use super::state::AssetPathState;
use super::workspace::{AssetShock, StepWorkspace};

/// Lower bound applied to every simulated variance.
pub const VARIANCE_FLOOR: f64 = 1e-12;

/// Lower bound applied to every simulated price.
pub const PRICE_FLOOR: f64 = 1e-8;

/// Per-simulation constants of the Euler step.
#[derive(Clone, Copy, Debug)]
struct StepCoefficients {
    kappa: f64,
    theta: f64,
    sigma_v: f64,
    rho: f64,
    rho_bar: f64,
    dt: f64,
    sqrt_dt: f64,
}

impl StepCoefficients {
    fn new(config: &HestonConfig) -> Self {
        let rho = config.rho();
        Self {
            kappa: config.kappa(),
            theta: config.theta(),
            sigma_v: config.sigma_v(),
            rho,
            rho_bar: (1.0 - rho * rho).max(0.0).sqrt(),
            dt: config.dt(),
            sqrt_dt: config.dt().sqrt(),
        }
    }

    #[inline]
    fn advance(&self, price: f64, variance: f64, shock: AssetShock) -> (f64, f64) {
        let dw_v = shock.vol_noise * self.sqrt_dt;
        let dw_s = self.rho * dw_v + self.rho_bar * shock.price_noise * self.sqrt_dt;
        let vol = variance.max(0.0).sqrt();

        let next_variance = variance
            + self.kappa * (self.theta - variance) * self.dt
            + self.sigma_v * vol * dw_v;
        let next_price = price + price * (shock.drift + vol * dw_s);

        (next_price.max(PRICE_FLOOR), next_variance.max(VARIANCE_FLOOR))
    }
}

/// One Euler step for a single asset, returning `(next_price, next_variance)`.
///
/// `drift` is the asset's factor contribution plus its idiosyncratic shock;
/// `price_noise` and `vol_noise` are the raw standard normals for the step.
///
/// ```text
/// dW_v = vol_noise · √dt
/// dW_s = ρ · dW_v + √(1 − ρ²) · price_noise · √dt
/// v'   = max(v + κ(θ − v)dt + σ_v √max(v,0) dW_v, 1e-12)
/// S'   = max(S + S (drift + √max(v,0) dW_s), 1e-8)
/// ```
pub fn euler_step(
    config: &HestonConfig,
    price: f64,
    variance: f64,
    drift: f64,
    price_noise: f64,
    vol_noise: f64,
) -> (f64, f64) {
    StepCoefficients::new(config).advance(
        price,
        variance,
        AssetShock {
            drift,
            price_noise,
            vol_noise,
        },
    )
}

/// Multi-asset Heston path simulator.
///
/// # Examples
///
/// ```rust
/// use synth_core::math::Matrix;
/// use synth_core::rng::PathRng;
/// use synth_models::heston::{ExecutionPolicy, HestonConfig, HestonPathSimulator};
///
/// let simulator = HestonPathSimulator::new(HestonConfig::default())
///     .with_policy(ExecutionPolicy::Parallel);
///
/// let increments = Matrix::zeros(10, 1);
/// let loadings = Matrix::from_rows(&[vec![0.5], vec![-0.3]]).unwrap();
/// let mut rng = PathRng::from_seed(1);
///
/// let state = simulator
///     .simulate(&[100.0, 20.0], &[0.04, 0.04], &increments, &loadings, &mut rng)
///     .unwrap();
/// assert_eq!(state.prices().shape(), (11, 2));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HestonPathSimulator {
    config: HestonConfig,
    policy: ExecutionPolicy,
}

impl HestonPathSimulator {
    pub fn new(config: HestonConfig) -> Self {
        Self {
            config,
            policy: ExecutionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn config(&self) -> &HestonConfig {
        &self.config
    }

    #[inline]
    pub fn policy(&self) -> ExecutionPolicy {
        self.policy
    }

    /// Checks the inputs of [`simulate`](Self::simulate) without drawing.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::ShapeMismatch`] when `initial_variances`, the
    ///   loading rows or the loading columns disagree with N or F
    /// - [`SimulationError::OutOfRangeParameter`] for a non-finite or
    ///   non-positive initial price, or a non-finite or negative initial
    ///   variance
    pub fn validate_inputs(
        &self,
        initial_prices: &[f64],
        initial_variances: &[f64],
        factor_increments: &Matrix,
        factor_loadings: &Matrix,
    ) -> SimulationResult<()> {
        let n_assets = initial_prices.len();

        if initial_variances.len() != n_assets {
            return Err(SimulationError::shape(
                "initial_variances",
                n_assets,
                initial_variances.len(),
            ));
        }
        if factor_loadings.rows() != n_assets {
            return Err(SimulationError::shape(
                "factor_loadings",
                n_assets,
                factor_loadings.rows(),
            ));
        }
        if factor_loadings.cols() != factor_increments.cols() {
            return Err(SimulationError::shape(
                "factor_loadings.cols",
                factor_increments.cols(),
                factor_loadings.cols(),
            ));
        }

        for (i, &price) in initial_prices.iter().enumerate() {
            if !price.is_finite() || price <= 0.0 {
                return Err(SimulationError::out_of_range(
                    format!("initial_prices[{i}]"),
                    price,
                    "must be finite and > 0",
                ));
            }
        }
        for (i, &variance) in initial_variances.iter().enumerate() {
            if !variance.is_finite() || variance < 0.0 {
                return Err(SimulationError::out_of_range(
                    format!("initial_variances[{i}]"),
                    variance,
                    "must be finite and >= 0",
                ));
            }
        }

        Ok(())
    }

    /// Simulates one path per asset over `factor_increments.rows()` steps.
    ///
    /// Draws `3N` normals per step from `rng` in the order idiosyncratic,
    /// price noise, variance noise. Nothing is drawn when validation fails.
    pub fn simulate(
        &self,
        initial_prices: &[f64],
        initial_variances: &[f64],
        factor_increments: &Matrix,
        factor_loadings: &Matrix,
        rng: &mut PathRng,
    ) -> SimulationResult<AssetPathState> {
        self.validate_inputs(
            initial_prices,
            initial_variances,
            factor_increments,
            factor_loadings,
        )?;

        let steps = factor_increments.rows();
        let n_assets = initial_prices.len();

        tracing::debug!(
            steps,
            assets = n_assets,
            factors = factor_increments.cols(),
            policy = ?self.policy,
            "simulating heston paths"
        );

        let mut prices = Matrix::zeros(steps + 1, n_assets);
        let mut variances = Matrix::zeros(steps + 1, n_assets);
        prices.row_mut(0).copy_from_slice(initial_prices);
        variances.row_mut(0).copy_from_slice(initial_variances);

        let coefficients = StepCoefficients::new(&self.config);
        let mut workspace = StepWorkspace::new(n_assets);
        tracing::trace!(
            sqrt_dt = coefficients.sqrt_dt,
            rho_bar = coefficients.rho_bar,
            "step coefficients"
        );

        for t in 0..steps {
            workspace.prepare(
                factor_loadings,
                factor_increments.row(t),
                rng,
                self.config.idio_vol(),
                coefficients.sqrt_dt,
            );

            let (prev_prices, next_prices) = prices.step_rows_mut(t);
            let (prev_variances, next_variances) = variances.step_rows_mut(t);
            let workspace = &workspace;

            match self.policy {
                ExecutionPolicy::Sequential => {
                    for (i, (price, variance)) in
                        next_prices.iter_mut().zip(next_variances.iter_mut()).enumerate()
                    {
                        (*price, *variance) = coefficients.advance(
                            prev_prices[i],
                            prev_variances[i],
                            workspace.shock(i),
                        );
                    }
                }
                ExecutionPolicy::Parallel => {
                    next_prices
                        .par_iter_mut()
                        .zip(next_variances.par_iter_mut())
                        .enumerate()
                        .for_each(|(i, (price, variance))| {
                            (*price, *variance) = coefficients.advance(
                                prev_prices[i],
                                prev_variances[i],
                                workspace.shock(i),
                            );
                        });
                }
            }
        }

        tracing::debug!(steps, assets = n_assets, "heston paths simulated");

        Ok(AssetPathState::new(prices, variances))
    }
}

/// Validates the inputs and simulates on a fresh stream seeded with `seed`,
/// updating assets sequentially.
pub fn simulate_heston_paths(
    initial_prices: &[f64],
    initial_variances: &[f64],
    config: &HestonConfig,
    factor_increments: &Matrix,
    factor_loadings: &Matrix,
    seed: u64,
) -> SimulationResult<AssetPathState> {
    let mut rng = PathRng::from_seed(seed);
    HestonPathSimulator::new(*config).simulate(
        initial_prices,
        initial_variances,
        factor_increments,
        factor_loadings,
        &mut rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_config() -> HestonConfig {
        HestonConfig::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.0).unwrap()
    }

    #[test]
    fn test_euler_step_zero_noise_is_identity() {
        let (price, variance) = euler_step(&flat_config(), 100.0, 0.04, 0.0, 0.0, 0.0);
        assert_eq!(price, 100.0);
        assert_eq!(variance, 0.04);
    }

    #[test]
    fn test_euler_step_mean_reversion() {
        let config = HestonConfig::new(2.0, 0.04, 0.0, 0.0, 0.1, 0.0).unwrap();
        let (_, variance) = euler_step(&config, 100.0, 0.09, 0.0, 0.0, 0.0);
        // 0.09 + 2 * (0.04 - 0.09) * 0.1
        assert_relative_eq!(variance, 0.08, epsilon = 1e-15);
    }

    #[test]
    fn test_euler_step_hand_computed() {
        let config = HestonConfig::new(1.5, 0.04, 0.3, -0.5, 0.25, 0.0).unwrap();
        let (price, variance) = euler_step(&config, 100.0, 0.04, 0.001, 1.0, 2.0);

        let dw_v = 2.0 * 0.5;
        let dw_s = -0.5 * dw_v + (0.75_f64).sqrt() * 1.0 * 0.5;
        let expected_v = 0.04 + 1.5 * (0.04 - 0.04) * 0.25 + 0.3 * 0.2 * dw_v;
        let expected_s = 100.0 + 100.0 * (0.001 + 0.2 * dw_s);

        assert_relative_eq!(variance, expected_v, max_relative = 1e-12);
        assert_relative_eq!(price, expected_s, max_relative = 1e-12);
    }

    #[test]
    fn test_euler_step_floors() {
        let config = HestonConfig::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.0).unwrap();
        let (_, variance) = euler_step(&config, 100.0, 0.04, 0.0, 0.0, -10.0);
        assert_eq!(variance, VARIANCE_FLOOR);

        let (price, _) = euler_step(&flat_config(), 100.0, 0.04, -5.0, 0.0, 0.0);
        assert_eq!(price, PRICE_FLOOR);
    }

    #[test]
    fn test_euler_step_negative_variance_treated_as_zero() {
        let (price, variance) = euler_step(&flat_config(), 50.0, -0.01, 0.0, 3.0, 3.0);
        assert_eq!(price, 50.0);
        assert_eq!(variance, VARIANCE_FLOOR);
    }

    #[test]
    fn test_euler_step_rho_extremes() {
        let full = HestonConfig::new(1.0, 0.04, 0.2, 1.0, 0.5, 0.0).unwrap();
        let a = euler_step(&full, 100.0, 0.04, 0.0, -2.0, 0.7);
        let b = euler_step(&full, 100.0, 0.04, 0.0, 3.0, 0.7);
        assert_eq!(a, b);

        let none = HestonConfig::new(1.0, 0.04, 0.2, 0.0, 0.5, 0.0).unwrap();
        let a = euler_step(&none, 100.0, 0.04, 0.0, 0.4, -1.0);
        let b = euler_step(&none, 100.0, 0.04, 0.0, 0.4, 1.5);
        assert_eq!(a.0, b.0);
        assert_ne!(a.1, b.1);
    }

    #[test]
    fn test_euler_step_rho_minus_one_mirrors_vol_noise() {
        let config = HestonConfig::new(1.0, 0.04, 0.2, -1.0, 0.5, 0.0).unwrap();
        let a = euler_step(&config, 100.0, 0.04, 0.0, -2.0, 0.7);
        let b = euler_step(&config, 100.0, 0.04, 0.0, 3.0, 0.7);
        assert_eq!(a, b);

        // dW_s = -dW_v
        let expected = 100.0 + 100.0 * 0.2 * (-0.7 * 0.5_f64.sqrt());
        assert_relative_eq!(a.0, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_simulate_shapes_and_initial_row() {
        let increments = Matrix::zeros(25, 2);
        let loadings = Matrix::from_rows(&[vec![0.1, 0.2], vec![0.3, 0.4], vec![0.0, 0.0]]).unwrap();
        let state = simulate_heston_paths(
            &[100.0, 50.0, 10.0],
            &[0.04, 0.02, 0.09],
            &HestonConfig::default(),
            &increments,
            &loadings,
            5,
        )
        .unwrap();

        assert_eq!(state.prices().shape(), (26, 3));
        assert_eq!(state.variances().shape(), (26, 3));
        assert_eq!(state.prices().row(0), &[100.0, 50.0, 10.0]);
        assert_eq!(state.variances().row(0), &[0.04, 0.02, 0.09]);
    }

    #[test]
    fn test_simulate_consumes_three_draws_per_asset_step() {
        let increments = Matrix::zeros(4, 0);
        let loadings = Matrix::zeros(2, 0);
        let simulator = HestonPathSimulator::new(HestonConfig::default());

        let mut rng = PathRng::from_seed(8);
        simulator
            .simulate(&[1.0, 1.0], &[0.04, 0.04], &increments, &loadings, &mut rng)
            .unwrap();

        let mut replay = PathRng::from_seed(8);
        let mut skipped = vec![0.0; 4 * 3 * 2];
        replay.fill_normal(&mut skipped);
        assert_eq!(rng.gen_normal(), replay.gen_normal());
    }

    #[test]
    fn test_shape_errors() {
        let simulator = HestonPathSimulator::new(HestonConfig::default());
        let increments = Matrix::zeros(3, 2);
        let mut rng = PathRng::from_seed(1);

        let err = simulator
            .simulate(&[1.0, 1.0], &[0.04], &increments, &Matrix::zeros(2, 2), &mut rng)
            .unwrap_err();
        assert_eq!(err, SimulationError::shape("initial_variances", 2, 1));

        let err = simulator
            .simulate(&[1.0, 1.0], &[0.04, 0.04], &increments, &Matrix::zeros(3, 2), &mut rng)
            .unwrap_err();
        assert_eq!(err, SimulationError::shape("factor_loadings", 2, 3));

        let err = simulator
            .simulate(&[1.0, 1.0], &[0.04, 0.04], &increments, &Matrix::zeros(2, 1), &mut rng)
            .unwrap_err();
        assert_eq!(err, SimulationError::shape("factor_loadings.cols", 2, 1));
    }

    #[test]
    fn test_initial_condition_errors() {
        let simulator = HestonPathSimulator::new(HestonConfig::default());
        let increments = Matrix::zeros(3, 0);
        let loadings = Matrix::zeros(2, 0);
        let mut rng = PathRng::from_seed(1);

        let err = simulator
            .simulate(&[1.0, 0.0], &[0.04, 0.04], &increments, &loadings, &mut rng)
            .unwrap_err();
        assert_eq!(err.field(), "initial_prices[1]");

        let err = simulator
            .simulate(&[1.0, 1.0], &[-0.01, 0.04], &increments, &loadings, &mut rng)
            .unwrap_err();
        assert_eq!(err.field(), "initial_variances[0]");
    }

    #[test]
    fn test_no_assets() {
        let state = simulate_heston_paths(
            &[],
            &[],
            &HestonConfig::default(),
            &Matrix::zeros(5, 1),
            &Matrix::zeros(0, 1),
            3,
        )
        .unwrap();
        assert_eq!(state.prices().shape(), (6, 0));
        assert_eq!(state.num_assets(), 0);
    }
}
