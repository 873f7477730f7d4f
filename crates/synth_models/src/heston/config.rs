//! Heston stage configuration.
//!
//! [`HestonConfig`] is validated once at construction and immutable
//! afterwards. Use [`HestonConfigBuilder`] to construct instances.

use synth_core::{SimulationError, SimulationResult};

/// How per-asset updates within a time step are executed.
///
/// Both policies consume random draws in the same order and produce
/// bit-identical output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExecutionPolicy {
    /// One asset after another on the calling thread.
    #[default]
    Sequential,
    /// Assets of the same step updated concurrently on the rayon pool.
    Parallel,
}

/// Heston dynamics and idiosyncratic noise parameters.
///
/// # Examples
///
/// ```rust
/// use synth_models::heston::HestonConfig;
///
/// let config = HestonConfig::builder()
///     .kappa(1.5)
///     .theta(0.04)
///     .sigma_v(0.3)
///     .rho(-0.7)
///     .dt(1.0)
///     .idio_vol(0.005)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.rho(), -0.7);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HestonConfig {
    kappa: f64,
    theta: f64,
    sigma_v: f64,
    rho: f64,
    dt: f64,
    idio_vol: f64,
}

impl HestonConfig {
    /// Creates and validates a configuration.
    pub fn new(
        kappa: f64,
        theta: f64,
        sigma_v: f64,
        rho: f64,
        dt: f64,
        idio_vol: f64,
    ) -> SimulationResult<Self> {
        let config = Self {
            kappa,
            theta,
            sigma_v,
            rho,
            dt,
            idio_vol,
        };
        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn builder() -> HestonConfigBuilder {
        HestonConfigBuilder::default()
    }

    /// Mean-reversion speed.
    #[inline]
    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    /// Long-run variance.
    #[inline]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Volatility of variance.
    #[inline]
    pub fn sigma_v(&self) -> f64 {
        self.sigma_v
    }

    /// Price/variance noise correlation.
    #[inline]
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Step size.
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Idiosyncratic volatility.
    #[inline]
    pub fn idio_vol(&self) -> f64 {
        self.idio_vol
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// [`SimulationError::OutOfRangeParameter`] naming the first offending
    /// field, checked in the order `dt`, `kappa`, `theta`, `sigma_v`, `rho`,
    /// `idio_vol`. Non-finite values are always rejected.
    pub fn validate(&self) -> SimulationResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimulationError::out_of_range("dt", self.dt, "must be > 0"));
        }
        non_negative("kappa", self.kappa)?;
        non_negative("theta", self.theta)?;
        non_negative("sigma_v", self.sigma_v)?;
        if !self.rho.is_finite() || !(-1.0..=1.0).contains(&self.rho) {
            return Err(SimulationError::out_of_range(
                "rho",
                self.rho,
                "must be in [-1, 1]",
            ));
        }
        non_negative("idio_vol", self.idio_vol)?;
        Ok(())
    }

    /// Whether `2 κ θ > σ_v²`.
    ///
    /// The Euler scheme here floors variance instead of relying on this
    /// condition, so a violation is informational only.
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma_v * self.sigma_v
    }

    /// `2 κ θ / σ_v²`; infinite when `σ_v = 0`.
    pub fn feller_ratio(&self) -> f64 {
        let denominator = self.sigma_v * self.sigma_v;
        if denominator > 0.0 {
            2.0 * self.kappa * self.theta / denominator
        } else {
            f64::INFINITY
        }
    }
}

impl Default for HestonConfig {
    fn default() -> Self {
        Self {
            kappa: 1.5,
            theta: 0.04,
            sigma_v: 0.3,
            rho: -0.7,
            dt: 1.0,
            idio_vol: 0.005,
        }
    }
}

fn non_negative(name: &'static str, value: f64) -> SimulationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::out_of_range(name, value, "must be >= 0"));
    }
    Ok(())
}

/// Builder for [`HestonConfig`].
///
/// Unset fields take the values of [`HestonConfig::default`]. Validation
/// happens in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct HestonConfigBuilder {
    config: HestonConfig,
}

impl Default for HestonConfigBuilder {
    fn default() -> Self {
        Self {
            config: HestonConfig::default(),
        }
    }
}

impl HestonConfigBuilder {
    #[inline]
    pub fn kappa(mut self, kappa: f64) -> Self {
        self.config.kappa = kappa;
        self
    }

    #[inline]
    pub fn theta(mut self, theta: f64) -> Self {
        self.config.theta = theta;
        self
    }

    #[inline]
    pub fn sigma_v(mut self, sigma_v: f64) -> Self {
        self.config.sigma_v = sigma_v;
        self
    }

    #[inline]
    pub fn rho(mut self, rho: f64) -> Self {
        self.config.rho = rho;
        self
    }

    #[inline]
    pub fn dt(mut self, dt: f64) -> Self {
        self.config.dt = dt;
        self
    }

    #[inline]
    pub fn idio_vol(mut self, idio_vol: f64) -> Self {
        self.config.idio_vol = idio_vol;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> SimulationResult<HestonConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
