//! # synth_models: factor and stochastic-volatility path simulators
//!
//! Two pure simulation stages, run in this order:
//!
//! 1. [`factor`]: correlated multi-factor Gaussian random walk. Produces
//!    per-step factor increments (`T x F`) and their running levels.
//! 2. [`heston`]: multi-asset Heston-style simulator. Each asset's drift is
//!    its exposure to the factor increments plus idiosyncratic noise; its
//!    variance follows an Euler-discretised CIR recurrence. Produces price
//!    and variance matrices (`(T+1) x N`).
//!
//! Both stages validate every input before drawing a single random number
//! and return [`synth_core::SimulationError`] on failure.
//!
//! ## Example
//!
//! ```rust
//! use synth_core::math::Matrix;
//! use synth_models::factor::{simulate_factor_paths, FactorModelConfig};
//! use synth_models::heston::{simulate_heston_paths, HestonConfig};
//!
//! let correlation = Matrix::from_rows(&[vec![1.0, 0.3], vec![0.3, 1.0]]).unwrap();
//! let factors = simulate_factor_paths(&FactorModelConfig::new(
//!     vec![0.01, 0.008],
//!     correlation,
//!     100,
//!     42,
//! ))
//! .unwrap();
//!
//! let loadings = Matrix::from_rows(&[vec![0.5, -0.2], vec![1.0, 0.0]]).unwrap();
//! let config = HestonConfig::builder().dt(1.0 / 23_400.0).build().unwrap();
//!
//! let paths = simulate_heston_paths(
//!     &[100.0, 50.0],
//!     &[0.04, 0.04],
//!     &config,
//!     factors.increments(),
//!     &loadings,
//!     7,
//! )
//! .unwrap();
//!
//! assert_eq!(paths.prices().shape(), (101, 2));
//! ```

pub mod factor;
pub mod heston;

pub use factor::{simulate_factor_paths, FactorModelConfig, FactorPathSimulator, FactorPaths};
pub use heston::{
    simulate_heston_paths, AssetPathState, ExecutionPolicy, HestonConfig, HestonPathSimulator,
};
