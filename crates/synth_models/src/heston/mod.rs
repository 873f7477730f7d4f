//! Multi-asset Heston-style path simulator.
//!
//! Each asset carries a price `S` and variance `v`. Per step its drift is
//! the exposure to the step's factor increments plus an idiosyncratic shock:
//!
//! ```text
//! drift_i = loadings[i] · increments[t] + idio_vol · z_i · √dt
//! v'      = v + κ(θ − v)dt + σ_v √v dW_v
//! S'      = S + S (drift_i + √v dW_s)
//! ```
//!
//! with `dW_s` correlated to `dW_v` through `ρ`. Variances are floored at
//! [`VARIANCE_FLOOR`] and prices at [`PRICE_FLOOR`]; the floors are silent
//! clamps rather than errors.
//!
//! ## Components
//!
//! - [`HestonConfig`]: validated model parameters
//! - [`HestonPathSimulator`]: the recurrence, sequential or rayon-parallel
//!   across assets within a step
//! - [`AssetPathState`]: `(T+1) x N` price and variance matrices
//! - [`euler_step`]: the single-asset update

mod config;
mod simulator;
mod state;
mod workspace;

pub use config::{ExecutionPolicy, HestonConfig, HestonConfigBuilder};
pub use simulator::{
    euler_step, simulate_heston_paths, HestonPathSimulator, PRICE_FLOOR, VARIANCE_FLOOR,
};
pub use state::AssetPathState;
