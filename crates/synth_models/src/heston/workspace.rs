//! Per-step scratch buffers for the Heston recurrence.
//!
//! All buffers have length N and are allocated once per simulation. Each
//! step refills them in a fixed order before any asset is updated, which is
//! what keeps sequential and parallel execution bit-identical.
//!
//! # Draw Order
//!
//! For every step, from the Heston stream:
//! 1. N idiosyncratic normals (asset 0..N)
//! 2. N price-noise normals (asset 0..N)
//! 3. N variance-noise normals (asset 0..N)

use synth_core::math::Matrix;
use synth_core::rng::PathRng;

/// Scratch buffers reused across time steps.
pub(crate) struct StepWorkspace {
    /// `loadings · increments[t]`.
    factor_contribution: Vec<f64>,
    /// `idio_vol · z · sqrt(dt)`.
    idiosyncratic: Vec<f64>,
    price_noise: Vec<f64>,
    vol_noise: Vec<f64>,
}

/// Inputs for one asset at one step.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AssetShock {
    pub drift: f64,
    pub price_noise: f64,
    pub vol_noise: f64,
}

impl StepWorkspace {
    pub fn new(n_assets: usize) -> Self {
        Self {
            factor_contribution: vec![0.0; n_assets],
            idiosyncratic: vec![0.0; n_assets],
            price_noise: vec![0.0; n_assets],
            vol_noise: vec![0.0; n_assets],
        }
    }

    /// Loads step `t`: factor contribution first, then the step's draws.
    pub fn prepare(
        &mut self,
        loadings: &Matrix,
        factor_increment: &[f64],
        rng: &mut PathRng,
        idio_vol: f64,
        sqrt_dt: f64,
    ) {
        loadings.mul_vec_into(factor_increment, &mut self.factor_contribution);

        rng.fill_normal(&mut self.idiosyncratic);
        for shock in self.idiosyncratic.iter_mut() {
            *shock = idio_vol * *shock * sqrt_dt;
        }

        rng.fill_normal(&mut self.price_noise);
        rng.fill_normal(&mut self.vol_noise);
    }

    /// Shock for asset `i` from the most recent [`prepare`](Self::prepare).
    #[inline]
    pub fn shock(&self, i: usize) -> AssetShock {
        AssetShock {
            drift: self.factor_contribution[i] + self.idiosyncratic[i],
            price_noise: self.price_noise[i],
            vol_noise: self.vol_noise[i],
        }
    }
}
