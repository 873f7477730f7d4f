//! # Seeded Random Streams
//!
//! Every simulation call owns its own [`PathRng`]. There is no process-wide
//! generator, so concurrent or repeated calls cannot disturb one another's
//! sequences.
//!
//! ## Stream Layout
//!
//! A scenario derives independent streams from one master seed with
//! [`PathRng::substream`]:
//!
//! | Index | Consumer |
//! |-------|----------|
//! | [`FACTOR_STREAM`] | factor increments |
//! | [`HESTON_STREAM`] | idiosyncratic, price and variance noise |
//! | [`LOADING_STREAM`] | randomly drawn factor loadings |
//!
//! ## Usage Example
//!
//! ```rust
//! use synth_core::rng::{PathRng, FACTOR_STREAM};
//!
//! let master = PathRng::from_seed(42);
//! let mut factor_rng = master.substream(FACTOR_STREAM);
//!
//! let mut buffer = vec![0.0; 8];
//! factor_rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::PathRng;

/// Sub-stream index for factor increments.
pub const FACTOR_STREAM: u64 = 0;

/// Sub-stream index for the Heston stage.
pub const HESTON_STREAM: u64 = 1;

/// Sub-stream index for generated factor loadings.
pub const LOADING_STREAM: u64 = 2;

#[cfg(test)]
mod tests;
