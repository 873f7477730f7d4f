//! # synth_core: foundation for synthetic market path generation
//!
//! This crate holds the pieces every simulator in the workspace shares:
//!
//! - [`math`]: dense row-major matrices and the correlation/covariance
//!   builder with Cholesky factorisation
//! - [`rng`]: explicitly owned, seeded standard-normal streams
//! - [`error`]: the tagged validation errors returned by every entry point
//!
//! Nothing in here touches the filesystem, the network or any process-wide
//! state. Each simulation call owns its own [`rng::PathRng`].
//!
//! ## Example
//!
//! ```rust
//! use synth_core::math::{CorrelationStructureBuilder, Matrix};
//! use synth_core::rng::PathRng;
//!
//! let correlation = Matrix::from_rows(&[vec![1.0, 0.3], vec![0.3, 1.0]]).unwrap();
//! let structure = CorrelationStructureBuilder::build(&[0.01, 0.02], &correlation).unwrap();
//!
//! let mut rng = PathRng::from_seed(42);
//! let mut z = [0.0; 2];
//! rng.fill_normal(&mut z);
//! let correlated = structure.cholesky().transform(&z);
//! assert_eq!(correlated.len(), 2);
//! ```

pub mod error;
pub mod math;
pub mod rng;

pub use error::{SimulationError, SimulationResult};
