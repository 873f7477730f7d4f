//! # synth_cli: scenario pipeline for synthetic market data
//!
//! Glue between configuration and the simulation crates:
//!
//! - [`config`]: TOML, environment and CLI layering into a [`config::ScenarioConfig`]
//! - [`calendar`]: second-resolution trading sessions labelling each row
//! - [`scenario`]: seeds the sub-streams and runs both simulation stages
//! - [`report`]: JSON rendering of a finished scenario

pub mod calendar;
pub mod config;
pub mod error;
pub mod report;
pub mod scenario;

pub use error::{CliError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
