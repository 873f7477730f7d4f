//! Scenario configuration management
//!
//! Handles loading configuration from TOML files, environment variables and
//! CLI arguments, in that order of increasing precedence.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use synth_core::math::Matrix;
use synth_core::SimulationResult;
use synth_models::factor::FactorModelConfig;
use synth_models::heston::{ExecutionPolicy, HestonConfig};
use thiserror::Error;

/// Environment variable overriding the master seed.
pub const ENV_SEED: &str = "SYNTH_SEED";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "SYNTH_LOG_LEVEL";
/// Environment variable overriding the number of trading days.
pub const ENV_TRADING_DAYS: &str = "SYNTH_TRADING_DAYS";
/// Environment variable overriding the number of assets.
pub const ENV_NUM_ASSETS: &str = "SYNTH_NUM_ASSETS";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid calendar: {0}")]
    InvalidCalendar(String),

    #[error("Invalid tickers: {expected} assets configured but only {actual} tickers given")]
    InvalidTickers { expected: usize, actual: usize },

    #[error("Invalid loadings: {0}")]
    InvalidLoadings(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

/// Factor covariance inputs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FactorSettings {
    /// Per-factor volatility.
    pub volatilities: Vec<f64>,
    /// Factor correlation matrix, one inner vector per row.
    pub correlation: Vec<Vec<f64>>,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            volatilities: vec![0.01, 0.008, 0.006],
            correlation: vec![
                vec![1.0, 0.3, -0.2],
                vec![0.3, 1.0, 0.1],
                vec![-0.2, 0.1, 1.0],
            ],
        }
    }
}

impl FactorSettings {
    /// Number of factors F.
    pub fn num_factors(&self) -> usize {
        self.volatilities.len()
    }

    /// Builds the factor model inputs for `steps` steps.
    pub fn to_model(&self, steps: usize, seed: u64) -> SimulationResult<FactorModelConfig> {
        let correlation = Matrix::from_rows(&self.correlation)?;
        Ok(FactorModelConfig::new(
            self.volatilities.clone(),
            correlation,
            steps,
            seed,
        ))
    }
}

/// Heston dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HestonSettings {
    pub kappa: f64,
    pub theta: f64,
    pub sigma_v: f64,
    pub rho: f64,
    pub dt: f64,
    pub idio_vol: f64,
}

impl Default for HestonSettings {
    fn default() -> Self {
        let reference = HestonConfig::default();
        Self {
            kappa: reference.kappa(),
            theta: reference.theta(),
            sigma_v: reference.sigma_v(),
            rho: reference.rho(),
            dt: reference.dt(),
            idio_vol: reference.idio_vol(),
        }
    }
}

impl HestonSettings {
    /// Validates into a [`HestonConfig`].
    pub fn to_config(&self) -> SimulationResult<HestonConfig> {
        HestonConfig::new(
            self.kappa,
            self.theta,
            self.sigma_v,
            self.rho,
            self.dt,
            self.idio_vol,
        )
    }
}

/// Factor loading source.
///
/// With `matrix` unset, loadings are drawn as `scale * N(0, 1)`. A matrix
/// with a single row is broadcast to every asset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoadingSettings {
    pub scale: f64,
    pub matrix: Option<Vec<Vec<f64>>>,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            scale: 0.5,
            matrix: None,
        }
    }
}

/// Trading session layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// First session open, e.g. `"2025-01-06T09:30:00"`.
    pub start: NaiveDateTime,
    pub trading_days: u32,
    pub hours_per_day: f64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2025, 1, 6)
                .and_then(|date| date.and_hms_opt(9, 30, 0))
                .unwrap_or_default(),
            trading_days: 5,
            hours_per_day: 6.5,
        }
    }
}

/// Complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Master seed; each stage draws from its own sub-stream.
    pub seed: u64,
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    pub num_assets: usize,
    /// Asset labels; truncated to `num_assets`.
    pub tickers: Option<Vec<String>>,
    pub initial_price: f64,
    pub initial_variance: f64,
    pub execution: ExecutionPolicy,
    pub factors: FactorSettings,
    pub heston: HestonSettings,
    pub loadings: LoadingSettings,
    pub calendar: CalendarSettings,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            log_level: LogLevel::Info,
            num_assets: 100,
            tickers: None,
            initial_price: 100.0,
            initial_variance: 0.04,
            execution: ExecutionPolicy::Sequential,
            factors: FactorSettings::default(),
            heston: HestonSettings::default(),
            loadings: LoadingSettings::default(),
            calendar: CalendarSettings::default(),
        }
    }
}

impl ScenarioConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))
    }

    /// Apply `SYNTH_*` overrides from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = parse_env(ENV_SEED, &seed)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(days) = lookup(ENV_TRADING_DAYS) {
            self.calendar.trading_days = parse_env(ENV_TRADING_DAYS, &days)?;
        }
        if let Some(assets) = lookup(ENV_NUM_ASSETS) {
            self.num_assets = parse_env(ENV_NUM_ASSETS, &assets)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(assets) = cli.num_assets {
            self.num_assets = assets;
        }
        if let Some(days) = cli.trading_days {
            self.calendar.trading_days = days;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = LogLevel::from_str(log_level)?;
        }
        if cli.parallel {
            self.execution = ExecutionPolicy::Parallel;
        }
        Ok(())
    }

    /// Validate the settings owned by the scenario layer.
    ///
    /// Simulation parameters are checked by the simulation crates themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_assets == 0 {
            return Err(ConfigError::InvalidValue {
                field: "num_assets",
                message: "must be positive".to_string(),
            });
        }

        if let Some(tickers) = &self.tickers {
            if tickers.len() < self.num_assets {
                return Err(ConfigError::InvalidTickers {
                    expected: self.num_assets,
                    actual: tickers.len(),
                });
            }
        }

        if !self.loadings.scale.is_finite() || self.loadings.scale < 0.0 {
            return Err(ConfigError::InvalidLoadings(format!(
                "scale must be finite and >= 0, got {}",
                self.loadings.scale
            )));
        }

        if let Some(rows) = &self.loadings.matrix {
            if rows.len() != 1 && rows.len() != self.num_assets {
                return Err(ConfigError::InvalidLoadings(format!(
                    "expected 1 or {} rows, got {}",
                    self.num_assets,
                    rows.len()
                )));
            }
            let n_factors = self.factors.num_factors();
            if let Some(row) = rows.iter().find(|row| row.len() != n_factors) {
                return Err(ConfigError::InvalidLoadings(format!(
                    "expected {} columns per row, got {}",
                    n_factors,
                    row.len()
                )));
            }
        }

        if self.calendar.trading_days == 0 {
            return Err(ConfigError::InvalidCalendar(
                "trading_days must be positive".to_string(),
            ));
        }
        let hours = self.calendar.hours_per_day;
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(ConfigError::InvalidCalendar(format!(
                "hours_per_day must be in (0, 24], got {}",
                hours
            )));
        }

        Ok(())
    }

    /// Ticker labels for the configured assets.
    ///
    /// Configured tickers are truncated to `num_assets`; without them assets
    /// are labelled `ASSET_000`, `ASSET_001`, ...
    pub fn resolved_tickers(&self) -> Vec<String> {
        match &self.tickers {
            Some(tickers) => tickers.iter().take(self.num_assets).cloned().collect(),
            None => (0..self.num_assets).map(|i| format!("ASSET_{:03}", i)).collect(),
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}: invalid value '{}'", key, value)))
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Master seed override
    pub seed: Option<u64>,
    /// Asset count override
    pub num_assets: Option<usize>,
    /// Trading day count override
    pub trading_days: Option<u32>,
    /// Log level override
    pub log_level: Option<String>,
    /// Update assets in parallel within each step
    pub parallel: bool,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<ScenarioConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// Build configuration with environment variables read through `lookup`
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<ScenarioConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::default(),
    };

    config.apply_env_with(lookup)?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
