//! End-to-end scenario pipeline.
//!
//! Resolves a [`ScenarioConfig`] into a calendar, factor paths, factor
//! loadings and asset paths. The master seed is split into three
//! independent sub-streams so that, for example, changing the asset count
//! leaves the factor paths untouched.
//!
//! | Stage    | Sub-stream        |
//! |----------|-------------------|
//! | factors  | `FACTOR_STREAM`   |
//! | Heston   | `HESTON_STREAM`   |
//! | loadings | `LOADING_STREAM`  |

use synth_core::math::Matrix;
use synth_core::rng::{PathRng, FACTOR_STREAM, HESTON_STREAM, LOADING_STREAM};
use synth_models::factor::{FactorPathSimulator, FactorPaths};
use synth_models::heston::{AssetPathState, HestonPathSimulator};
use tracing::{debug, info, warn};

use crate::calendar::TradingCalendar;
use crate::config::ScenarioConfig;
use crate::Result;

/// Everything a scenario run produces.
#[derive(Debug, Clone)]
pub struct ScenarioOutput {
    pub calendar: TradingCalendar,
    pub tickers: Vec<String>,
    pub factors: FactorPaths,
    /// `N x F` loadings actually used.
    pub loadings: Matrix,
    pub paths: AssetPathState,
}

/// Runs the full pipeline for `config`.
///
/// # Errors
///
/// - [`CliError::Config`](crate::CliError::Config) for scenario-level settings
/// - [`CliError::Simulation`](crate::CliError::Simulation) for rejected model inputs
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioOutput> {
    config.validate()?;

    let calendar = TradingCalendar::from_settings(&config.calendar)?;
    let steps = calendar.steps();
    let heston = config.heston.to_config()?;

    if !heston.satisfies_feller() {
        warn!(
            feller_ratio = heston.feller_ratio(),
            kappa = heston.kappa(),
            theta = heston.theta(),
            sigma_v = heston.sigma_v(),
            "Feller condition violated; variance will hit its floor more often"
        );
    }

    let master = PathRng::from_seed(config.seed);
    let mut factor_rng = master.substream(FACTOR_STREAM);
    let mut loading_rng = master.substream(LOADING_STREAM);
    let mut heston_rng = master.substream(HESTON_STREAM);

    let model = config.factors.to_model(steps, factor_rng.seed())?;
    let structure = model.covariance_structure()?;

    info!(
        seed = config.seed,
        steps,
        assets = config.num_assets,
        factors = model.num_factors(),
        policy = ?config.execution,
        "running scenario"
    );

    let factors = FactorPathSimulator::new(&structure).simulate_with_rng(steps, &mut factor_rng)?;
    let loadings = resolve_loadings(config, &mut loading_rng)?;

    let initial_prices = vec![config.initial_price; config.num_assets];
    let initial_variances = vec![config.initial_variance; config.num_assets];
    let paths = HestonPathSimulator::new(heston)
        .with_policy(config.execution)
        .simulate(
            &initial_prices,
            &initial_variances,
            factors.increments(),
            &loadings,
            &mut heston_rng,
        )?;

    debug!(
        final_mean_price = mean(paths.final_prices()),
        final_mean_variance = mean(paths.final_variances()),
        "scenario complete"
    );

    Ok(ScenarioOutput {
        calendar,
        tickers: config.resolved_tickers(),
        factors,
        loadings,
        paths,
    })
}

/// Builds the `N x F` loading matrix.
///
/// Explicit rows are used as given, a single explicit row is repeated for
/// every asset, and otherwise each entry is `scale * z` with `z` drawn
/// row by row from `rng`.
pub fn resolve_loadings(config: &ScenarioConfig, rng: &mut PathRng) -> Result<Matrix> {
    let n_assets = config.num_assets;
    let n_factors = config.factors.num_factors();

    let loadings = match &config.loadings.matrix {
        Some(rows) if rows.len() == 1 => Matrix::from_rows(&vec![rows[0].clone(); n_assets])?,
        Some(rows) => Matrix::from_rows(rows)?,
        None => {
            let mut loadings = Matrix::zeros(n_assets, n_factors);
            for i in 0..n_assets {
                rng.fill_scaled_normal(loadings.row_mut(i), config.loadings.scale);
            }
            loadings
        }
    };

    Ok(loadings)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
