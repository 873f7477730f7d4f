//! End-to-end tests for the scenario pipeline.
//!
//! Drives a TOML configuration through layering, simulation and the JSON
//! report, the same path the `generate` command takes.

use std::io::Write;

use synth_cli::config::{build_config_with, CliArgs, ScenarioConfig};
use synth_cli::report::{ReportOptions, ScenarioReport};
use synth_cli::scenario::run_scenario;

const SCENARIO: &str = r#"
    seed = 2025
    num_assets = 3
    tickers = ["AAPL", "MSFT", "NVDA", "AMZN"]

    [factors]
    volatilities = [0.01, 0.008]
    correlation = [[1.0, 0.5], [0.5, 1.0]]

    [loadings]
    matrix = [[0.5, -0.25]]

    [calendar]
    start = "2025-01-10T15:59:50"
    trading_days = 2
    hours_per_day = 0.005
"#;

// keeps SYNTH_* variables from the host out of the assertions
fn no_env(_: &str) -> Option<String> {
    None
}

fn write_scenario() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SCENARIO.as_bytes()).unwrap();
    file
}

#[test]
fn e2e_toml_to_report_file() {
    let scenario_file = write_scenario();
    let cli = CliArgs {
        config_file: Some(scenario_file.path().to_path_buf()),
        ..Default::default()
    };
    let config = build_config_with(&cli, no_env).unwrap();
    let output = run_scenario(&config).unwrap();

    // 18 seconds per session, Friday then Monday
    assert_eq!(output.calendar.len(), 36);
    assert_eq!(output.paths.prices().shape(), (36, 3));
    assert_eq!(output.tickers, vec!["AAPL", "MSFT", "NVDA"]);
    for row in output.loadings.iter_rows() {
        assert_eq!(row, &[0.5, -0.25]);
    }

    let report = ScenarioReport::build(&output, config.seed, &ReportOptions::default()).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("report.json");
    report
        .write_json(std::fs::File::create(&out_path).unwrap(), true)
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let timestamps = value["timestamps"].as_array().unwrap();
    assert_eq!(timestamps.len(), 36);
    assert_eq!(timestamps[17], "2025-01-10 16:00:07");
    assert_eq!(timestamps[18], "2025-01-13 15:59:50");
    assert_eq!(value["tickers"][2], "NVDA");
    assert_eq!(value["factor_levels"][0].as_array().unwrap().len(), 2);
}

#[test]
fn e2e_cli_overrides_file() {
    let scenario_file = write_scenario();
    let cli = CliArgs {
        config_file: Some(scenario_file.path().to_path_buf()),
        seed: Some(1),
        num_assets: Some(2),
        parallel: true,
        ..Default::default()
    };
    let config = build_config_with(&cli, no_env).unwrap();

    assert_eq!(config.seed, 1);
    assert_eq!(config.num_assets, 2);
    assert_eq!(run_scenario(&config).unwrap().paths.num_assets(), 2);
}

#[test]
fn e2e_same_seed_same_report() {
    let config = ScenarioConfig::from_toml_str(SCENARIO).unwrap();
    let options = ReportOptions {
        sample_every: 5,
        pretty: false,
    };

    let render = || {
        let output = run_scenario(&config).unwrap();
        let report = ScenarioReport::build(&output, config.seed, &options).unwrap();
        let mut buffer = Vec::new();
        report.write_json(&mut buffer, false).unwrap();
        buffer
    };

    assert_eq!(render(), render());
}

#[test]
fn e2e_too_few_tickers_rejected() {
    let mut config = ScenarioConfig::from_toml_str(SCENARIO).unwrap();
    config.num_assets = 5;
    assert!(run_scenario(&config).is_err());
}
