//! Generate command implementation
//!
//! Runs the scenario and writes the JSON report to stdout or a file.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use synth_cli::config::ScenarioConfig;
use synth_cli::report::{ReportOptions, ScenarioReport};
use synth_cli::scenario::run_scenario;
use synth_cli::Result;
use tracing::info;

/// Run the generate command
pub fn run(config: &ScenarioConfig, options: &ReportOptions, output: Option<&Path>) -> Result<()> {
    let scenario = run_scenario(config)?;
    let report = ScenarioReport::build(&scenario, config.seed, options)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = BufWriter::new(File::create(path)?);
            report.write_json(file, options.pretty)?;
            info!(path = %path.display(), rows = report.len(), "report written");
        }
        None => {
            let stdout = io::stdout();
            report.write_json(BufWriter::new(stdout.lock()), options.pretty)?;
        }
    }

    Ok(())
}
