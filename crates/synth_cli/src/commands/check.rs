//! Check command implementation
//!
//! Validates a scenario without simulating it and prints a summary.

use synth_cli::calendar::TradingCalendar;
use synth_cli::config::ScenarioConfig;
use synth_cli::Result;

/// Run the check command
pub fn run(config: &ScenarioConfig) -> Result<()> {
    let calendar = TradingCalendar::from_settings(&config.calendar)?;
    let heston = config.heston.to_config()?;
    let structure = config
        .factors
        .to_model(calendar.steps(), config.seed)?
        .covariance_structure()?;

    println!("Scenario check");
    println!("  Seed:            {}", config.seed);
    println!("  Assets:          {}", config.num_assets);
    println!("  Factors:         {}", structure.dim());
    println!(
        "  Calendar:        {} days x {} s ({} steps)",
        calendar.trading_days(),
        calendar.seconds_per_day(),
        calendar.steps()
    );
    let span = (calendar.timestamp(0), calendar.timestamp(calendar.steps()));
    if let (Some(first), Some(last)) = span {
        println!("  Span:            {} .. {}", first, last);
    }
    println!("  Execution:       {:?}", config.execution);
    println!(
        "  Feller ratio:    {:.4} ({})",
        heston.feller_ratio(),
        if heston.satisfies_feller() {
            "satisfied"
        } else {
            "violated"
        }
    );
    println!("  Status:          OK");

    Ok(())
}
