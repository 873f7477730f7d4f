//! JSON rendering of scenario output.
//!
//! All series are aligned on the calendar: row `k` of `prices`,
//! `variances` and `factor_levels` belongs to `timestamps[k]`. Factor levels
//! start from zero at the first timestamp, since the first increment is
//! applied over the first step.
//!
//! A report borrows the simulated matrices and streams the sampled rows
//! straight into the serializer.

use serde::ser::{Serialize, Serializer};
use std::io::Write;

use synth_core::math::Matrix;

use crate::calendar::TradingCalendar;
use crate::scenario::ScenarioOutput;
use crate::{CliError, Result};

/// Timestamp format used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Report rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Keep every k-th row, always starting with row 0.
    pub sample_every: usize,
    pub pretty: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            sample_every: 1,
            pretty: false,
        }
    }
}

/// Serialisable view over a [`ScenarioOutput`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScenarioReport<'a> {
    seed: u64,
    sample_every: usize,
    timestamps: SampledTimestamps<'a>,
    tickers: &'a [String],
    factor_levels: SampledLevels<'a>,
    prices: SampledRows<'a>,
    variances: SampledRows<'a>,
}

impl<'a> ScenarioReport<'a> {
    /// Samples `output` into a report.
    ///
    /// # Errors
    ///
    /// [`CliError::InvalidArgument`] if `sample_every == 0`.
    pub fn build(output: &'a ScenarioOutput, seed: u64, options: &ReportOptions) -> Result<Self> {
        let every = options.sample_every;
        if every == 0 {
            return Err(CliError::invalid_argument("sample-every must be positive"));
        }

        let prices = output.paths.prices();
        let levels = output.factors.levels();

        Ok(Self {
            seed,
            sample_every: every,
            timestamps: SampledTimestamps {
                calendar: &output.calendar,
                rows: prices.rows(),
                every,
            },
            tickers: &output.tickers,
            factor_levels: SampledLevels {
                origin: vec![0.0; levels.cols()],
                levels,
                every,
            },
            prices: SampledRows {
                matrix: prices,
                every,
            },
            variances: SampledRows {
                matrix: output.paths.variances(),
                every,
            },
        })
    }

    /// Number of sampled rows.
    pub fn len(&self) -> usize {
        self.prices.matrix.rows().div_ceil(self.sample_every)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the report as JSON followed by a newline.
    pub fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Every `every`-th row of a matrix.
#[derive(Debug, Clone)]
struct SampledRows<'a> {
    matrix: &'a Matrix,
    every: usize,
}

impl Serialize for SampledRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.matrix.iter_rows().step_by(self.every))
    }
}

/// Running factor levels with a zero row prepended for timestamp 0.
#[derive(Debug, Clone)]
struct SampledLevels<'a> {
    origin: Vec<f64>,
    levels: &'a Matrix,
    every: usize,
}

impl Serialize for SampledLevels<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let rows = std::iter::once(self.origin.as_slice()).chain(self.levels.iter_rows());
        serializer.collect_seq(rows.step_by(self.every))
    }
}

/// Formatted calendar timestamps for the sampled rows.
#[derive(Debug, Clone)]
struct SampledTimestamps<'a> {
    calendar: &'a TradingCalendar,
    rows: usize,
    every: usize,
}

impl Serialize for SampledTimestamps<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.calendar
                .iter()
                .take(self.rows)
                .step_by(self.every)
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
        )
    }
}
