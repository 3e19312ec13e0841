//! CSV export for per-hour season results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::devices::HOURS_PER_DAY;
use crate::runner::SeasonOutcome;

/// Column header for the hourly results export.
const HEADER: &str = "season,hour,irradiance_kw_m2,original_kw,battery_kw,\
                      shifted_kw,discharge_kwh,soc_pct";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Exports season results to a CSV file at the given path.
///
/// Writes a header row followed by 24 rows per season, in season order.
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `ExportError` if file creation or writing fails.
pub fn export_csv(outcomes: &[SeasonOutcome], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    write_csv(outcomes, io::BufWriter::new(file))
}

/// Writes season results as CSV to any writer.
///
/// # Errors
///
/// Returns an `ExportError` if writing fails.
pub fn write_csv(outcomes: &[SeasonOutcome], writer: impl Write) -> Result<(), ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for outcome in outcomes {
        for hour in 0..HOURS_PER_DAY {
            let discharge = outcome
                .discharges
                .iter()
                .find(|d| d.hour == hour)
                .map_or(0.0, |d| d.discharge_kwh);
            let soc = outcome
                .soc_trace
                .iter()
                .find(|s| s.hour == hour)
                .map_or(0.0, |s| s.soc_pct);

            wtr.write_record(&[
                outcome.season.to_string().to_lowercase(),
                hour.to_string(),
                format!("{:.4}", outcome.irradiance.at(hour)),
                format!("{:.4}", outcome.original_hourly[hour]),
                format!("{:.4}", outcome.battery_hourly[hour]),
                format!("{:.4}", outcome.shifted_hourly[hour]),
                format!("{:.4}", discharge),
                format!("{:.4}", soc),
            ])?;
        }
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}
