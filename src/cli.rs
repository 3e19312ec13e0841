use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Estimate household electricity savings from a solar battery and load shifting.
///
/// If no --scenario or --preset is given, the household preset is used.
#[derive(Debug, Parser)]
#[command(name = "home-energy-sim", version, about)]
pub struct CliOptions {
    /// Load scenario from TOML config file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (household, large_battery, low_threshold).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the demand threshold in kW.
    #[arg(long, value_name = "KW")]
    pub threshold: Option<f64>,

    /// Export hourly results of both seasons to CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CliOptions {
    /// Default log directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
