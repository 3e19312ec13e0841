//! Household energy analyzer entry point: CLI wiring and scenario selection.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use home_energy_sim::cli::CliOptions;
use home_energy_sim::config::{ConfigError, ScenarioConfig};
use home_energy_sim::io::export::export_csv;
use home_energy_sim::runner::{AnalysisError, run_analysis};

fn init_tracing(cli: &CliOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_scenario(cli: &CliOptions) -> Result<ScenarioConfig, ConfigError> {
    // --scenario takes priority, then --preset, then the household default
    let mut scenario = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::household()
    };

    if let Some(threshold_kw) = cli.threshold {
        scenario.analysis.threshold_kw = threshold_kw;
    }
    Ok(scenario)
}

fn main() {
    let cli = CliOptions::parse();
    init_tracing(&cli);

    let scenario = match load_scenario(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let report = match run_analysis(&scenario) {
        Ok(report) => report,
        Err(AnalysisError::InvalidScenario(errors)) => {
            for e in &errors {
                eprintln!("{e}");
            }
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    println!("{report}");

    if let Some(ref path) = cli.export_csv {
        if let Err(e) = export_csv(&report.seasons, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Hourly results written to {}", path.display());
    }
}
