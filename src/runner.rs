//! Season pipeline: battery simulation, load shifting, and cost comparison.

use std::fmt;

use thiserror::Error;
use tracing::{info, info_span};

use crate::config::{BatteryConfig, ConfigError, ScenarioConfig};
use crate::devices::{BatteryError, BatteryState, LoadProfile, SolarIrradianceProfile};
use crate::sim::aggregate::{HourlyPowerProfile, aggregate};
use crate::sim::engine::simulate;
use crate::sim::kpi::KpiReport;
use crate::sim::shifter::shift;
use crate::sim::tariff::TariffSchedule;
use crate::sim::types::{DischargeRecord, Season, SocTrace, ThresholdConfig};

/// Errors that abort an analysis before any result is produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid scenario ({} problems)", .0.len())]
    InvalidScenario(Vec<ConfigError>),
    #[error("{season}: no appliances are active in this season")]
    EmptyProfile { season: Season },
    #[error("{season}: cannot size battery: {source}")]
    Battery {
        season: Season,
        #[source]
        source: BatteryError,
    },
}

/// Parameters shared by every season of an analysis.
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub threshold: ThresholdConfig,
    pub tariff: TariffSchedule,
    pub battery: BatteryConfig,
}

impl AnalysisParams {
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        Self {
            threshold: scenario.threshold(),
            tariff: scenario.tariff(),
            battery: scenario.battery.clone(),
        }
    }
}

/// Builds the season's battery.
///
/// Without a fixed capacity, the battery is sized as `capacity_factor`
/// times the highest hourly load of the original profile.
///
/// # Errors
///
/// Returns a `BatteryError` when the resulting capacity is not positive or
/// another parameter is out of range.
pub fn size_battery(config: &BatteryConfig, peak_load_kw: f64) -> Result<BatteryState, BatteryError> {
    let capacity_kwh = config
        .capacity_kwh
        .unwrap_or(peak_load_kw * config.capacity_factor);
    BatteryState::new(
        capacity_kwh,
        config.charge_rate,
        config.discharge_rate,
        config.initial_soc_pct,
        config.panel_area_m2,
        config.panel_efficiency,
    )
}

/// Everything one season run produces for display and export.
#[derive(Debug, Clone)]
pub struct SeasonOutcome {
    pub season: Season,
    pub irradiance: SolarIrradianceProfile,
    pub battery_capacity_kwh: f64,
    /// Appliance table as given.
    pub original_profile: LoadProfile,
    /// Appliance table plus synthetic battery entries.
    pub battery_profile: LoadProfile,
    /// Battery table after load shifting.
    pub shifted_profile: LoadProfile,
    pub original_hourly: HourlyPowerProfile,
    pub battery_hourly: HourlyPowerProfile,
    pub shifted_hourly: HourlyPowerProfile,
    pub soc_trace: SocTrace,
    pub discharges: Vec<DischargeRecord>,
    pub kpi: KpiReport,
}

impl fmt::Display for SeasonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let season = self.season;
        let costs = &self.kpi.costs;
        writeln!(f, "=== {season} ===")?;
        writeln!(f, "Battery capacity:      {:.2} kWh", self.battery_capacity_kwh)?;
        writeln!(f, "{season} Hourly Energy Cost (Original): {:.3} $", costs.original)?;
        writeln!(f, "{season} Hourly Energy Cost (Battery): {:.3} $", costs.battery)?;
        writeln!(f, "{season} Hourly Energy Cost (Shifted): {:.3} $", costs.shifted)?;
        write!(f, "{}", self.kpi)
    }
}

/// Runs the full pipeline for one season.
///
/// The battery simulation runs on the original table, shifting runs on the
/// battery-extended table, and the three resulting tables are costed.
///
/// # Errors
///
/// Returns an `AnalysisError` if the table is empty or the battery cannot be
/// sized.
pub fn run_season(
    season: Season,
    profile: LoadProfile,
    irradiance: SolarIrradianceProfile,
    params: &AnalysisParams,
) -> Result<SeasonOutcome, AnalysisError> {
    let _span = info_span!("season", %season).entered();

    // An auto-sized battery needs some load to size against.
    if profile.is_empty() && params.battery.capacity_kwh.is_none() {
        return Err(AnalysisError::EmptyProfile { season });
    }

    let original_hourly = aggregate(&profile);
    let peak_load_kw = original_hourly.peak_kw();
    info!(
        peak_load_kw,
        daily_kwh = original_hourly.total_kwh(),
        appliances = profile.len(),
        irradiance_hours = irradiance.sampled_hours(),
        "original profile"
    );

    let battery = size_battery(&params.battery, peak_load_kw)
        .map_err(|source| AnalysisError::Battery { season, source })?;
    let battery_capacity_kwh = battery.capacity_kwh();

    let original_profile = profile.clone();
    let simulation = simulate(battery, profile, &irradiance, &params.threshold);
    let battery_profile = simulation.profile.clone();
    let battery_hourly = aggregate(&battery_profile);

    let shifted_profile = shift(simulation.profile, &params.threshold);
    let shifted_hourly = aggregate(&shifted_profile);

    let kpi = KpiReport::from_profiles(
        &original_hourly,
        &battery_hourly,
        &shifted_hourly,
        simulation.discharges.iter().map(|d| d.discharge_kwh).sum(),
        &params.threshold,
        &params.tariff,
    );
    info!(
        original = kpi.costs.original,
        battery = kpi.costs.battery,
        shifted = kpi.costs.shifted,
        "season costs"
    );

    Ok(SeasonOutcome {
        season,
        irradiance,
        battery_capacity_kwh,
        original_profile,
        battery_profile,
        shifted_profile,
        original_hourly,
        battery_hourly,
        shifted_hourly,
        soc_trace: simulation.soc_trace,
        discharges: simulation.discharges,
        kpi,
    })
}

/// Results for every season of a scenario.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub seasons: Vec<SeasonOutcome>,
}

impl AnalysisReport {
    pub fn season(&self, season: Season) -> Option<&SeasonOutcome> {
        self.seasons.iter().find(|s| s.season == season)
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.seasons.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

/// Validates the scenario and runs winter, then summer.
///
/// Nothing is returned unless every season succeeds.
///
/// # Errors
///
/// Returns an `AnalysisError` for an invalid scenario or a failing season.
pub fn run_analysis(scenario: &ScenarioConfig) -> Result<AnalysisReport, AnalysisError> {
    let errors = scenario.validate();
    if !errors.is_empty() {
        return Err(AnalysisError::InvalidScenario(errors));
    }

    let params = AnalysisParams::from_scenario(scenario);
    info!(
        threshold_kw = params.threshold.threshold_kw,
        peak_hours = ?params.threshold.peak_hours,
        "starting analysis"
    );

    let seasons = Season::ALL
        .into_iter()
        .map(|season| {
            run_season(
                season,
                scenario.load_profile(season),
                scenario.irradiance(season),
                &params,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisReport { seasons })
}
