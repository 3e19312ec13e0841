//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::devices::{ApplianceLoad, HOURS_PER_DAY, LoadProfile, SolarIrradianceProfile};
use crate::devices::appliance::BATTERY_PRIORITY_GROUP;
use crate::sim::tariff::TariffSchedule;
use crate::sim::types::{DEFAULT_PEAK_HOURS, DEFAULT_THRESHOLD_KW, Season, ThresholdConfig};

/// Top-level scenario configuration parsed from TOML.
///
/// Sections fall back to their defaults; the appliance table and the
/// irradiance arrays start empty. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or use a built-in preset.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Threshold and peak window.
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Time-of-use rates.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Battery sizing and panel parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Appliance table with per-season windows.
    #[serde(default)]
    pub appliances: Vec<ApplianceRow>,
    /// Average irradiance per hour for each season.
    #[serde(default)]
    pub irradiance: IrradianceConfig,
}

/// Threshold and peak window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Maximum tolerated net demand per hour (kW).
    pub threshold_kw: f64,
    /// Peak hours in processing order.
    pub peak_hours: Vec<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_kw: DEFAULT_THRESHOLD_KW,
            peak_hours: DEFAULT_PEAK_HOURS.collect(),
        }
    }
}

/// Time-of-use rates per kWh.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    pub peak_rate: f64,
    pub mid_peak_rate: f64,
    pub off_peak_rate: f64,
    /// First mid-peak hour (inclusive).
    pub mid_peak_start: usize,
    /// End of the mid-peak window (exclusive).
    pub mid_peak_end: usize,
}

impl Default for TariffConfig {
    fn default() -> Self {
        let tariff = TariffSchedule::default();
        Self {
            peak_rate: tariff.peak_rate,
            mid_peak_rate: tariff.mid_peak_rate,
            off_peak_rate: tariff.off_peak_rate,
            mid_peak_start: tariff.mid_peak_hours.start,
            mid_peak_end: tariff.mid_peak_hours.end,
        }
    }
}

/// Battery sizing and panel parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Fixed capacity (kWh). When absent the capacity is sized from the
    /// season's peak hourly load.
    pub capacity_kwh: Option<f64>,
    /// Capacity per kW of peak hourly load when sizing automatically.
    pub capacity_factor: f64,
    /// Charge rate per kWh of capacity.
    pub charge_rate: f64,
    /// Discharge rate per kWh of capacity.
    pub discharge_rate: f64,
    /// State of charge at midnight (%).
    pub initial_soc_pct: f64,
    /// Panel area (m²).
    pub panel_area_m2: f64,
    /// Panel efficiency (0.0–1.0).
    pub panel_efficiency: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: None,
            capacity_factor: 0.5,
            charge_rate: 0.2,
            discharge_rate: 0.3,
            initial_soc_pct: 10.0,
            panel_area_m2: 10.0,
            panel_efficiency: 0.7,
        }
    }
}

/// One row of the appliance table.
///
/// Hours outside `0..=24` are coerced to 0 when the row is turned into a
/// season entry, and a `0..0` window drops the row from that season.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplianceRow {
    pub name: String,
    pub rated_power_kw: f64,
    pub priority_group: u32,
    pub winter_start: i64,
    pub winter_end: i64,
    pub summer_start: i64,
    pub summer_end: i64,
}

impl ApplianceRow {
    /// Creates a row active in the same window in both seasons.
    pub fn year_round(name: &str, rated_power_kw: f64, priority_group: u32, start: i64, end: i64) -> Self {
        Self::seasonal(name, rated_power_kw, priority_group, (start, end), (start, end))
    }

    /// Creates a row with distinct winter and summer windows.
    pub fn seasonal(
        name: &str,
        rated_power_kw: f64,
        priority_group: u32,
        winter: (i64, i64),
        summer: (i64, i64),
    ) -> Self {
        Self {
            name: name.to_string(),
            rated_power_kw,
            priority_group,
            winter_start: winter.0,
            winter_end: winter.1,
            summer_start: summer.0,
            summer_end: summer.1,
        }
    }

    /// Raw window for `season` as written in the scenario.
    pub fn window(&self, season: Season) -> (i64, i64) {
        match season {
            Season::Winter => (self.winter_start, self.winter_end),
            Season::Summer => (self.summer_start, self.summer_end),
        }
    }

    /// Turns the row into the appliance entry for `season`.
    ///
    /// Returns `None` when the appliance is not used in that season.
    pub fn for_season(&self, season: Season) -> Option<ApplianceLoad> {
        let (start, end) = self.window(season);
        let start = clamp_hour(&self.name, start);
        let end = clamp_hour(&self.name, end);
        if start == 0 && end == 0 {
            return None;
        }
        Some(ApplianceLoad::new(
            self.name.clone(),
            self.rated_power_kw,
            self.priority_group,
            start,
            end,
        ))
    }
}

/// Coerces an hour outside `0..=24` to 0.
fn clamp_hour(name: &str, hour: i64) -> usize {
    match usize::try_from(hour) {
        Ok(h) if h <= HOURS_PER_DAY => h,
        _ => {
            warn!(appliance = name, hour, "hour outside 0..=24 replaced with 0");
            0
        }
    }
}

/// Average irradiance per hour (kW/m²), indexed by hour of day.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IrradianceConfig {
    pub winter: Vec<f64>,
    pub summer: Vec<f64>,
}

impl IrradianceConfig {
    pub fn season(&self, season: Season) -> &[f64] {
        match season {
            Season::Winter => &self.winter,
            Season::Summer => &self.summer,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

const WINTER_IRRADIANCE: [f64; HOURS_PER_DAY] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.05, 0.15, 0.25, 0.3, 0.32, 0.28, 0.2, 0.1, 0.02,
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
];

const SUMMER_IRRADIANCE: [f64; HOURS_PER_DAY] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.02, 0.1, 0.25, 0.4, 0.55, 0.65, 0.72, 0.75, 0.72, 0.65, 0.55, 0.42,
    0.28, 0.15, 0.05, 0.01, 0.0, 0.0, 0.0,
];

impl ScenarioConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["household", "large_battery", "low_threshold"];

    /// Returns the household preset: a family home with evening cooking and laundry.
    pub fn household() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            tariff: TariffConfig::default(),
            battery: BatteryConfig::default(),
            appliances: vec![
                ApplianceRow::year_round("Refrigerator", 0.15, 1, 0, 24),
                ApplianceRow::seasonal("Lighting", 0.4, 1, (16, 23), (19, 23)),
                ApplianceRow::seasonal("Electric oven", 2.0, 2, (17, 19), (18, 19)),
                ApplianceRow::seasonal("Washing machine", 1.2, 3, (18, 20), (19, 21)),
                ApplianceRow::year_round("Dishwasher", 1.0, 3, 20, 22),
                ApplianceRow::seasonal("Electric heater", 1.5, 2, (17, 22), (0, 0)),
                ApplianceRow::seasonal("Air conditioner", 1.8, 2, (0, 0), (13, 19)),
                ApplianceRow::seasonal("Water heater", 2.0, 3, (5, 7), (5, 6)),
                ApplianceRow::seasonal("Television", 0.2, 2, (19, 23), (20, 23)),
                ApplianceRow::year_round("EV charger", 3.0, 4, 22, 2),
            ],
            irradiance: IrradianceConfig {
                winter: WINTER_IRRADIANCE.to_vec(),
                summer: SUMMER_IRRADIANCE.to_vec(),
            },
        }
    }

    /// Returns the household preset with a fixed 13.5 kWh battery and more panels.
    pub fn large_battery() -> Self {
        Self {
            battery: BatteryConfig {
                capacity_kwh: Some(13.5),
                initial_soc_pct: 40.0,
                panel_area_m2: 20.0,
                ..BatteryConfig::default()
            },
            ..Self::household()
        }
    }

    /// Returns the household preset with a 2 kW threshold.
    pub fn low_threshold() -> Self {
        Self {
            analysis: AnalysisConfig {
                threshold_kw: 2.0,
                ..AnalysisConfig::default()
            },
            ..Self::household()
        }
    }

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "household" => Ok(Self::household()),
            "large_battery" => Ok(Self::large_battery()),
            "low_threshold" => Ok(Self::low_threshold()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Threshold and peak window for the simulator, shifter, and tariff.
    pub fn threshold(&self) -> ThresholdConfig {
        ThresholdConfig::new(
            self.analysis.threshold_kw,
            self.analysis.peak_hours.iter().copied(),
        )
    }

    pub fn tariff(&self) -> TariffSchedule {
        let t = &self.tariff;
        TariffSchedule {
            peak_rate: t.peak_rate,
            mid_peak_rate: t.mid_peak_rate,
            off_peak_rate: t.off_peak_rate,
            mid_peak_hours: t.mid_peak_start..t.mid_peak_end,
        }
    }

    /// Appliance table for `season`, with hours clamped and unused rows dropped.
    pub fn load_profile(&self, season: Season) -> LoadProfile {
        self.appliances
            .iter()
            .filter_map(|row| row.for_season(season))
            .collect()
    }

    pub fn irradiance(&self, season: Season) -> SolarIrradianceProfile {
        SolarIrradianceProfile::from_hourly(self.irradiance.season(season))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let a = &self.analysis;
        if !a.threshold_kw.is_finite() {
            errors.push(ConfigError::new("analysis.threshold_kw", "must be finite"));
        }
        if a.peak_hours.is_empty() {
            errors.push(ConfigError::new("analysis.peak_hours", "must not be empty"));
        }
        if a.peak_hours.iter().any(|&h| h >= HOURS_PER_DAY) {
            errors.push(ConfigError::new("analysis.peak_hours", "hours must be in 0..24"));
        }
        for (i, h) in a.peak_hours.iter().enumerate() {
            if a.peak_hours[..i].contains(h) {
                errors.push(ConfigError::new(
                    "analysis.peak_hours",
                    format!("hour {h} listed more than once"),
                ));
            }
        }

        let t = &self.tariff;
        for (field, rate) in [
            ("tariff.peak_rate", t.peak_rate),
            ("tariff.mid_peak_rate", t.mid_peak_rate),
            ("tariff.off_peak_rate", t.off_peak_rate),
        ] {
            if !rate.is_finite() {
                errors.push(ConfigError::new(field, "must be finite"));
            }
        }
        if t.mid_peak_start > t.mid_peak_end || t.mid_peak_end > HOURS_PER_DAY {
            errors.push(ConfigError::new(
                "tariff.mid_peak_start",
                "must satisfy mid_peak_start <= mid_peak_end <= 24",
            ));
        }

        let bat = &self.battery;
        if bat.capacity_kwh.is_some_and(|c| !(c > 0.0)) {
            errors.push(ConfigError::new("battery.capacity_kwh", "must be > 0"));
        }
        if !(bat.capacity_factor > 0.0) {
            errors.push(ConfigError::new("battery.capacity_factor", "must be > 0"));
        }
        if !(bat.charge_rate >= 0.0) {
            errors.push(ConfigError::new("battery.charge_rate", "must be >= 0"));
        }
        if !(bat.discharge_rate >= 0.0) {
            errors.push(ConfigError::new("battery.discharge_rate", "must be >= 0"));
        }
        if !(0.0..=100.0).contains(&bat.initial_soc_pct) {
            errors.push(ConfigError::new("battery.initial_soc_pct", "must be in [0, 100]"));
        }
        if !(bat.panel_area_m2 >= 0.0) {
            errors.push(ConfigError::new("battery.panel_area_m2", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&bat.panel_efficiency) {
            errors.push(ConfigError::new("battery.panel_efficiency", "must be in [0.0, 1.0]"));
        }

        if self.appliances.is_empty() {
            errors.push(ConfigError::new("appliances", "at least one appliance is required"));
        }
        for (i, row) in self.appliances.iter().enumerate() {
            let field = |name: &str| format!("appliances[{i}].{name}");
            if row.name.trim().is_empty() {
                errors.push(ConfigError::new(field("name"), "must not be empty"));
            }
            if self.appliances[..i].iter().any(|other| other.name == row.name) {
                errors.push(ConfigError::new(
                    field("name"),
                    format!("duplicate appliance name \"{}\"", row.name),
                ));
            }
            if !row.rated_power_kw.is_finite() {
                errors.push(ConfigError::new(field("rated_power_kw"), "must be finite"));
            }
            if row.priority_group == BATTERY_PRIORITY_GROUP {
                errors.push(ConfigError::new(
                    field("priority_group"),
                    "group 0 is reserved for battery discharge entries",
                ));
            }
        }

        for season in Season::ALL {
            let values = self.irradiance.season(season);
            let field = format!("irradiance.{}", season.to_string().to_lowercase());
            if values.len() > HOURS_PER_DAY {
                errors.push(ConfigError::new(&field, "at most 24 hourly values"));
            }
            if values.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
                errors.push(ConfigError::new(&field, "values must be finite and >= 0"));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn household_preset_valid() {
        let cfg = ScenarioConfig::household();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "household should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[analysis]
threshold_kw = 2.5
peak_hours = [18, 19, 20]

[tariff]
peak_rate = 0.4
mid_peak_rate = 0.25
off_peak_rate = 0.12
mid_peak_start = 7
mid_peak_end = 18

[battery]
capacity_kwh = 8.0
charge_rate = 0.25
discharge_rate = 0.25
initial_soc_pct = 50.0
panel_area_m2 = 12.0
panel_efficiency = 0.2

[[appliances]]
name = "Oven"
rated_power_kw = 2.0
priority_group = 2
winter_start = 17
winter_end = 19
summer_start = 18
summer_end = 19

[irradiance]
winter = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.2]
summer = [0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.3]
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.analysis.threshold_kw), Some(2.5));
        assert_eq!(cfg.as_ref().and_then(|c| c.battery.capacity_kwh), Some(8.0));
        assert_eq!(cfg.as_ref().map(|c| c.appliances.len()), Some(1));
        assert_eq!(
            cfg.as_ref().map(|c| c.tariff().mid_peak_hours),
            Some(7..18)
        );
        assert!(cfg.as_ref().is_some_and(|c| c.validate().is_empty()));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[analysis]
threshold_kw = 3.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[analysis]
threshold_kw = 4.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.analysis.threshold_kw), Some(4.0));
        assert_eq!(
            cfg.as_ref().map(|c| c.analysis.peak_hours.clone()),
            Some(vec![17, 18, 19, 20, 21, 22])
        );
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity_factor), Some(0.5));
        assert_eq!(cfg.as_ref().and_then(|c| c.battery.capacity_kwh), None);
    }

    #[test]
    fn validation_requires_appliances() {
        let errors = ScenarioConfig::default().validate();
        assert!(errors.iter().any(|e| e.field == "appliances"));
    }

    #[test]
    fn validation_catches_zero_capacity() {
        let mut cfg = ScenarioConfig::household();
        cfg.battery.capacity_kwh = Some(0.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.capacity_kwh"));
    }

    #[test]
    fn validation_catches_invalid_soc() {
        let mut cfg = ScenarioConfig::household();
        cfg.battery.initial_soc_pct = 120.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.initial_soc_pct"));
    }

    #[test]
    fn validation_catches_bad_peak_hours() {
        let mut cfg = ScenarioConfig::household();
        cfg.analysis.peak_hours = vec![17, 24, 17];
        let errors = cfg.validate();
        assert_eq!(
            errors.iter().filter(|e| e.field == "analysis.peak_hours").count(),
            2
        );
    }

    #[test]
    fn validation_reserves_group_zero() {
        let mut cfg = ScenarioConfig::household();
        cfg.appliances.push(ApplianceRow::year_round("Ghost", 1.0, 0, 1, 2));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field.ends_with("priority_group")));
    }

    #[test]
    fn validation_catches_duplicate_names() {
        let mut cfg = ScenarioConfig::household();
        cfg.appliances.push(ApplianceRow::year_round("Dishwasher", 1.0, 3, 1, 2));
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.message.contains("duplicate")));
    }

    #[test]
    fn validation_catches_long_irradiance() {
        let mut cfg = ScenarioConfig::household();
        cfg.irradiance.summer = vec![0.1; 25];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "irradiance.summer"));
    }

    #[test]
    fn out_of_range_hours_become_zero() {
        let row = ApplianceRow::year_round("Pump", 1.0, 2, -3, 30);
        assert_eq!(row.for_season(Season::Winter), None);

        let row = ApplianceRow::year_round("Pump", 1.0, 2, 5, 99);
        let load = row.for_season(Season::Summer).expect("window 5..0 survives");
        assert_eq!((load.start, load.end), (5, 0));
    }

    #[test]
    fn unused_season_rows_are_dropped() {
        let cfg = ScenarioConfig::household();
        let winter = cfg.load_profile(Season::Winter);
        let summer = cfg.load_profile(Season::Summer);
        assert!(winter.iter().any(|a| a.name == "Electric heater"));
        assert!(!summer.iter().any(|a| a.name == "Electric heater"));
        assert!(summer.iter().any(|a| a.name == "Air conditioner"));
        assert!(!winter.iter().any(|a| a.name == "Air conditioner"));
    }

    #[test]
    fn large_battery_overrides_capacity() {
        let cfg = ScenarioConfig::large_battery();
        assert_eq!(cfg.battery.capacity_kwh, Some(13.5));
        assert_eq!(cfg.appliances, ScenarioConfig::household().appliances);
    }
}
