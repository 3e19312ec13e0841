//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use home_energy_sim::devices::{ApplianceLoad, BatteryState, LoadProfile, SolarIrradianceProfile};
use home_energy_sim::sim::types::ThresholdConfig;

/// Default threshold (3 kW, peak hours 17–22).
pub fn default_threshold() -> ThresholdConfig {
    ThresholdConfig::default()
}

/// Single 4 kW shiftable appliance running 17–19.
pub fn evening_oven_profile() -> LoadProfile {
    vec![ApplianceLoad::new("Oven", 4.0, 2, 17, 19)]
}

/// Small household table: critical fridge, evening oven and washer, overnight EV.
pub fn small_household_profile() -> LoadProfile {
    vec![
        ApplianceLoad::new("Refrigerator", 0.15, 1, 0, 24),
        ApplianceLoad::new("Lighting", 0.4, 1, 17, 23),
        ApplianceLoad::new("Oven", 2.0, 2, 17, 19),
        ApplianceLoad::new("Washer", 1.2, 3, 18, 20),
        ApplianceLoad::new("EV charger", 3.0, 4, 22, 2),
    ]
}

/// Nearly empty battery (2 kWh, 0.2% SOC) that cannot discharge.
pub fn drained_battery() -> BatteryState {
    match BatteryState::new(2.0, 0.4, 0.6, 0.2, 10.0, 0.7) {
        Ok(b) => b,
        Err(e) => panic!("fixture battery should be valid: {e}"),
    }
}

/// Battery (10 kWh, 80% SOC, 2 kW charge, 3 kW discharge, 10 m², 70%).
pub fn charged_battery() -> BatteryState {
    match BatteryState::new(10.0, 2.0, 3.0, 80.0, 10.0, 0.7) {
        Ok(b) => b,
        Err(e) => panic!("fixture battery should be valid: {e}"),
    }
}

/// Irradiance of zero at every hour.
pub fn dark_day() -> SolarIrradianceProfile {
    SolarIrradianceProfile::from_hourly(&[0.0; 24])
}

/// Bell-shaped midday irradiance peaking at 0.8 kW/m².
pub fn sunny_day() -> SolarIrradianceProfile {
    (7..18)
        .map(|h| {
            let x = (h as f64 - 12.0) / 5.0;
            (h, 0.8 * (1.0 - x * x))
        })
        .collect()
}
