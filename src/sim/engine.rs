//! Hour-by-hour battery simulation driven by solar irradiance and demand.

use tracing::{debug, info};

use crate::devices::battery::{OFF_PEAK_CHARGE_CEILING_PCT, PEAK_CHARGE_CEILING_PCT, SOC_FLOOR_PCT};
use crate::devices::{ApplianceLoad, BatteryState, HOURS_PER_DAY, LoadProfile, SolarIrradianceProfile};

use super::aggregate::{HourlyPowerProfile, aggregate};
use super::types::{DischargeRecord, SimulationResult, SocSample, SocTrace, ThresholdConfig};

/// Everything that happened to the battery during one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourRecord {
    /// SOC before any adjustment this hour.
    pub sample: SocSample,
    /// Discharge decision (zero outside peak hours).
    pub discharge: DischargeRecord,
    /// Energy stored from solar over both charge passes (kWh).
    pub charged_kwh: f64,
}

/// Simulation engine owning the battery for one season run.
///
/// Demand is aggregated once from the profile handed to [`BatteryEngine::new`]
/// and is not re-aggregated while the day is simulated.
#[derive(Debug)]
pub struct BatteryEngine<'a> {
    battery: BatteryState,
    demand: HourlyPowerProfile,
    irradiance: &'a SolarIrradianceProfile,
    threshold: &'a ThresholdConfig,
}

impl<'a> BatteryEngine<'a> {
    /// Creates a new engine.
    ///
    /// # Arguments
    ///
    /// * `battery` - Battery state at the start of the day
    /// * `profile` - Appliance table the demand is derived from
    /// * `irradiance` - Seasonal irradiance profile
    /// * `threshold` - Demand threshold and peak window
    pub fn new(
        battery: BatteryState,
        profile: &[ApplianceLoad],
        irradiance: &'a SolarIrradianceProfile,
        threshold: &'a ThresholdConfig,
    ) -> Self {
        Self {
            battery,
            demand: aggregate(profile),
            irradiance,
            threshold,
        }
    }

    /// Executes one simulated hour and returns what the battery did.
    ///
    /// Order within the hour: sample SOC, solar charge, then in peak hours a
    /// discharge decision followed by a second charge pass toward the peak
    /// ceiling when SOC is under the floor or the sun is up.
    pub fn step(&mut self, hour: usize) -> HourRecord {
        let irradiance = self.irradiance.at(hour);
        let peak = self.threshold.is_peak(hour);
        let sample = SocSample {
            hour,
            soc_pct: self.battery.soc_pct(),
        };
        debug!(
            hour,
            irradiance_kw_m2 = irradiance,
            soc_pct = sample.soc_pct,
            "hour start"
        );

        // 1. Solar charge; the battery applies the ceiling and irradiance checks
        let mut charged_kwh = 0.0;
        if self.battery.soc_pct() < OFF_PEAK_CHARGE_CEILING_PCT {
            let ceiling = if peak {
                PEAK_CHARGE_CEILING_PCT
            } else {
                OFF_PEAK_CHARGE_CEILING_PCT
            };
            charged_kwh += self.battery.charge_from_solar(irradiance, ceiling);
        }

        if !peak {
            return HourRecord {
                sample,
                discharge: DischargeRecord {
                    hour,
                    discharge_kwh: 0.0,
                    soc_pct: self.battery.soc_pct(),
                },
                charged_kwh,
            };
        }

        // 2. Peak discharge against the original demand
        let demand_kw = self.demand[hour];
        let discharge_kwh = self
            .battery
            .discharge_above(demand_kw, self.threshold.threshold_kw);
        let discharge = DischargeRecord {
            hour,
            discharge_kwh,
            soc_pct: self.battery.soc_pct(),
        };
        if discharge_kwh > 0.0 {
            debug!(hour, demand_kw, discharge_kwh, soc_pct = discharge.soc_pct, "discharged");
        } else {
            debug!(
                hour,
                demand_kw,
                threshold_kw = self.threshold.threshold_kw,
                soc_pct = discharge.soc_pct,
                "discharge conditions not met"
            );
        }

        // 3. Post-discharge top-up toward the peak ceiling
        if self.battery.soc_pct() < SOC_FLOOR_PCT || irradiance > 0.0 {
            charged_kwh += self
                .battery
                .charge_from_solar(irradiance, PEAK_CHARGE_CEILING_PCT);
        }

        HourRecord {
            sample,
            discharge,
            charged_kwh,
        }
    }

    /// Executes all 24 hours and returns the SOC trace, the discharge log,
    /// and the final battery state.
    pub fn run(mut self) -> (SocTrace, Vec<DischargeRecord>, BatteryState) {
        let mut trace = Vec::with_capacity(HOURS_PER_DAY);
        let mut discharges = Vec::with_capacity(HOURS_PER_DAY);
        for hour in 0..HOURS_PER_DAY {
            let record = self.step(hour);
            debug!(
                hour,
                charged_kwh = record.charged_kwh,
                discharge_kwh = record.discharge.discharge_kwh,
                soc_pct = self.battery.soc_pct(),
                "hour end"
            );
            trace.push(record.sample);
            discharges.push(record.discharge);
        }
        (trace, discharges, self.battery)
    }

    /// Returns a reference to the battery.
    pub fn battery(&self) -> &BatteryState {
        &self.battery
    }

    /// Returns the demand profile the engine discharges against.
    pub fn demand(&self) -> &HourlyPowerProfile {
        &self.demand
    }
}

/// Appends one synthetic discharge entry per hour with a positive discharge.
pub fn inject_discharges(mut profile: LoadProfile, discharges: &[DischargeRecord]) -> LoadProfile {
    for record in discharges.iter().filter(|d| d.discharge_kwh > 0.0) {
        let entry = ApplianceLoad::battery_discharge(record.hour, record.discharge_kwh);
        debug!(name = %entry.name, discharge_kwh = record.discharge_kwh, "adding battery entry");
        profile.push(entry);
    }
    profile
}

/// Simulates one day of battery operation over `profile`.
///
/// Takes ownership of the battery and the profile and hands back the
/// extended profile, the SOC trace, the discharge log, and the final battery.
pub fn simulate(
    battery: BatteryState,
    profile: LoadProfile,
    irradiance: &SolarIrradianceProfile,
    threshold: &ThresholdConfig,
) -> SimulationResult {
    let engine = BatteryEngine::new(battery, &profile, irradiance, threshold);
    info!(
        capacity_kwh = engine.battery().capacity_kwh(),
        soc_pct = engine.battery().soc_pct(),
        peak_demand_kw = engine.demand().peak_kw(),
        "simulating battery"
    );
    let (soc_trace, discharges, battery) = engine.run();
    let profile = inject_discharges(profile, &discharges);

    let result = SimulationResult {
        profile,
        soc_trace,
        discharges,
        battery,
    };
    info!(
        total_discharge_kwh = result.total_discharge_kwh(),
        final_soc_pct = result.battery.soc_pct(),
        "battery simulation complete"
    );
    result
}
