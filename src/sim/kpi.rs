//! Post-hoc cost and peak KPIs computed from a season's hourly profiles.

use std::fmt;

use super::aggregate::HourlyPowerProfile;
use super::tariff::TariffSchedule;
use super::types::ThresholdConfig;

/// Daily cost of the three profile variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostComparison {
    /// Cost of the unmodified appliance table.
    pub original: f64,
    /// Cost with battery discharge applied.
    pub battery: f64,
    /// Cost with battery discharge and shifted loads.
    pub shifted: f64,
}

impl CostComparison {
    /// Savings from the battery alone.
    pub fn battery_savings(&self) -> f64 {
        self.original - self.battery
    }

    /// Savings from shifting on top of the battery.
    pub fn shifting_savings(&self) -> f64 {
        self.battery - self.shifted
    }

    pub fn total_savings(&self) -> f64 {
        self.original - self.shifted
    }
}

/// Aggregate indicators for one season run.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiReport {
    pub costs: CostComparison,
    /// Highest hourly net load before any intervention (kW).
    pub peak_original_kw: f64,
    /// Highest hourly net load after battery and shifting (kW).
    pub peak_shifted_kw: f64,
    /// Peak hours above the threshold before any intervention.
    pub peak_hours_over_threshold_original: usize,
    /// Peak hours still above the threshold after shifting.
    pub peak_hours_over_threshold_shifted: usize,
    /// Energy delivered by the battery over the day (kWh).
    pub battery_discharge_kwh: f64,
}

impl KpiReport {
    /// Computes all KPIs from the three hourly profiles.
    ///
    /// # Arguments
    ///
    /// * `original` - Hourly profile of the input table
    /// * `battery` - Hourly profile including battery discharge
    /// * `shifted` - Hourly profile after load shifting
    /// * `battery_discharge_kwh` - Total energy delivered by the battery
    /// * `threshold` - Threshold and peak window
    /// * `tariff` - Rates used for the cost totals
    pub fn from_profiles(
        original: &HourlyPowerProfile,
        battery: &HourlyPowerProfile,
        shifted: &HourlyPowerProfile,
        battery_discharge_kwh: f64,
        threshold: &ThresholdConfig,
        tariff: &TariffSchedule,
    ) -> Self {
        let peak_hours = &threshold.peak_hours;
        let over = |profile: &HourlyPowerProfile| {
            peak_hours
                .iter()
                .filter(|&&h| profile[h] > threshold.threshold_kw)
                .count()
        };

        Self {
            costs: CostComparison {
                original: tariff.cost(original, peak_hours),
                battery: tariff.cost(battery, peak_hours),
                shifted: tariff.cost(shifted, peak_hours),
            },
            peak_original_kw: original.peak_kw(),
            peak_shifted_kw: shifted.peak_kw(),
            peak_hours_over_threshold_original: over(original),
            peak_hours_over_threshold_shifted: over(shifted),
            battery_discharge_kwh,
        }
    }
}

impl fmt::Display for KpiReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Peak load:             {:.2} kW -> {:.2} kW", self.peak_original_kw, self.peak_shifted_kw)?;
        writeln!(
            f,
            "Peak hours over limit: {} -> {}",
            self.peak_hours_over_threshold_original, self.peak_hours_over_threshold_shifted
        )?;
        writeln!(f, "Battery discharge:     {:.3} kWh", self.battery_discharge_kwh)?;
        writeln!(f, "Battery savings:       {:.3} $", self.costs.battery_savings())?;
        writeln!(f, "Shifting savings:      {:.3} $", self.costs.shifting_savings())?;
        write!(f, "Total savings:         {:.3} $", self.costs.total_savings())
    }
}
