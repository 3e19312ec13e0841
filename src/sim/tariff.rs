//! Three-tier time-of-use tariff and energy cost calculation.

use std::ops::Range;

use tracing::{debug, info};

use super::aggregate::HourlyPowerProfile;

/// Rate per kWh for one hour of the day, by tier.
///
/// Peak hours come from the caller; the mid-peak window applies to hours
/// that are not peak; every other hour is off-peak.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffSchedule {
    pub peak_rate: f64,
    pub mid_peak_rate: f64,
    pub off_peak_rate: f64,
    /// Hours billed at the mid-peak rate unless they are peak hours.
    pub mid_peak_hours: Range<usize>,
}

impl Default for TariffSchedule {
    fn default() -> Self {
        Self {
            peak_rate: 0.3,
            mid_peak_rate: 0.2,
            off_peak_rate: 0.1,
            mid_peak_hours: 6..17,
        }
    }
}

impl TariffSchedule {
    /// Rate applied to `hour` given the peak window.
    pub fn rate_at(&self, hour: usize, peak_hours: &[usize]) -> f64 {
        if peak_hours.contains(&hour) {
            self.peak_rate
        } else if self.mid_peak_hours.contains(&hour) {
            self.mid_peak_rate
        } else {
            self.off_peak_rate
        }
    }

    /// Total cost of one day of `profile`, rounded to cents.
    ///
    /// Negative hours (net generation) reduce the total.
    pub fn cost(&self, profile: &HourlyPowerProfile, peak_hours: &[usize]) -> f64 {
        let total: f64 = profile
            .iter()
            .map(|(hour, kw)| {
                let rate = self.rate_at(hour, peak_hours);
                let cost = kw * rate;
                debug!(hour, kw, rate, cost, "hourly cost");
                cost
            })
            .sum();
        let total = round_to_cents(total);
        info!(total, "energy cost");
        total
    }
}

/// Cost of `profile` under the default tariff.
pub fn energy_cost(profile: &HourlyPowerProfile, peak_hours: &[usize]) -> f64 {
    TariffSchedule::default().cost(profile, peak_hours)
}

fn round_to_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // avoid reporting -0.00
    if rounded == 0.0 { 0.0 } else { rounded }
}
