//! Hourly aggregation of appliance windows into a net power profile.

use std::ops::{Index, Mul};

use crate::devices::{Device, HOURS_PER_DAY};

/// Net power per hour of the day (kW; positive = import, negative = offset).
///
/// Only ever derived from a set of devices, never edited directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyPowerProfile([f64; HOURS_PER_DAY]);

impl HourlyPowerProfile {
    /// A profile with zero power in every hour.
    pub const fn zero() -> Self {
        Self([0.0; HOURS_PER_DAY])
    }

    /// Highest hourly value in kW.
    pub fn peak_kw(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sum of all hourly values; the daily energy in kWh.
    pub fn total_kwh(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

impl Default for HourlyPowerProfile {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<[f64; HOURS_PER_DAY]> for HourlyPowerProfile {
    fn from(values: [f64; HOURS_PER_DAY]) -> Self {
        Self(values)
    }
}

impl Index<usize> for HourlyPowerProfile {
    type Output = f64;

    fn index(&self, hour: usize) -> &f64 {
        &self.0[hour]
    }
}

impl Mul<f64> for HourlyPowerProfile {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        Self(self.0.map(|v| v * k))
    }
}

/// Folds every device's hourly power into one 24-slot profile.
///
/// Wrapped windows contribute to both ends of the day. Pure and
/// order-independent; an empty input yields all zeros.
pub fn aggregate<'a, D>(devices: impl IntoIterator<Item = &'a D>) -> HourlyPowerProfile
where
    D: Device + 'a,
{
    let mut hourly = [0.0; HOURS_PER_DAY];
    for device in devices {
        for (hour, slot) in hourly.iter_mut().enumerate() {
            *slot += device.power_kw(hour);
        }
    }
    HourlyPowerProfile(hourly)
}
