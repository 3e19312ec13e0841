//! Core simulation types: threshold configuration and per-hour records.

use std::fmt;
use std::ops::RangeInclusive;

use crate::devices::{BatteryState, HOURS_PER_DAY, LoadProfile};

/// Default peak window, 17:00 through 22:00 inclusive.
pub const DEFAULT_PEAK_HOURS: RangeInclusive<usize> = 17..=22;

/// Default tolerated net demand before load shifting intervenes (kW).
pub const DEFAULT_THRESHOLD_KW: f64 = 3.0;

/// Season of the year an analysis run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Winter,
    Summer,
}

impl Season {
    /// Seasons in the order they are analysed.
    pub const ALL: [Self; 2] = [Self::Winter, Self::Summer];
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Winter => f.write_str("Winter"),
            Self::Summer => f.write_str("Summer"),
        }
    }
}

/// Demand threshold and peak window shared by the simulator, shifter, and tariff.
///
/// # Examples
///
/// ```
/// use home_energy_sim::sim::types::ThresholdConfig;
///
/// let cfg = ThresholdConfig::default();
/// assert_eq!(cfg.threshold_kw, 3.0);
/// assert!(cfg.is_peak(17));
/// assert_eq!(cfg.last_peak_hour(), Some(22));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdConfig {
    /// Maximum tolerated net demand in any hour (kW).
    pub threshold_kw: f64,
    /// Peak hours in processing order.
    pub peak_hours: Vec<usize>,
}

impl ThresholdConfig {
    /// Creates a new threshold configuration.
    ///
    /// # Panics
    ///
    /// Panics if any peak hour is outside `0..24`.
    pub fn new(threshold_kw: f64, peak_hours: impl IntoIterator<Item = usize>) -> Self {
        let peak_hours: Vec<usize> = peak_hours.into_iter().collect();
        assert!(
            peak_hours.iter().all(|&h| h < HOURS_PER_DAY),
            "peak hours must be in 0..24"
        );
        Self {
            threshold_kw,
            peak_hours,
        }
    }

    /// Returns `true` when `hour` is a peak hour.
    pub fn is_peak(&self, hour: usize) -> bool {
        self.peak_hours.contains(&hour)
    }

    /// Last peak hour in processing order, the anchor for shifted windows.
    pub fn last_peak_hour(&self) -> Option<usize> {
        self.peak_hours.last().copied()
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_KW, DEFAULT_PEAK_HOURS)
    }
}

/// State of charge observed at the start of an hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocSample {
    pub hour: usize,
    /// State of charge before the hour's adjustments (%).
    pub soc_pct: f64,
}

/// Ordered SOC samples, one per simulated hour.
pub type SocTrace = Vec<SocSample>;

/// Battery discharge decision for one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeRecord {
    pub hour: usize,
    /// Energy delivered during the hour (kWh, >= 0).
    pub discharge_kwh: f64,
    /// State of charge right after the discharge decision (%).
    pub soc_pct: f64,
}

impl fmt::Display for DischargeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hour={:>2} | discharge={:>6.3} kWh | SoC={:>6.2}%",
            self.hour, self.discharge_kwh, self.soc_pct
        )
    }
}

/// Outcome of a full-day battery simulation.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Input profile extended with one synthetic entry per discharging hour.
    pub profile: LoadProfile,
    /// SOC sampled at the start of every hour.
    pub soc_trace: SocTrace,
    /// Discharge decision for every hour.
    pub discharges: Vec<DischargeRecord>,
    /// Battery state after the last hour.
    pub battery: BatteryState,
}

impl SimulationResult {
    /// Total energy delivered by the battery over the day (kWh).
    pub fn total_discharge_kwh(&self) -> f64 {
        self.discharges.iter().map(|d| d.discharge_kwh).sum()
    }
}
