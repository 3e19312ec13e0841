use std::fmt;

use crate::devices::types::{Device, HOURS_PER_DAY, window_covers};

/// Priority group of loads that must never be moved.
pub const CRITICAL_PRIORITY_GROUP: u32 = 1;

/// Priority group reserved for synthetic battery discharge entries.
pub const BATTERY_PRIORITY_GROUP: u32 = 0;

/// A household appliance drawing constant power over a daily window.
///
/// The window `[start, end)` wraps past midnight when `start >= end`.
///
/// # Power Flow Convention
/// - Positive power: consumption
/// - Negative power: generation or offset (battery discharge entries)
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceLoad {
    /// Display name, also the identity used by the load shifter.
    pub name: String,

    /// Rated power in kilowatts (signed).
    pub rated_power_kw: f64,

    /// Priority group: `1` is critical, `0` is reserved for the battery.
    pub priority_group: u32,

    /// First active hour (inclusive).
    pub start: usize,

    /// Hour the appliance switches off (exclusive).
    pub end: usize,
}

impl ApplianceLoad {
    /// Creates a new appliance entry.
    pub fn new(
        name: impl Into<String>,
        rated_power_kw: f64,
        priority_group: u32,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            name: name.into(),
            rated_power_kw,
            priority_group,
            start,
            end,
        }
    }

    /// Creates the synthetic entry offsetting `discharge_kw` during `hour`.
    pub fn battery_discharge(hour: usize, discharge_kw: f64) -> Self {
        Self::new(
            format!("Battery Discharge (Hour {hour})"),
            -discharge_kw,
            BATTERY_PRIORITY_GROUP,
            hour,
            hour + 1,
        )
    }

    /// Returns `true` when the window covers `hour`.
    pub fn is_active_at(&self, hour: usize) -> bool {
        window_covers(self.start, self.end, hour)
    }

    pub fn is_critical(&self) -> bool {
        self.priority_group == CRITICAL_PRIORITY_GROUP
    }

    pub fn is_battery_discharge(&self) -> bool {
        self.priority_group == BATTERY_PRIORITY_GROUP
    }

    /// Returns `true` for loads that run around the clock.
    ///
    /// Besides `0..24`, a window with `start == end` covers every hour.
    pub fn is_always_on(&self) -> bool {
        self.start == self.end || (self.start == 0 && self.end == HOURS_PER_DAY)
    }

    /// Returns `true` for windows that cross midnight.
    pub fn wraps_midnight(&self) -> bool {
        self.start >= self.end
    }
}

impl Device for ApplianceLoad {
    fn power_kw(&self, hour: usize) -> f64 {
        if self.is_active_at(hour) {
            self.rated_power_kw
        } else {
            0.0
        }
    }
}

impl fmt::Display for ApplianceLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.3} kW, group {}, {:02}-{:02})",
            self.name, self.rated_power_kw, self.priority_group, self.start, self.end
        )
    }
}

/// Ordered appliance table for one season.
pub type LoadProfile = Vec<ApplianceLoad>;
