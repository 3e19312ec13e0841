use thiserror::Error;

use crate::devices::solar::panel_power_kw;

/// Lowest state of charge the battery may be discharged to (%).
pub const SOC_FLOOR_PCT: f64 = 30.0;

/// Charge ceiling applied during peak hours (%).
pub const PEAK_CHARGE_CEILING_PCT: f64 = 50.0;

/// Charge ceiling applied outside peak hours (%).
pub const OFF_PEAK_CHARGE_CEILING_PCT: f64 = 80.0;

/// Errors raised when building a [`BatteryState`].
#[derive(Debug, Error, PartialEq)]
pub enum BatteryError {
    #[error("battery capacity must be > 0 kWh, got {0}")]
    NonPositiveCapacity(f64),
    #[error("{field} must be >= 0, got {value}")]
    NegativeRate { field: &'static str, value: f64 },
    #[error("state of charge must be in [0, 100] %, got {0}")]
    SocOutOfBounds(f64),
    #[error("panel area must be >= 0 m², got {0}")]
    NegativePanelArea(f64),
    #[error("panel efficiency must be in [0, 1], got {0}")]
    EfficiencyOutOfBounds(f64),
}

/// A solar-charged home battery.
///
/// `BatteryState` tracks the state of charge as a percentage of capacity and
/// applies the charge ceilings and the discharge floor. Charge and discharge
/// rates are C-rates: the per-hour limit is `rate * capacity_kwh`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryState {
    capacity_kwh: f64,
    charge_rate_kw: f64,
    discharge_rate_kw: f64,
    soc_pct: f64,
    panel_area_m2: f64,
    panel_efficiency: f64,
}

impl BatteryState {
    /// Creates a new battery with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Battery capacity in kWh (must be > 0)
    /// * `charge_rate_kw` - Charge rate per kWh of capacity
    /// * `discharge_rate_kw` - Discharge rate per kWh of capacity
    /// * `soc_pct` - Initial state of charge (0.0 to 100.0)
    /// * `panel_area_m2` - Area of the charging panels in m²
    /// * `panel_efficiency` - Panel efficiency (0..1.0)
    ///
    /// # Errors
    ///
    /// Returns a `BatteryError` if capacity is zero/negative, a rate or the
    /// panel area is negative, or SOC/efficiency are out of range.
    pub fn new(
        capacity_kwh: f64,
        charge_rate_kw: f64,
        discharge_rate_kw: f64,
        soc_pct: f64,
        panel_area_m2: f64,
        panel_efficiency: f64,
    ) -> Result<Self, BatteryError> {
        // NaN fails every comparison below, so it is rejected too.
        if !(capacity_kwh > 0.0) {
            return Err(BatteryError::NonPositiveCapacity(capacity_kwh));
        }
        if !(charge_rate_kw >= 0.0) {
            return Err(BatteryError::NegativeRate {
                field: "charge rate",
                value: charge_rate_kw,
            });
        }
        if !(discharge_rate_kw >= 0.0) {
            return Err(BatteryError::NegativeRate {
                field: "discharge rate",
                value: discharge_rate_kw,
            });
        }
        if !(0.0..=100.0).contains(&soc_pct) {
            return Err(BatteryError::SocOutOfBounds(soc_pct));
        }
        if !(panel_area_m2 >= 0.0) {
            return Err(BatteryError::NegativePanelArea(panel_area_m2));
        }
        if !(0.0..=1.0).contains(&panel_efficiency) {
            return Err(BatteryError::EfficiencyOutOfBounds(panel_efficiency));
        }

        Ok(Self {
            capacity_kwh,
            charge_rate_kw,
            discharge_rate_kw,
            soc_pct,
            panel_area_m2,
            panel_efficiency,
        })
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    pub fn charge_rate_kw(&self) -> f64 {
        self.charge_rate_kw
    }

    pub fn discharge_rate_kw(&self) -> f64 {
        self.discharge_rate_kw
    }

    /// State of charge in percent of capacity.
    pub fn soc_pct(&self) -> f64 {
        self.soc_pct
    }

    pub fn panel_area_m2(&self) -> f64 {
        self.panel_area_m2
    }

    pub fn panel_efficiency(&self) -> f64 {
        self.panel_efficiency
    }

    /// Largest energy the battery may deliver in one hour.
    pub fn max_discharge_kwh(&self) -> f64 {
        self.discharge_rate_kw * self.capacity_kwh
    }

    /// Largest energy the battery may absorb in one hour.
    pub fn max_charge_kwh(&self) -> f64 {
        self.charge_rate_kw * self.capacity_kwh
    }

    /// Charges from the panels toward `ceiling_pct` and returns the energy stored.
    ///
    /// Nothing happens without irradiance or when the battery already sits
    /// at or above the ceiling.
    ///
    /// # Arguments
    ///
    /// * `irradiance_kw_m2` - Irradiance for the hour (kW/m²)
    /// * `ceiling_pct` - SOC the charge may not exceed (%)
    ///
    /// # Returns
    ///
    /// Energy added in kWh (>= 0)
    pub fn charge_from_solar(&mut self, irradiance_kw_m2: f64, ceiling_pct: f64) -> f64 {
        if irradiance_kw_m2 <= 0.0 || self.soc_pct >= ceiling_pct {
            return 0.0;
        }

        let solar_kw = panel_power_kw(irradiance_kw_m2, self.panel_area_m2, self.panel_efficiency);
        let needed_kwh = (ceiling_pct - self.soc_pct) * self.capacity_kwh / 100.0;
        let charge_kwh = solar_kw.min(self.max_charge_kwh()).min(needed_kwh).max(0.0);

        self.update_soc(charge_kwh / self.capacity_kwh * 100.0);
        charge_kwh
    }

    /// Discharges to cover demand above `threshold_kw` and returns the energy delivered.
    ///
    /// Discharge only happens while SOC is above [`SOC_FLOOR_PCT`] and demand
    /// exceeds the threshold. It is limited by the discharge rate, the excess
    /// demand and the energy available above the floor.
    pub fn discharge_above(&mut self, demand_kw: f64, threshold_kw: f64) -> f64 {
        if self.soc_pct <= SOC_FLOOR_PCT || demand_kw <= threshold_kw {
            return 0.0;
        }

        let max_safe_kwh = (self.soc_pct - SOC_FLOOR_PCT) / 100.0 * self.capacity_kwh;
        let discharge_kwh = self
            .max_discharge_kwh()
            .min(demand_kw - threshold_kw)
            .min(max_safe_kwh);

        self.update_soc(-discharge_kwh * 100.0 / self.capacity_kwh);
        discharge_kwh
    }

    /// Shifts SOC by `change_pct` percentage points, clamped to `[0, 100]`.
    pub fn update_soc(&mut self, change_pct: f64) {
        self.soc_pct = (self.soc_pct + change_pct).clamp(0.0, 100.0);
    }
}
