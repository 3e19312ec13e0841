use crate::devices::types::HOURS_PER_DAY;

/// Average solar irradiance per hour of the day for one season.
///
/// Hours without data read as zero irradiance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolarIrradianceProfile {
    /// Irradiance in kW/m² indexed by hour; `None` where no sample exists.
    hourly: [Option<f64>; HOURS_PER_DAY],
}

impl SolarIrradianceProfile {
    /// Creates an empty profile (all hours dark).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a profile from values indexed by hour.
    ///
    /// Values beyond the 24th are ignored.
    pub fn from_hourly(values: &[f64]) -> Self {
        values.iter().copied().enumerate().collect()
    }

    /// Sets the irradiance for `hour`. Hours outside `0..24` are ignored.
    pub fn set(&mut self, hour: usize, kw_per_m2: f64) {
        if let Some(slot) = self.hourly.get_mut(hour) {
            *slot = Some(kw_per_m2);
        }
    }

    /// Returns the irradiance at `hour` in kW/m², or 0.0 when absent.
    pub fn at(&self, hour: usize) -> f64 {
        self.hourly.get(hour).copied().flatten().unwrap_or(0.0)
    }

    /// Returns the number of hours that carry a sample.
    pub fn sampled_hours(&self) -> usize {
        self.hourly.iter().filter(|v| v.is_some()).count()
    }
}

impl FromIterator<(usize, f64)> for SolarIrradianceProfile {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        let mut profile = Self::new();
        for (hour, kw_per_m2) in iter {
            profile.set(hour, kw_per_m2);
        }
        profile
    }
}

/// Electrical output of a panel array under the given irradiance.
///
/// # Arguments
///
/// * `irradiance_kw_m2` - Irradiance on the panel plane (kW/m²)
/// * `panel_area_m2` - Total panel area (m²)
/// * `panel_efficiency` - Conversion efficiency (0..1.0)
pub fn panel_power_kw(irradiance_kw_m2: f64, panel_area_m2: f64, panel_efficiency: f64) -> f64 {
    irradiance_kw_m2 * panel_area_m2 * panel_efficiency
}
