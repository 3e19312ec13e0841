//! Common types and traits for household load components.

/// Number of hourly buckets in one simulated day.
pub const HOURS_PER_DAY: usize = 24;

/// Trait defining a component that draws or offsets electricity per hour.
///
/// Appliances and synthetic battery entries both implement it, so the
/// aggregator can fold any mix of them into one hourly profile.
pub trait Device {
    /// Returns the power value at the given hour of the day.
    ///
    /// Positive values indicate power consumption (load),
    /// negative values indicate generation or offset.
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour of the day in `0..24`
    ///
    /// # Returns
    ///
    /// Power in kilowatts (kW) drawn during that hour
    fn power_kw(&self, hour: usize) -> f64;
}

/// Returns `true` when `hour` falls inside the window `[start, end)`.
///
/// A window with `start >= end` wraps past midnight and covers
/// `start..24` followed by `0..end`.
pub fn window_covers(start: usize, end: usize, hour: usize) -> bool {
    if start < end {
        (start..end).contains(&hour)
    } else {
        hour >= start || hour < end
    }
}
