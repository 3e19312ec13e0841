//! Household components: appliances, battery, and solar input.

/// Appliance entries and seasonal load tables.
pub mod appliance;
/// Solar-charged battery storage model.
pub mod battery;
/// Seasonal solar irradiance input.
pub mod solar;
pub mod types;

// Re-export the main types for convenience
pub use appliance::{ApplianceLoad, LoadProfile};
pub use battery::{BatteryError, BatteryState};
pub use solar::SolarIrradianceProfile;
pub use types::{Device, HOURS_PER_DAY};
