/// Hourly aggregation of appliance windows.
pub mod aggregate;
/// Battery charge/discharge state machine.
pub mod engine;
pub mod kpi;
/// Greedy peak-hour load shifting.
pub mod shifter;
/// Time-of-use tariff and cost calculation.
pub mod tariff;
pub mod types;
