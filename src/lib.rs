//! Household energy analysis: solar battery simulation, peak load shifting,
//! and time-of-use cost comparison.

pub mod cli;
pub mod config;
pub mod devices;
/// Result export.
pub mod io;
pub mod runner;
/// Aggregation, battery engine, load shifter, and tariff modules.
pub mod sim;
