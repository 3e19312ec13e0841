//! Integration tests for the battery, shifting, and cost pipeline.

mod common;

use approx::assert_abs_diff_eq;

use home_energy_sim::config::ScenarioConfig;
use home_energy_sim::devices::{BatteryError, BatteryState};
use home_energy_sim::runner::run_analysis;
use home_energy_sim::sim::aggregate::{HourlyPowerProfile, aggregate};
use home_energy_sim::sim::engine::simulate;
use home_energy_sim::sim::shifter::shift;
use home_energy_sim::sim::tariff::energy_cost;
use home_energy_sim::sim::types::Season;

#[test]
fn drained_battery_leaves_peak_to_the_shifter() {
    let threshold = common::default_threshold();
    let result = simulate(
        common::drained_battery(),
        common::evening_oven_profile(),
        &common::dark_day(),
        &threshold,
    );

    assert!(result.discharges.iter().all(|d| d.discharge_kwh == 0.0));
    assert_eq!(result.profile.len(), 1, "no synthetic entries expected");
    assert_abs_diff_eq!(aggregate(&result.profile)[17], 4.0);

    let shifted = shift(result.profile, &threshold);
    assert_eq!((shifted[0].start, shifted[0].end), (23, 1));

    let hourly = aggregate(&shifted);
    assert_abs_diff_eq!(hourly[17], 0.0);
    assert_abs_diff_eq!(hourly[23], 4.0);
    assert_abs_diff_eq!(hourly[0], 4.0);
}

#[test]
fn charged_battery_clips_peak_below_threshold() {
    let threshold = common::default_threshold();
    let result = simulate(
        common::charged_battery(),
        common::evening_oven_profile(),
        &common::dark_day(),
        &threshold,
    );

    assert_abs_diff_eq!(result.total_discharge_kwh(), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(result.battery.soc_pct(), 60.0, epsilon = 1e-9);

    let battery_hourly = aggregate(&result.profile);
    assert_abs_diff_eq!(battery_hourly[17], 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(battery_hourly[18], 3.0, epsilon = 1e-9);

    // Net demand now sits at the threshold, so nothing moves.
    let shifted = shift(result.profile.clone(), &threshold);
    assert_eq!(shifted, result.profile);
}

#[test]
fn soc_stays_within_bounds_for_every_preset() {
    for name in ScenarioConfig::PRESETS {
        let scenario = ScenarioConfig::from_preset(name).expect("preset exists");
        let report = run_analysis(&scenario).expect("preset should run");
        for outcome in &report.seasons {
            assert_eq!(outcome.soc_trace.len(), 24);
            for sample in &outcome.soc_trace {
                assert!(
                    (0.0..=100.0).contains(&sample.soc_pct),
                    "{name} {} hour {}: soc {}",
                    outcome.season,
                    sample.hour,
                    sample.soc_pct
                );
            }
        }
    }
}

#[test]
fn household_report_covers_both_seasons() {
    let report = run_analysis(&ScenarioConfig::household()).expect("household should run");
    assert_eq!(report.seasons.len(), 2);
    assert_eq!(report.seasons[0].season, Season::Winter);
    assert_eq!(report.seasons[1].season, Season::Summer);

    for outcome in &report.seasons {
        let costs = &outcome.kpi.costs;
        assert!(costs.original.is_finite());
        assert!(costs.battery <= costs.original + 1e-9);
        assert!(outcome.discharges.iter().all(|d| d.discharge_kwh >= 0.0));
    }
}

#[test]
fn cost_of_idle_day_is_zero() {
    let cost = energy_cost(&HourlyPowerProfile::zero(), &[17, 18, 19, 20, 21, 22]);
    assert_eq!(cost, 0.0);
}

#[test]
fn cost_scales_linearly() {
    let threshold = common::default_threshold();
    let hourly = aggregate(&common::small_household_profile());
    let single = energy_cost(&hourly, &threshold.peak_hours);
    let double = energy_cost(&(hourly * 2.0), &threshold.peak_hours);
    // Both totals are rounded to cents independently.
    assert_abs_diff_eq!(double, 2.0 * single, epsilon = 0.011);
}

#[test]
fn aggregation_ignores_entry_order() {
    let profile = common::small_household_profile();
    let mut reversed = profile.clone();
    reversed.reverse();

    let forward = aggregate(&profile);
    let backward = aggregate(&reversed);
    for hour in 0..24 {
        assert_abs_diff_eq!(forward[hour], backward[hour], epsilon = 1e-12);
    }
}

#[test]
fn shifting_a_relieved_profile_again_changes_nothing() {
    let threshold = common::default_threshold();
    let once = shift(common::evening_oven_profile(), &threshold);
    let twice = shift(once.clone(), &threshold);
    assert_eq!(once, twice);
}

#[test]
fn zero_capacity_battery_is_rejected() {
    let err = BatteryState::new(0.0, 0.2, 0.3, 10.0, 10.0, 0.7).unwrap_err();
    assert_eq!(err, BatteryError::NonPositiveCapacity(0.0));
}

#[test]
fn zero_capacity_scenario_fails_validation() {
    let mut scenario = ScenarioConfig::household();
    scenario.battery.capacity_kwh = Some(0.0);
    assert!(run_analysis(&scenario).is_err());
}
