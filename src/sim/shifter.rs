//! Greedy peak-reduction by moving shiftable appliances past the peak window.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::devices::{ApplianceLoad, HOURS_PER_DAY, LoadProfile};

use super::aggregate::aggregate;
use super::types::ThresholdConfig;

/// Net load at `hour`, rounded to watt precision before threshold comparisons.
fn load_at(profile: &[ApplianceLoad], hour: usize) -> f64 {
    (aggregate(profile)[hour] * 1000.0).round() / 1000.0
}

/// Returns `true` for entries the shifter may move.
fn is_shiftable(appliance: &ApplianceLoad) -> bool {
    !appliance.is_critical()
        && !appliance.is_battery_discharge()
        && appliance.rated_power_kw != 0.0
        && !appliance.is_always_on()
}

/// Moves `appliance` to start at `target_start`, keeping its nominal duration.
///
/// The duration is taken as `end - start`, which assumes a window that does
/// not cross midnight; the new end is reduced modulo 24.
fn relocate(appliance: &mut ApplianceLoad, target_start: usize) {
    if appliance.wraps_midnight() {
        warn!(
            name = %appliance.name,
            start = appliance.start,
            end = appliance.end,
            "shifting a window that crosses midnight"
        );
    }
    let duration = appliance.end as i64 - appliance.start as i64;
    let new_end = (target_start as i64 + duration).rem_euclid(HOURS_PER_DAY as i64) as usize;
    debug!(
        name = %appliance.name,
        from = ?(appliance.start, appliance.end),
        to = ?(target_start, new_end),
        "shifting appliance"
    );
    appliance.start = target_start;
    appliance.end = new_end;
}

/// Greedy load shifter.
///
/// Peak hours are processed in configured order. Whenever an hour's net load
/// exceeds the threshold, the largest shiftable appliances active in that
/// hour are moved to start right after the last peak hour until the hour is
/// back under the threshold. An appliance moves at most once per call.
#[derive(Debug, Clone)]
pub struct LoadShifter<'a> {
    threshold: &'a ThresholdConfig,
    shifted: HashSet<String>,
}

impl<'a> LoadShifter<'a> {
    pub fn new(threshold: &'a ThresholdConfig) -> Self {
        Self {
            threshold,
            shifted: HashSet::new(),
        }
    }

    /// Names of the appliances moved so far.
    pub fn shifted(&self) -> &HashSet<String> {
        &self.shifted
    }

    /// Processes one peak hour, mutating `profile` in place.
    ///
    /// # Returns
    ///
    /// The net load at `hour` after shifting (kW).
    pub fn process_hour(&mut self, profile: &mut [ApplianceLoad], hour: usize) -> f64 {
        let threshold_kw = self.threshold.threshold_kw;
        let mut load_kw = load_at(profile, hour);
        if load_kw - threshold_kw <= 0.0 {
            debug!(hour, load_kw, "no excess load");
            return load_kw;
        }
        debug!(hour, load_kw, excess_kw = load_kw - threshold_kw, "excess load");

        let Some(last_peak) = self.threshold.last_peak_hour() else {
            return load_kw;
        };
        let target_start = (last_peak + 1) % HOURS_PER_DAY;

        let mut candidates: Vec<usize> = profile
            .iter()
            .enumerate()
            .filter(|(_, a)| is_shiftable(a) && a.is_active_at(hour))
            .map(|(i, _)| i)
            .collect();
        // Largest contributors first; ties go to the higher priority group,
        // then to table order.
        candidates.sort_by(|&a, &b| {
            let (la, lb) = (&profile[a], &profile[b]);
            lb.rated_power_kw
                .total_cmp(&la.rated_power_kw)
                .then(lb.priority_group.cmp(&la.priority_group))
                .then(a.cmp(&b))
        });

        for index in candidates {
            if self.shifted.contains(&profile[index].name) {
                continue;
            }
            relocate(&mut profile[index], target_start);
            self.shifted.insert(profile[index].name.clone());

            load_kw = load_at(profile, hour);
            if load_kw <= threshold_kw {
                debug!(hour, load_kw, "load within threshold");
                break;
            }
        }

        if load_kw > threshold_kw {
            warn!(hour, load_kw, threshold_kw, "no shiftable appliances left for peak hour");
        }
        load_kw
    }
}

/// Shifts shiftable loads out of over-threshold peak hours.
///
/// Takes ownership of the profile and returns it with shifted windows.
pub fn shift(mut profile: LoadProfile, threshold: &ThresholdConfig) -> LoadProfile {
    info!(threshold_kw = threshold.threshold_kw, "shifting loads");
    let mut shifter = LoadShifter::new(threshold);
    for &hour in &threshold.peak_hours {
        shifter.process_hour(&mut profile, hour);
    }
    info!(shifted = shifter.shifted().len(), "load shifting complete");
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_single_appliance_past_peak() {
        let profile = vec![ApplianceLoad::new("Oven", 4.0, 2, 17, 19)];
        let shifted = shift(profile, &ThresholdConfig::default());
        assert_eq!((shifted[0].start, shifted[0].end), (23, 1));
        assert_eq!(aggregate(&shifted)[17], 0.0);
        assert_eq!(aggregate(&shifted)[23], 4.0);
        assert_eq!(aggregate(&shifted)[0], 4.0);
    }

    #[test]
    fn under_threshold_is_untouched() {
        let profile = vec![ApplianceLoad::new("Lights", 1.0, 2, 17, 23)];
        let shifted = shift(profile.clone(), &ThresholdConfig::default());
        assert_eq!(shifted, profile);
    }

    #[test]
    fn exempt_entries_are_never_moved() {
        let profile = vec![
            ApplianceLoad::new("Freezer", 2.0, 1, 17, 20),
            ApplianceLoad::new("Router", 2.0, 2, 0, 24),
            ApplianceLoad::new("Idle", 0.0, 2, 17, 18),
            ApplianceLoad::battery_discharge(17, -2.0),
        ];
        let shifted = shift(profile.clone(), &ThresholdConfig::default());
        assert_eq!(shifted, profile);
    }

    #[test]
    fn all_day_window_with_equal_bounds_stays_put() {
        let profile = vec![ApplianceLoad::new("Pond pump", 5.0, 2, 5, 5)];
        let threshold = ThresholdConfig::default();
        let mut shifter = LoadShifter::new(&threshold);
        let mut shifted = profile.clone();
        for &hour in &threshold.peak_hours {
            shifter.process_hour(&mut shifted, hour);
        }
        assert_eq!(shifted, profile);
        assert!(shifter.shifted().is_empty());
        assert_eq!(aggregate(&shifted)[17], 5.0);
    }

    #[test]
    fn largest_contributor_goes_first_and_stops_when_under() {
        let profile = vec![
            ApplianceLoad::new("Lights", 0.5, 3, 18, 20),
            ApplianceLoad::new("Dryer", 2.5, 2, 18, 20),
            ApplianceLoad::new("Kettle", 1.0, 2, 18, 19),
        ];
        let shifted = shift(profile, &ThresholdConfig::default());
        // 4.0 kW at 18; moving the dryer leaves 1.5 kW
        assert_eq!((shifted[1].start, shifted[1].end), (23, 1));
        assert_eq!((shifted[0].start, shifted[0].end), (18, 20));
        assert_eq!((shifted[2].start, shifted[2].end), (18, 19));
    }

    #[test]
    fn battery_offset_counts_toward_load() {
        let profile = vec![
            ApplianceLoad::new("Oven", 4.0, 2, 17, 18),
            ApplianceLoad::battery_discharge(17, 1.0),
        ];
        let shifted = shift(profile.clone(), &ThresholdConfig::default());
        assert_eq!(shifted, profile);
    }

    #[test]
    fn appliance_is_shifted_at_most_once() {
        let threshold = ThresholdConfig::new(1.0, [17, 23]);
        let profile = vec![ApplianceLoad::new("Heater", 2.0, 2, 17, 18)];
        // moved to 0..1 while handling 17, so 23 is not affected
        let shifted = shift(profile, &threshold);
        assert_eq!((shifted[0].start, shifted[0].end), (0, 1));

        let mut shifter = LoadShifter::new(&threshold);
        let mut profile = vec![ApplianceLoad::new("Heater", 2.0, 2, 17, 18)];
        shifter.process_hour(&mut profile, 17);
        profile[0].start = 17;
        profile[0].end = 18;
        let load = shifter.process_hour(&mut profile, 17);
        assert_eq!(load, 2.0);
        assert_eq!(profile[0].start, 17);
    }

    #[test]
    fn second_call_is_a_no_op_once_resolved() {
        let profile = vec![
            ApplianceLoad::new("Oven", 2.0, 2, 17, 19),
            ApplianceLoad::new("Washer", 1.5, 3, 18, 21),
            ApplianceLoad::new("Fridge", 0.2, 1, 0, 24),
        ];
        let threshold = ThresholdConfig::default();
        let once = shift(profile, &threshold);
        let twice = shift(once.clone(), &threshold);
        assert_eq!(once, twice);
    }

    #[test]
    fn exhausted_candidates_leave_hour_over_threshold() {
        let profile = vec![
            ApplianceLoad::new("Freezer", 3.5, 1, 17, 23),
            ApplianceLoad::new("Kettle", 0.2, 2, 17, 18),
        ];
        let shifted = shift(profile, &ThresholdConfig::default());
        assert!((aggregate(&shifted)[17] - 3.5).abs() < 1e-9);
        assert_eq!(shifted[1].start, 23);
    }
}
